use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Politeness throttle for per-symbol provider requests.
///
/// The pipeline issues one request per selected symbol in a burst; the
/// throttle paces that burst so an unauthenticated provider does not see it
/// as abuse. When budget is unavailable the caller receives the pause to
/// sleep before proceeding.
#[derive(Clone)]
pub struct FetchThrottle {
    limiter: Arc<DirectRateLimiter>,
    pause: Duration,
}

impl FetchThrottle {
    pub fn new(window: Duration, limit: u32, pause: Duration) -> Self {
        let quota = quota_from_window(window, limit);
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            pause,
        }
    }

    /// Yahoo tolerates modest request rates from anonymous clients.
    pub fn yahoo_default() -> Self {
        Self::new(Duration::from_secs(10), 20, Duration::from_millis(500))
    }

    /// Tries to take rate budget; on denial returns the pause to sleep
    /// before retrying the acquisition.
    pub fn acquire(&self) -> Result<(), Duration> {
        if self.limiter.check().is_ok() {
            Ok(())
        } else {
            Err(self.pause)
        }
    }
}

fn quota_from_window(window: Duration, limit: u32) -> Quota {
    let limit = NonZeroU32::new(limit.max(1)).expect("limit clamped to at least one");
    let per_request = window
        .checked_div(limit.get())
        .unwrap_or(Duration::from_millis(1))
        .max(Duration::from_millis(1));
    Quota::with_period(per_request)
        .expect("throttle period is non-zero")
        .allow_burst(limit)
}
