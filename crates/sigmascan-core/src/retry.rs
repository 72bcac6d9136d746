//! Bounded retry with exponential backoff and jitter around the data fetch.

use std::time::Duration;

/// Backoff schedule for retrying retryable fetch failures.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    pub max_retries: u32,
    /// Apply +/- 50% random jitter to each delay.
    pub jitter: bool,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            max_retries: 3,
            jitter: true,
        }
    }
}

impl BackoffPolicy {
    /// No retries at all; the first failure is final.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based), or `None` when the
    /// retry budget is spent.
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries {
            return None;
        }

        let scale = self.multiplier.powi(attempt as i32);
        let seconds = (self.initial_delay.as_secs_f64() * scale).min(self.max_delay.as_secs_f64());
        let mut delay = Duration::from_secs_f64(seconds);

        if self.jitter {
            let half_ms = (delay.as_millis() as f64 * 0.5) as u64;
            let offset = fastrand::u64(0..=half_ms.saturating_mul(2)) as i64 - half_ms as i64;
            let total_ms = delay.as_millis() as i64 + offset;
            delay = Duration::from_millis(total_ms.max(0) as u64);
        }

        Some(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy_without_jitter() -> BackoffPolicy {
        BackoffPolicy {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
            multiplier: 2.0,
            max_retries: 3,
            jitter: false,
        }
    }

    #[test]
    fn delays_grow_and_cap() {
        let policy = policy_without_jitter();
        assert_eq!(policy.delay(0), Some(Duration::from_millis(100)));
        assert_eq!(policy.delay(1), Some(Duration::from_millis(200)));
        assert_eq!(policy.delay(2), Some(Duration::from_millis(350)));
    }

    #[test]
    fn budget_exhaustion_returns_none() {
        let policy = policy_without_jitter();
        assert_eq!(policy.delay(3), None);
    }

    #[test]
    fn disabled_policy_never_retries() {
        assert_eq!(BackoffPolicy::disabled().delay(0), None);
    }

    #[test]
    fn jitter_stays_within_half_window() {
        let policy = BackoffPolicy {
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(1),
            multiplier: 1.0,
            max_retries: 1,
            jitter: true,
        };
        for _ in 0..32 {
            let delay = policy.delay(0).expect("within budget");
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(300));
        }
    }
}
