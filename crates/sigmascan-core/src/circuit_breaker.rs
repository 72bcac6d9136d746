use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Runtime circuit state for upstream provider calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Circuit breaker thresholds and timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub open_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            open_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
enum Circuit {
    Closed { failures: u32 },
    Open { since: Instant },
    HalfOpen,
}

/// Thread-safe circuit breaker guarding adapter network requests.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    circuit: Mutex<Circuit>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            circuit: Mutex::new(Circuit::Closed { failures: 0 }),
        }
    }

    /// Whether a request may go out right now. An open circuit transitions
    /// to half-open (one probe allowed) once its timeout elapses.
    pub fn allow_request(&self) -> bool {
        let mut circuit = self.lock();
        match &*circuit {
            Circuit::Closed { .. } | Circuit::HalfOpen => true,
            Circuit::Open { since } => {
                if since.elapsed() >= self.config.open_timeout {
                    *circuit = Circuit::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        *self.lock() = Circuit::Closed { failures: 0 };
    }

    pub fn record_failure(&self) {
        let mut circuit = self.lock();
        *circuit = match &*circuit {
            Circuit::Closed { failures } => {
                let failures = failures.saturating_add(1);
                if failures >= self.config.failure_threshold {
                    Circuit::Open {
                        since: Instant::now(),
                    }
                } else {
                    Circuit::Closed { failures }
                }
            }
            // A failed probe re-opens immediately.
            Circuit::HalfOpen | Circuit::Open { .. } => Circuit::Open {
                since: Instant::now(),
            },
        };
    }

    pub fn state(&self) -> CircuitState {
        match &*self.lock() {
            Circuit::Closed { .. } => CircuitState::Closed,
            Circuit::Open { .. } => CircuitState::Open,
            Circuit::HalfOpen => CircuitState::HalfOpen,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Circuit> {
        self.circuit
            .lock()
            .expect("circuit breaker lock is not poisoned")
    }
}
