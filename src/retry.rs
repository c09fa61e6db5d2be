//! Bounded retry with a fixed delay.
//!
//! Every failure from the posting service is treated as transient: the
//! network, the instance and the media pipeline on the server all fail in ways
//! that tend to clear up within seconds. The attempt budget is fixed and
//! small, and running out of it is a normal, reported outcome rather than an
//! error.

use std::fmt::Display;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// How many times to try, and how long to wait between failed tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. At least 1.
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_secs(1),
        }
    }
}

/// How a retried operation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery<T> {
    Delivered { value: T, attempts: u32 },
    Exhausted { attempts: u32, last_error: String },
}

/// Call `attempt(1)`, `attempt(2)`, ... until one succeeds or the budget is
/// spent. Sleeps `policy.delay` after each failure except the last.
pub fn deliver<T, E, F>(policy: RetryPolicy, mut attempt: F) -> Delivery<T>
where
    E: Display,
    F: FnMut(u32) -> Result<T, E>,
{
    let attempts = policy.attempts.max(1);
    let mut last_error = String::new();

    for n in 1..=attempts {
        match attempt(n) {
            Ok(value) => {
                if n > 1 {
                    info!("succeeded on attempt {}/{}", n, attempts);
                }
                return Delivery::Delivered { value, attempts: n };
            }
            Err(e) => {
                warn!("attempt {}/{} failed: {}", n, attempts, e);
                last_error = e.to_string();
                if n < attempts {
                    thread::sleep(policy.delay);
                }
            }
        }
    }

    Delivery::Exhausted {
        attempts,
        last_error,
    }
}
