use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::ports::time_service::TimeService;

/// Fixed-delay, bounded retry used while connecting to infrastructure at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(30, Duration::from_secs(2))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("could not connect to {target} after {attempts} attempts: {last_error}")]
pub struct ConnectError {
    pub target: String,
    pub attempts: u32,
    pub last_error: String,
}

/// Run `connect` until it succeeds or the policy is exhausted.
///
/// Sleeps `policy.delay` between attempts (never after the last one). The
/// caller decides whether exhaustion is fatal.
pub async fn connect_with_retry<T, E, F, Fut>(
    target: &str,
    policy: &RetryPolicy,
    time_service: &dyn TimeService,
    mut connect: F,
) -> Result<T, ConnectError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        match connect().await {
            Ok(connection) => {
                info!("Connected to {} (attempt {}/{})", target, attempt, max_attempts);
                return Ok(connection);
            }
            Err(e) => {
                last_error = e.to_string();
                warn!(
                    "Failed to connect to {} (attempt {}/{}): {}",
                    target, attempt, max_attempts, last_error
                );
                if attempt < max_attempts {
                    time_service.sleep(policy.delay).await;
                }
            }
        }
    }

    Err(ConnectError {
        target: target.to_string(),
        attempts: max_attempts,
        last_error,
    })
}
