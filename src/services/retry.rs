//! Bounded retry with rate-limit aware backoff.

use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::RetryConfig;

/// How many times to try and how long to wait between attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// First backoff interval, in units
    pub initial_backoff: u64,
    /// Length of one backoff unit (one second in production)
    pub unit: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_backoff: config.initial_backoff_secs,
            unit: Duration::from_secs(1),
        }
    }

    pub fn backoff(&self) -> Backoff {
        Backoff {
            current: self.initial_backoff,
            unit: self.unit,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Backoff state for one retry sequence.
///
/// Throttled attempts double the interval; other failures reuse it.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: u64,
    unit: Duration,
}

impl Backoff {
    /// Wait after a 429. A server-supplied delay wins over the interval.
    pub fn throttled(&mut self, retry_after: Option<u64>) -> Duration {
        let wait = retry_after.unwrap_or(self.current);
        self.current = self.current.saturating_mul(2);
        self.units(wait)
    }

    /// Wait after any other failure.
    pub fn failed(&self) -> Duration {
        self.units(self.current)
    }

    fn units(&self, n: u64) -> Duration {
        self.unit
            .saturating_mul(u32::try_from(n).unwrap_or(u32::MAX))
    }
}

/// Run `op` until it succeeds or the policy is exhausted.
///
/// Returns `None` once every attempt failed; the last error is logged.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, what: &str, mut op: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut backoff = policy.backoff();

    for attempt in 1..=policy.max_attempts {
        let wait = match op().await {
            Ok(value) => return Some(value),
            Err(AppError::RateLimited { retry_after_secs }) => {
                let wait = backoff.throttled(retry_after_secs);
                log::warn!(
                    "{} throttled (attempt {}/{}). Retrying in {:?}...",
                    what,
                    attempt,
                    policy.max_attempts,
                    wait
                );
                wait
            }
            Err(e) => {
                let wait = backoff.failed();
                log::error!(
                    "{} failed (attempt {}/{}): {}",
                    what,
                    attempt,
                    policy.max_attempts,
                    e
                );
                wait
            }
        };

        if attempt < policy.max_attempts {
            tokio::time::sleep(wait).await;
        }
    }

    log::error!("{}: max retries exceeded", what);
    None
}
