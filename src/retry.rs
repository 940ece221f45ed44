//! Bounded exponential backoff for calls to external services.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Errors that know whether another attempt could succeed
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub base_ms: u64,
    pub factor: f64,
    pub max_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_ms: 500,
            factor: 2.0,
            max_ms: 8_000,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt + 1`: base * factor^attempt, capped
    pub fn backoff(&self, attempt: u32) -> Duration {
        let delay = (self.base_ms as f64 * self.factor.powi(attempt as i32)).min(self.max_ms as f64);
        Duration::from_millis(delay.max(0.0) as u64)
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// policy runs out of attempts. The last error is returned.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, operation: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt + 1 < max_attempts => {
                let delay = policy.backoff(attempt);
                warn!(operation = %operation, attempt = attempt + 1, error = %e, "Retryable failure");
                debug!(operation = %operation, delay_ms = delay.as_millis() as u64, "Backing off before retry");
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
