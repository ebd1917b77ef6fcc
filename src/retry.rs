//! Retry logic with exponential backoff.
//!
//! Only errors accepted by the caller's predicate are retried; anything else
//! fails the operation immediately.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first try
    pub max_retries: u32,
    /// Base factor for the backoff schedule
    pub backoff_factor: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `retry` (1-based).
    ///
    /// The first retry is immediate; after that the delay is
    /// `backoff_factor * 2^(retry - 1)`, capped at `max_delay`.
    fn delay_for_retry(&self, retry: u32) -> Duration {
        if retry <= 1 {
            return Duration::ZERO;
        }
        let exp = 2f64.powi((retry - 1).min(31) as i32);
        let delay = self.backoff_factor.mul_f64(exp);
        delay.min(self.max_delay)
    }
}

/// Retry an async operation while `is_retryable` accepts its error
pub async fn retry_if<T, E, F, Fut, P>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    is_retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut retries = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if retries > 0 {
                    debug!("{} succeeded after {} retries", operation_name, retries);
                }
                return Ok(result);
            }
            Err(e) if retries < config.max_retries && is_retryable(&e) => {
                retries += 1;
                let delay = config.delay_for_retry(retries);
                warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:?}...",
                    operation_name,
                    retries,
                    config.max_retries + 1,
                    e,
                    delay
                );
                sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
