// SPDX-License-Identifier: PMPL-1.0-or-later
//! Retry with exponential backoff for advice calls
//!
//! With the default configuration a failing call is attempted three times:
//! - Attempt 1 fails, wait 2s
//! - Attempt 2 fails, wait 4s
//! - Attempt 3 fails, the last error is returned
//!
//! Backoff is deterministic; the endpoint's own rate limit already spaces
//! callers apart.

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::AdvisorConfig;

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: usize,
    /// Wait before the first retry
    pub initial_backoff: Duration,
    /// Backoff multiplier
    pub multiplier: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_secs(2),
            multiplier: 2,
        }
    }
}

impl From<&AdvisorConfig> for RetryConfig {
    fn from(config: &AdvisorConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: config.initial_backoff(),
            ..Self::default()
        }
    }
}

/// Retry policy with exponential backoff.
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn with_config(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Backoff before retry number `retry` (1-based)
    pub fn backoff_for(&self, retry: usize) -> Duration {
        let exponent = u32::try_from(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        let factor = self.config.multiplier.saturating_pow(exponent);
        self.config.initial_backoff.saturating_mul(factor)
    }

    /// Execute a fallible operation with retries.
    ///
    /// `is_retryable` decides whether an error is worth another attempt;
    /// the last error is returned once retries are exhausted.
    pub async fn execute<F, Fut, T, E>(
        &self,
        mut operation: F,
        is_retryable: impl Fn(&E) -> bool,
    ) -> std::result::Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut retries = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if retries > 0 {
                        debug!("Advice call succeeded after {} retries", retries);
                    }
                    return Ok(result);
                }
                Err(error) => {
                    if !is_retryable(&error) {
                        warn!("Advice call failed with non-retryable error: {}", error);
                        return Err(error);
                    }

                    retries += 1;
                    if retries > self.config.max_retries {
                        warn!(
                            "Advice call failed after {} attempts: {}",
                            retries, error
                        );
                        return Err(error);
                    }

                    let delay = self.backoff_for(retries);
                    warn!(
                        "Advice call failed (attempt {}/{}): {}. Retrying in {:?}...",
                        retries,
                        self.config.max_retries + 1,
                        error,
                        delay
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
