use crate::error::{ApiError, AppError};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Retry configuration for storage operations
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt
    pub max_retries: u32,
    /// Linear backoff unit: retry N waits N of these
    pub backoff_unit: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

/// Side effect invoked between a classified authentication failure and the
/// next attempt. Keeps the retry loop domain-agnostic; credential rotation
/// lives in the hook implementation.
#[async_trait]
pub trait RetryHook: Send + Sync {
    async fn before_retry(&self, attempt: u32, last_error: &ApiError) -> Result<(), AppError>;
}

/// Retry executor that recovers only from authentication failures.
///
/// Every other failure kind propagates immediately: a malformed query or an
/// unreachable endpoint is not self-healing, only credential staleness is.
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Execute an async operation, rotating the credential through `hook`
    /// before each retry. Exhausting the bound surfaces the last
    /// authentication failure wrapped in `RetriesExhausted`.
    pub async fn execute<F, Fut, T>(&self, hook: &dyn RetryHook, operation: F) -> Result<T, AppError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(AppError::Api(error)) if error.is_auth_failure() => {
                    if attempt >= self.config.max_retries {
                        log::warn!(
                            "Max retry attempts reached ({}), giving up",
                            self.config.max_retries
                        );
                        return Err(ApiError::RetriesExhausted {
                            attempts: self.config.max_retries,
                            source: Box::new(error),
                        }
                        .into());
                    }

                    attempt += 1;
                    let delay = self.config.backoff_unit * attempt;
                    log::info!(
                        "Authentication failure, retry attempt wait {:?} (attempt {} of {})",
                        delay,
                        attempt,
                        self.config.max_retries
                    );
                    tokio::time::sleep(delay).await;
                    hook.before_retry(attempt, &error).await?;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
