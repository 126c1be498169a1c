//! Retrying collaborator calls with exponential back-off.

use std::future::Future;

use gate::{ProviderError, RetryConfig, RetryPolicy, WorkflowError};
use tracing::warn;

/// Calls `call` until it succeeds, fails with a non-retryable error, or
/// `config.collaborator_retries` tries are spent.
///
/// The delay before each re-try is the configured schedule entry or the
/// collaborator's own `retry_after` hint, whichever is longer.
pub async fn call_with_backoff<T, F, Fut>(config: &RetryConfig, mut call: F) -> Result<T, WorkflowError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let max_tries = config.collaborator_retries.max(1);
    let mut tries = 0;

    loop {
        tries += 1;
        let err = match call().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let hint = match err.retry_policy() {
            RetryPolicy::Retryable { after } if tries < max_tries => after,
            _ => {
                return Err(WorkflowError::CollaboratorUnavailable {
                    collaborator: err.collaborator().clone(),
                    tries,
                    source: err,
                });
            }
        };

        let delay = config.backoff_delay(tries).max(hint.unwrap_or_default());
        warn!(
            collaborator = %err.collaborator(),
            attempt = tries,
            backoff_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "Collaborator call failed, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
    }
}
