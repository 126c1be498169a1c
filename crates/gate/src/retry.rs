//! Retry budgets and the explicit state of the quality retry loop.
//!
//! Two budgets are kept apart:
//!
//! - `max_attempts` bounds the number of *scored* generation attempts.
//! - `collaborator_retries` bounds how often a single collaborator call is
//!   tried when it fails with a retryable [`crate::ProviderError`], using the
//!   `backoff_ms` schedule between tries.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::WorkflowError;

/// Retry configuration for one workflow instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    /// Total tries per collaborator call, including the first.
    pub collaborator_retries: u32,
    /// Delay before each re-try, in milliseconds. The last entry repeats if
    /// there are more re-tries than entries.
    pub backoff_ms: Vec<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            collaborator_retries: 3,
            backoff_ms: vec![1_000, 2_000, 4_000],
        }
    }
}

impl RetryConfig {
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.max_attempts == 0 {
            return Err(WorkflowError::config("max_attempts must be at least 1"));
        }
        if self.collaborator_retries == 0 {
            return Err(WorkflowError::config(
                "collaborator_retries must be at least 1",
            ));
        }
        Ok(())
    }

    /// Delay before re-try number `retry` (1-based). Zero if no schedule is
    /// configured.
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let index = usize::try_from(retry.saturating_sub(1)).unwrap_or(usize::MAX);
        let ms = self
            .backoff_ms
            .get(index)
            .or_else(|| self.backoff_ms.last())
            .copied()
            .unwrap_or(0);
        Duration::from_millis(ms)
    }

    /// A configuration with no back-off delays, for tests and dry runs.
    pub fn immediate(max_attempts: u32, collaborator_retries: u32) -> Self {
        Self {
            max_attempts,
            collaborator_retries,
            backoff_ms: Vec::new(),
        }
    }
}

/// Progress of the quality retry loop.
///
/// The attempt counter starts at zero and never exceeds `max_attempts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
    max_attempts: u32,
    last_violations: Vec<&'static str>,
}

impl RetryState {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempt: 0,
            max_attempts,
            last_violations: Vec::new(),
        }
    }

    /// Starts the next attempt and returns its 1-based number, or `None` once
    /// the budget is spent.
    pub fn begin_attempt(&mut self) -> Option<u32> {
        if self.is_exhausted() {
            return None;
        }
        self.attempt += 1;
        Some(self.attempt)
    }

    /// Records the violations of the attempt that just failed.
    pub fn record_failure(&mut self, violations: impl IntoIterator<Item = &'static str>) {
        self.last_violations = violations.into_iter().collect();
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn last_violations(&self) -> &[&'static str] {
        &self.last_violations
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backoff_schedule() {
        let config = RetryConfig::default();
        assert_eq!(config.backoff_delay(1), Duration::from_secs(1));
        assert_eq!(config.backoff_delay(2), Duration::from_secs(2));
        assert_eq!(config.backoff_delay(3), Duration::from_secs(4));
        assert_eq!(config.backoff_delay(9), Duration::from_secs(4));
        assert_eq!(RetryConfig::immediate(3, 3).backoff_delay(1), Duration::ZERO);
    }

    #[test]
    fn test_zero_attempts_is_rejected() {
        assert!(RetryConfig::immediate(0, 3).validate().is_err());
        assert!(RetryConfig::immediate(3, 0).validate().is_err());
        assert!(RetryConfig::default().validate().is_ok());
    }

    #[test]
    fn test_attempt_counter_never_exceeds_max() {
        let mut state = RetryState::new(3);
        assert_eq!(state.begin_attempt(), Some(1));
        assert_eq!(state.begin_attempt(), Some(2));
        assert_eq!(state.begin_attempt(), Some(3));
        assert!(state.is_exhausted());
        assert_eq!(state.begin_attempt(), None);
        assert_eq!(state.attempt(), 3);
    }

    #[test]
    fn test_record_failure_replaces_violations() {
        let mut state = RetryState::new(2);
        state.record_failure(["a", "b"]);
        state.record_failure(["c"]);
        assert_eq!(state.last_violations(), &["c"]);
    }
}
