//! Top-level error and retry-policy types for the article workflow.
//!
//! [`WorkflowError`] covers conditions that end or escalate a workflow
//! instance. [`ProviderError`] is what the collaborator port traits in
//! [`crate::ports`] return; it carries a [`RetryPolicy`] so the orchestrator
//! can decide whether to back off and try again.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Article, AttemptHistory, CollaboratorName, Feedback, ScoreReport};

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// - `Retryable` errors: timeouts, transient unavailability, malformed
///   responses (the next call may well succeed).
/// - `NonRetryable` errors: rejected requests (bad credentials, invalid input).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means apply the
        /// caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Collaborator errors
// ---------------------------------------------------------------------------

/// Failure reported by an external collaborator (research, generation,
/// publishing).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// The call did not complete in time.
    #[error("{collaborator} timed out")]
    Timeout { collaborator: CollaboratorName },

    /// The collaborator is temporarily unavailable (connection refused,
    /// 5xx, rate limited).
    #[error("{collaborator} unavailable: {message}")]
    Unavailable {
        collaborator: CollaboratorName,
        message: String,
        /// Server-provided hint such as a `Retry-After` header.
        retry_after: Option<Duration>,
    },

    /// The collaborator answered, but the payload could not be used.
    #[error("{collaborator} returned a malformed response: {message}")]
    MalformedResponse {
        collaborator: CollaboratorName,
        message: String,
    },

    /// The collaborator refused the request; retrying will not help.
    #[error("{collaborator} rejected the request: {message}")]
    Rejected {
        collaborator: CollaboratorName,
        message: String,
    },
}

impl ProviderError {
    /// Returns the collaborator that produced this error.
    pub fn collaborator(&self) -> &CollaboratorName {
        match self {
            Self::Timeout { collaborator }
            | Self::Unavailable { collaborator, .. }
            | Self::MalformedResponse { collaborator, .. }
            | Self::Rejected { collaborator, .. } => collaborator,
        }
    }

    /// Returns whether, and after how long, the failed call may be retried.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Timeout { .. } | Self::MalformedResponse { .. } => {
                RetryPolicy::Retryable { after: None }
            }
            Self::Unavailable { retry_after, .. } => RetryPolicy::Retryable {
                after: *retry_after,
            },
            Self::Rejected { .. } => RetryPolicy::NonRetryable,
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow errors
// ---------------------------------------------------------------------------

/// The stage a workflow instance was in when it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Research,
    Strategy,
    Generation,
    Publishing,
}

impl std::fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Research => "research",
            Self::Strategy => "strategy",
            Self::Generation => "generation",
            Self::Publishing => "publishing",
        };
        f.write_str(name)
    }
}

/// Everything a human reviewer needs once the retry budget is spent.
#[derive(Debug, Clone)]
pub struct Exhaustion {
    /// Number of scored attempts made (equals the configured maximum).
    pub attempts: u32,
    /// The article from the final attempt.
    pub last_article: Article,
    /// The report for [`Exhaustion::last_article`].
    pub last_report: ScoreReport,
    /// Feedback derived from the final report.
    pub feedback: Feedback,
    /// One record per scored attempt, oldest first.
    pub history: AttemptHistory,
}

/// Errors that end or escalate a workflow instance.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The article text is empty or cannot be scored.
    ///
    /// Scored as an automatic zero; does not consume a quality attempt.
    #[error("Malformed article: {reason}")]
    MalformedInput { reason: String },

    /// A collaborator kept failing after the back-off budget was spent, or
    /// failed with a non-retryable error.
    #[error("Collaborator {collaborator} unavailable after {tries} tries: {source}")]
    CollaboratorUnavailable {
        collaborator: CollaboratorName,
        tries: u32,
        #[source]
        source: ProviderError,
    },

    /// The article scored below threshold or carries a critical violation.
    ///
    /// Consumes one attempt of the retry loop.
    #[error(
        "Quality gate failed: {} of {} points, {} critical violation(s)",
        .report.total(),
        .report.threshold(),
        .report.critical_findings().count()
    )]
    QualityGateFail { report: Box<ScoreReport> },

    /// No attempt passed within the configured maximum. Terminal; the article
    /// is routed to human review and never published automatically.
    #[error(
        "Quality gate not passed after {} attempts (last score {})",
        .0.attempts,
        .0.last_report.total()
    )]
    RetriesExhausted(Box<Exhaustion>),

    /// The workflow was cancelled between steps.
    #[error("Workflow cancelled before {stage}")]
    Cancelled { stage: WorkflowStage },

    /// The rubric or runtime configuration is invalid.
    ///
    /// Produced at load time; a workflow never starts with an invalid config.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl WorkflowError {
    /// Shorthand for [`WorkflowError::ConfigurationError`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> CollaboratorName {
        CollaboratorName::new(s).unwrap()
    }

    #[test]
    fn test_retry_policy_by_kind() {
        let timeout = ProviderError::Timeout {
            collaborator: name("generation"),
        };
        assert_eq!(timeout.retry_policy(), RetryPolicy::Retryable { after: None });

        let limited = ProviderError::Unavailable {
            collaborator: name("web-search"),
            message: "429".into(),
            retry_after: Some(Duration::from_secs(7)),
        };
        assert_eq!(
            limited.retry_policy(),
            RetryPolicy::Retryable {
                after: Some(Duration::from_secs(7))
            }
        );

        let rejected = ProviderError::Rejected {
            collaborator: name("publisher"),
            message: "invalid token".into(),
        };
        assert_eq!(rejected.retry_policy(), RetryPolicy::NonRetryable);
        assert_eq!(rejected.collaborator().as_str(), "publisher");
    }

    #[test]
    fn test_collaborator_unavailable_display_includes_source() {
        let err = WorkflowError::CollaboratorUnavailable {
            collaborator: name("generation"),
            tries: 3,
            source: ProviderError::Timeout {
                collaborator: name("generation"),
            },
        };
        let text = err.to_string();
        assert!(text.contains("after 3 tries"));
        assert!(text.contains("timed out"));
    }
}
