//! Quality gate domain for ArticleFlow.
//!
//! This crate holds the article model, the scoring rubric, the deterministic
//! scoring engine, retry bookkeeping, and the collaborator port traits. The
//! `workflow` crate sequences calls across the ports; this crate decides
//! whether an article is good enough to publish.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** No I/O dependencies. Scoring is a
//! pure function of the article and the rubric.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`WorkflowRunId`, `Topic`, `Keyword`, ...) |
//! | [`types`] | Value types (`WordCount`, `TargetWordCount`, `WordCountRatio`, `Timestamp`) |
//! | [`errors`] | `WorkflowError`, `ProviderError`, `RetryPolicy` |
//! | [`article`] | Parsed markdown article and word counting |
//! | [`rubric`] | Rubric configuration with defaults and validation |
//! | [`scoring`] | `QualityGate` and `ScoreReport` |
//! | [`quick`] | A cheap pre-screen before the full rubric |
//! | [`feedback`] | Corrective feedback for the next generation attempt |
//! | [`history`] | Attempt records and retry-trend analysis |
//! | [`retry`] | `RetryConfig` and `RetryState` |
//! | [`ports`] | Collaborator traits and the data they exchange |
//! | [`fixtures`] | A deterministic sample article |

pub mod article;
mod checks;
pub mod errors;
pub mod feedback;
pub mod fixtures;
pub mod history;
pub mod identifiers;
pub mod ports;
pub mod quick;
pub mod retry;
pub mod rubric;
pub mod scoring;
pub mod types;

pub use article::{count_words, Article, Section};
pub use errors::{Exhaustion, ProviderError, RetryPolicy, WorkflowError, WorkflowStage};
pub use feedback::Feedback;
pub use history::{AttemptHistory, AttemptRecord, RetryTrend};
pub use identifiers::{CollaboratorName, DocumentId, Keyword, Topic, WorkflowRunId};
pub use ports::{
    ArticleBrief, ContentStrategy, CulturalContext, EditorialGuidelines, GenerationProvider,
    GenerationRequest, MedicalFacts, PublicationStatus, PublishProvider, PublishReceipt,
    ResearchBundle, ResearchProvider, ReviewSubmission,
};
pub use quick::QuickCheck;
pub use retry::{RetryConfig, RetryState};
pub use rubric::RubricConfig;
pub use scoring::{
    Category, CategoryScore, CategoryScores, Finding, QualityGate, ScoreReport, Violation,
    WordCountAssessment, WordCountTier,
};
pub use types::{Severity, TargetWordCount, Timestamp, Trend, WordCount, WordCountRatio};
