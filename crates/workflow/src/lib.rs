//! ArticleFlow orchestration.
//!
//! This crate drives one brief from research to publication: it fans research
//! out concurrently, drafts a content strategy, runs the bounded quality retry
//! loop, and either publishes the passing article or files the last attempt for
//! human review. It also runs batches of briefs under a concurrency bound.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Sequences calls between the business logic in the
//! [`gate`] crate and the collaborator ports. It contains no scoring rules of
//! its own.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`backoff`] | Retrying collaborator calls with exponential back-off |
//! | [`research`] | Concurrent research fan-out |
//! | [`gate_loop`] | The generate-score-retry loop |
//! | [`workflow`] | `ArticleWorkflow` and `WorkflowOutcome` |
//! | [`batch`] | `run_batch` and `BatchSummary` |
//! | [`cancel`] | `CancellationFlag` |
//! | [`settings`] | Environment and rubric-file configuration |
//! | [`testing`] | In-memory collaborators |

pub mod backoff;
pub mod batch;
pub mod cancel;
pub mod gate_loop;
pub mod research;
pub mod settings;
pub mod testing;
pub mod workflow;

pub use batch::{run_batch, BatchEntry, BatchSummary, DEFAULT_MAX_CONCURRENT};
pub use cancel::CancellationFlag;
pub use gate_loop::{GatePass, QualityLoop};
pub use settings::Settings;
pub use workflow::{ArticleWorkflow, WorkflowOutcome};
