//! Running several briefs concurrently.

use std::sync::Arc;

use gate::{ArticleBrief, Topic, WorkflowError};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::cancel::CancellationFlag;
use crate::workflow::{ArticleWorkflow, WorkflowOutcome};

/// Default number of workflow instances allowed to run at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 3;

/// The result of one brief in a batch.
#[derive(Debug)]
pub struct BatchEntry {
    pub topic: Topic,
    pub result: Result<WorkflowOutcome, WorkflowError>,
}

/// Per-brief results in input order.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub entries: Vec<BatchEntry>,
    /// Tasks that panicked and produced no result.
    pub aborted: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.entries.len() + self.aborted
    }

    /// Briefs whose article was published.
    pub fn succeeded(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(&e.result, Ok(outcome) if outcome.is_published()))
            .count()
    }

    /// Briefs routed to human review.
    pub fn needs_review(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(&e.result, Ok(WorkflowOutcome::NeedsHumanReview { .. })))
            .count()
    }

    /// Briefs that ended with an error or never finished.
    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_err()).count() + self.aborted
    }

    /// Published share of all briefs, `0.0` for an empty batch.
    pub fn success_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.succeeded() as f64 / total as f64
        }
    }
}

/// Runs every brief through `workflow` with at most `max_concurrent`
/// instances in flight.
pub async fn run_batch(
    workflow: Arc<ArticleWorkflow>,
    briefs: Vec<ArticleBrief>,
    max_concurrent: usize,
    cancel: &CancellationFlag,
) -> BatchSummary {
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut tasks = JoinSet::new();
    let count = briefs.len();

    info!(briefs = count, max_concurrent, "Batch started");

    for (index, brief) in briefs.into_iter().enumerate() {
        let workflow = Arc::clone(&workflow);
        let semaphore = Arc::clone(&semaphore);
        let cancel = cancel.clone();
        tasks.spawn(async move {
            // Never closed, so acquisition cannot fail.
            let _permit = semaphore.acquire_owned().await.ok();
            let result = workflow.run(&brief, &cancel).await;
            (index, brief.topic, result)
        });
    }

    let mut slots: Vec<Option<BatchEntry>> = (0..count).map(|_| None).collect();
    let mut aborted = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, topic, result)) => {
                if let Err(err) = &result {
                    error!(%topic, error = %err, "Batch entry failed");
                }
                slots[index] = Some(BatchEntry { topic, result });
            }
            Err(join_error) => {
                error!(error = %join_error, "Batch task did not complete");
                aborted += 1;
            }
        }
    }

    let summary = BatchSummary {
        entries: slots.into_iter().flatten().collect(),
        aborted,
    };
    info!(
        succeeded = summary.succeeded(),
        needs_review = summary.needs_review(),
        failed = summary.failed(),
        success_rate = summary.success_rate(),
        "Batch finished"
    );
    summary
}
