//! One article from brief to publication or human review.

use std::sync::Arc;

use gate::{
    ArticleBrief, AttemptHistory, Exhaustion, GenerationProvider, PublishProvider, PublishReceipt,
    QualityGate, ResearchProvider, RetryConfig, RetryTrend, ReviewSubmission, ScoreReport,
    WorkflowError, WorkflowRunId, WorkflowStage,
};
use tracing::{info, info_span, warn, Instrument};

use crate::backoff::call_with_backoff;
use crate::cancel::CancellationFlag;
use crate::gate_loop::QualityLoop;
use crate::research::gather_research;

/// How a workflow instance ended.
#[derive(Debug)]
pub enum WorkflowOutcome {
    /// The article passed the gate and was published.
    Published {
        run_id: WorkflowRunId,
        receipt: PublishReceipt,
        report: ScoreReport,
        attempts: u32,
        history: AttemptHistory,
    },
    /// No attempt passed; the last article was filed for human review.
    NeedsHumanReview {
        run_id: WorkflowRunId,
        receipt: PublishReceipt,
        exhaustion: Box<Exhaustion>,
        trend: Option<RetryTrend>,
    },
}

impl WorkflowOutcome {
    pub fn run_id(&self) -> WorkflowRunId {
        match self {
            Self::Published { run_id, .. } | Self::NeedsHumanReview { run_id, .. } => *run_id,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }
}

/// Sequences research, strategy, the quality loop and publishing.
///
/// Holds no per-run state, so one instance can drive many runs concurrently.
pub struct ArticleWorkflow {
    research: Arc<dyn ResearchProvider>,
    generator: Arc<dyn GenerationProvider>,
    publisher: Arc<dyn PublishProvider>,
    gate: QualityGate,
    retry: RetryConfig,
}

impl ArticleWorkflow {
    pub fn new(
        research: Arc<dyn ResearchProvider>,
        generator: Arc<dyn GenerationProvider>,
        publisher: Arc<dyn PublishProvider>,
        gate: QualityGate,
        retry: RetryConfig,
    ) -> Result<Self, WorkflowError> {
        retry.validate()?;
        Ok(Self {
            research,
            generator,
            publisher,
            gate,
            retry,
        })
    }

    pub fn gate(&self) -> &QualityGate {
        &self.gate
    }

    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// Runs one brief to completion.
    ///
    /// Exhausting the retry budget is not an error: the article goes to human
    /// review and the outcome is [`WorkflowOutcome::NeedsHumanReview`].
    pub async fn run(
        &self,
        brief: &ArticleBrief,
        cancel: &CancellationFlag,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let run_id = WorkflowRunId::new_random();
        let span = info_span!("workflow_run", %run_id, topic = %brief.topic);
        self.run_inner(run_id, brief, cancel).instrument(span).await
    }

    async fn run_inner(
        &self,
        run_id: WorkflowRunId,
        brief: &ArticleBrief,
        cancel: &CancellationFlag,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        info!(target_words = brief.target_word_count.as_u32(), "Workflow started");

        cancel.check(WorkflowStage::Research)?;
        let research = gather_research(self.research.as_ref(), brief, &self.retry).await?;

        cancel.check(WorkflowStage::Strategy)?;
        let generator = self.generator.as_ref();
        let strategy =
            call_with_backoff(&self.retry, || generator.draft_strategy(brief, &research)).await?;
        info!(sections = strategy.sections.len(), "Content strategy drafted");

        let quality = QualityLoop {
            gate: &self.gate,
            generator,
            retry: &self.retry,
            cancel,
        };
        let publisher = self.publisher.as_ref();

        match quality.run(brief, &research, &strategy).await {
            Ok(pass) => {
                cancel.check(WorkflowStage::Publishing)?;
                let receipt =
                    call_with_backoff(&self.retry, || publisher.publish(brief, &pass.article, &pass.report))
                        .await?;
                info!(
                    document_id = %receipt.document_id,
                    total = pass.report.total(),
                    attempts = pass.attempts,
                    "Article published"
                );
                Ok(WorkflowOutcome::Published {
                    run_id,
                    receipt,
                    report: pass.report,
                    attempts: pass.attempts,
                    history: pass.history,
                })
            }
            Err(WorkflowError::RetriesExhausted(exhaustion)) => {
                cancel.check(WorkflowStage::Publishing)?;
                let trend = exhaustion.history.analyze();
                let submission = ReviewSubmission {
                    brief,
                    article: &exhaustion.last_article,
                    report: &exhaustion.last_report,
                    feedback: &exhaustion.feedback,
                    trend: trend.as_ref(),
                    attempts: exhaustion.attempts,
                };
                let receipt =
                    call_with_backoff(&self.retry, || publisher.submit_for_review(&submission)).await?;
                warn!(
                    document_id = %receipt.document_id,
                    attempts = exhaustion.attempts,
                    last_total = exhaustion.last_report.total(),
                    recommendation = trend.as_ref().map(|t| t.recommendation.as_str()),
                    "Article routed to human review"
                );
                Ok(WorkflowOutcome::NeedsHumanReview {
                    run_id,
                    receipt,
                    exhaustion,
                    trend,
                })
            }
            Err(err) => Err(err),
        }
    }
}
