//! The bounded generate-score-retry loop.
//!
//! Each iteration asks the generator for an article, scores it, and either
//! returns the passing article or builds feedback for the next attempt. At
//! most `max_attempts` articles are scored. Empty generator output is not a
//! scored attempt: it is recorded as a zero report and charged to the
//! collaborator retry budget instead.

use gate::{
    Article, ArticleBrief, AttemptHistory, AttemptRecord, ContentStrategy, Exhaustion, Feedback,
    GenerationProvider, GenerationRequest, QualityGate, ResearchBundle, RetryConfig, RetryState,
    ScoreReport, WorkflowError, WorkflowStage,
};
use tracing::{info, warn};

use crate::backoff::call_with_backoff;
use crate::cancel::CancellationFlag;

/// A passing article and how it got there.
#[derive(Debug, Clone)]
pub struct GatePass {
    pub article: Article,
    pub report: ScoreReport,
    /// Number of scored attempts, including the passing one.
    pub attempts: u32,
    pub history: AttemptHistory,
    /// Zero reports recorded for empty generator output.
    pub malformed_reports: Vec<ScoreReport>,
}

/// Borrowed collaborators and settings for one run of the loop.
pub struct QualityLoop<'a> {
    pub gate: &'a QualityGate,
    pub generator: &'a dyn GenerationProvider,
    pub retry: &'a RetryConfig,
    pub cancel: &'a CancellationFlag,
}

impl QualityLoop<'_> {
    /// Runs the loop until an article passes or the attempt budget is spent.
    ///
    /// Returns [`WorkflowError::RetriesExhausted`] when no attempt passes.
    pub async fn run(
        &self,
        brief: &ArticleBrief,
        research: &ResearchBundle,
        strategy: &ContentStrategy,
    ) -> Result<GatePass, WorkflowError> {
        let mut state = RetryState::new(self.retry.max_attempts);
        let mut history = AttemptHistory::new();
        let mut malformed_reports = Vec::new();
        let mut feedback: Option<Feedback> = None;
        let mut last_failure: Option<(Article, ScoreReport)> = None;

        while let Some(attempt) = state.begin_attempt() {
            self.cancel.check(WorkflowStage::Generation)?;

            let request = GenerationRequest {
                brief,
                research,
                strategy,
                attempt,
                feedback: feedback.as_ref(),
            };
            let (article, report) = self.generate_scored(&request, &mut malformed_reports).await?;
            history.push(AttemptRecord::from_report(attempt, &report));

            match report.into_decision() {
                Ok(report) => {
                    info!(
                        attempt,
                        total = report.total(),
                        threshold = report.threshold(),
                        "Article passed the quality gate"
                    );
                    return Ok(GatePass {
                        article,
                        report,
                        attempts: attempt,
                        history,
                        malformed_reports,
                    });
                }
                Err(WorkflowError::QualityGateFail { report }) => {
                    let tags = report.violation_tags();
                    warn!(
                        attempt,
                        max_attempts = state.max_attempts(),
                        total = report.total(),
                        threshold = report.threshold(),
                        violations = ?tags,
                        "Article failed the quality gate"
                    );
                    state.record_failure(tags);
                    feedback = Some(Feedback::from_report(&report, attempt));
                    last_failure = Some((article, *report));
                }
                Err(other) => return Err(other),
            }
        }

        let Some((last_article, last_report)) = last_failure else {
            return Err(WorkflowError::config("max_attempts must be at least 1"));
        };
        let feedback = feedback.unwrap_or_else(|| Feedback::from_report(&last_report, state.attempt()));
        warn!(
            attempts = state.attempt(),
            last_total = last_report.total(),
            violations = ?state.last_violations(),
            "Quality gate retries exhausted"
        );
        Err(WorkflowError::RetriesExhausted(Box::new(Exhaustion {
            attempts: state.attempt(),
            last_article,
            last_report,
            feedback,
            history,
        })))
    }

    /// Generates and scores one article, re-requesting empty output within
    /// the collaborator retry budget.
    async fn generate_scored(
        &self,
        request: &GenerationRequest<'_>,
        malformed_reports: &mut Vec<ScoreReport>,
    ) -> Result<(Article, ScoreReport), WorkflowError> {
        let generator = self.generator;
        let mut malformed_tries = 0;

        loop {
            let markdown = call_with_backoff(self.retry, || generator.generate(request)).await?;
            let article = Article::from_markdown(markdown, request.brief.target_word_count)
                .with_main_keyword(request.brief.primary_keyword().cloned())
                .with_attempt(request.attempt);

            match self.gate.evaluate(&article) {
                Ok(report) => return Ok((article, report)),
                Err(WorkflowError::MalformedInput { reason }) => {
                    malformed_tries += 1;
                    let zero = ScoreReport::malformed(&article, self.gate.rubric());
                    warn!(
                        attempt = request.attempt,
                        tries = malformed_tries,
                        total = zero.total(),
                        %reason,
                        "Generated article is malformed"
                    );
                    malformed_reports.push(zero);
                    if malformed_tries >= self.retry.collaborator_retries {
                        return Err(WorkflowError::MalformedInput {
                            reason: format!("{reason} after {malformed_tries} tries"),
                        });
                    }
                    tokio::time::sleep(self.retry.backoff_delay(malformed_tries)).await;
                }
                Err(other) => return Err(other),
            }
        }
    }
}
