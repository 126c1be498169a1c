//! Concurrent research fan-out.

use gate::{ArticleBrief, ResearchBundle, ResearchProvider, RetryConfig, WorkflowError};
use tracing::{debug, instrument};

use crate::backoff::call_with_backoff;

/// Runs the medical, cultural and editorial lookups concurrently.
///
/// All three must succeed. The first lookup to fail after its back-off budget
/// fails the whole fan-out and the remaining lookups are dropped.
#[instrument(skip_all, fields(topic = %brief.topic))]
pub async fn gather_research(
    provider: &dyn ResearchProvider,
    brief: &ArticleBrief,
    retry: &RetryConfig,
) -> Result<ResearchBundle, WorkflowError> {
    let (medical, cultural, guidelines) = tokio::try_join!(
        call_with_backoff(retry, || provider.medical_facts(brief)),
        call_with_backoff(retry, || provider.cultural_context(brief)),
        call_with_backoff(retry, || provider.editorial_guidelines(brief)),
    )?;

    debug!(
        passages = medical.passages.len(),
        notes = cultural.notes.len(),
        rules = guidelines.rules.len(),
        "Research gathered"
    );

    Ok(ResearchBundle {
        medical,
        cultural,
        guidelines,
    })
}
