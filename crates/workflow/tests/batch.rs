//! Batch runs over several briefs.

mod common;

use std::time::Duration;

use gate::WorkflowError;
use workflow::testing::ScriptedGenerator;
use workflow::{run_batch, CancellationFlag, WorkflowOutcome};

use common::{brief, failing_article, passing_article, Harness};

fn briefs(count: usize) -> Vec<gate::ArticleBrief> {
    (1..=count).map(|i| brief(&format!("Θέμα {i}"))).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn batch_respects_the_concurrency_bound() {
    let generator =
        ScriptedGenerator::always(passing_article()).with_delay(Duration::from_millis(25));
    let h = Harness::new(generator);

    let summary = run_batch(h.workflow.clone(), briefs(6), 2, &CancellationFlag::new()).await;

    assert!(h.generator.max_in_flight() <= 2);
    assert!(h.generator.max_in_flight() >= 1);
    assert_eq!(summary.total(), 6);
    assert_eq!(summary.succeeded(), 6);
    assert_eq!(summary.failed(), 0);
    assert_eq!(summary.success_rate(), 1.0);
    assert_eq!(h.publisher.published().len(), 6);

    let topics: Vec<&str> = summary.entries.iter().map(|e| e.topic.as_str()).collect();
    assert_eq!(
        topics,
        vec!["Θέμα 1", "Θέμα 2", "Θέμα 3", "Θέμα 4", "Θέμα 5", "Θέμα 6"]
    );
}

#[tokio::test]
async fn exhausted_briefs_count_as_needs_review() {
    let h = Harness::new(ScriptedGenerator::always(failing_article()));

    let summary = run_batch(h.workflow.clone(), briefs(3), 3, &CancellationFlag::new()).await;

    assert_eq!(summary.total(), 3);
    assert_eq!(summary.succeeded(), 0);
    assert_eq!(summary.needs_review(), 3);
    assert_eq!(summary.failed(), 0);
    assert_eq!(summary.success_rate(), 0.0);
    assert_eq!(h.publisher.reviewed().len(), 3);
    assert_eq!(h.generator.generate_calls(), 9);
}

#[tokio::test]
async fn cancelled_batch_fails_every_entry() {
    let h = Harness::new(ScriptedGenerator::always(passing_article()));
    let cancel = CancellationFlag::new();
    cancel.cancel();

    let summary = run_batch(h.workflow.clone(), briefs(4), 2, &cancel).await;

    assert_eq!(summary.failed(), 4);
    assert!(summary.entries.iter().all(|e| matches!(
        e.result,
        Err(WorkflowError::Cancelled { .. })
    )));
    assert!(h.publisher.published().is_empty());
}

#[tokio::test]
async fn empty_batch_has_zero_success_rate() {
    let h = Harness::new(ScriptedGenerator::always(passing_article()));

    let summary = run_batch(h.workflow.clone(), Vec::new(), 2, &CancellationFlag::new()).await;

    assert_eq!(summary.total(), 0);
    assert_eq!(summary.success_rate(), 0.0);
    assert!(summary
        .entries
        .iter()
        .all(|e| matches!(e.result, Ok(WorkflowOutcome::Published { .. }))));
}
