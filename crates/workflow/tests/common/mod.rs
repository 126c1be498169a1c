#![allow(dead_code)]

use std::sync::Arc;

use gate::fixtures::ArticleFixture;
use gate::{
    ArticleBrief, CollaboratorName, Keyword, ProviderError, QualityGate, RetryConfig,
    RubricConfig, TargetWordCount, Topic,
};
use workflow::testing::{RecordingPublisher, ScriptedGenerator, StaticResearch};
use workflow::ArticleWorkflow;

pub const TARGET_WORDS: u32 = 1500;

pub fn name(value: &str) -> CollaboratorName {
    CollaboratorName::new(value).unwrap()
}

pub fn brief(topic: &str) -> ArticleBrief {
    ArticleBrief::new(
        Topic::new(topic).unwrap(),
        TargetWordCount::new(TARGET_WORDS).unwrap(),
    )
    .with_main_keyword(Keyword::new(gate::fixtures::FIXTURE_KEYWORD).unwrap())
}

fn fixture() -> ArticleFixture {
    ArticleFixture::new(TargetWordCount::new(TARGET_WORDS).unwrap())
}

/// Markdown that passes the default rubric.
pub fn passing_article() -> String {
    fixture().markdown()
}

/// Markdown that fails on a critical first-person violation.
pub fn failing_article() -> String {
    fixture().with_first_person().markdown()
}

/// Markdown that fails on a missing disclaimer.
pub fn other_failing_article() -> String {
    fixture().without_disclaimer().markdown()
}

pub fn timeout(collaborator: &str) -> ProviderError {
    ProviderError::Timeout {
        collaborator: name(collaborator),
    }
}

/// Collaborators plus the workflow wired to them, with zero-delay back-off.
pub struct Harness {
    pub research: Arc<StaticResearch>,
    pub generator: Arc<ScriptedGenerator>,
    pub publisher: Arc<RecordingPublisher>,
    pub workflow: Arc<ArticleWorkflow>,
}

impl Harness {
    pub fn new(generator: ScriptedGenerator) -> Self {
        Self::with(StaticResearch::sample(), generator, RetryConfig::immediate(3, 3))
    }

    pub fn with(research: StaticResearch, generator: ScriptedGenerator, retry: RetryConfig) -> Self {
        let research = Arc::new(research);
        let generator = Arc::new(generator);
        let publisher = Arc::new(RecordingPublisher::new(name("publisher")));
        let gate = QualityGate::new(RubricConfig::default()).unwrap();
        let workflow = ArticleWorkflow::new(
            research.clone(),
            generator.clone(),
            publisher.clone(),
            gate,
            retry,
        )
        .unwrap();

        Self {
            research,
            generator,
            publisher,
            workflow: Arc::new(workflow),
        }
    }
}
