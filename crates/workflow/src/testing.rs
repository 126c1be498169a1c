// In-memory collaborators for tests and dry runs.
//
// Three fakes matching the three ports:
// - StaticResearch (ResearchProvider): fixed bundle, optional failing lookup
// - ScriptedGenerator (GenerationProvider): replays scripted responses
// - RecordingPublisher (PublishProvider): records publications and reviews
//
// Every fake counts its calls so tests can assert on what the workflow did.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use gate::{
    Article, ArticleBrief, CollaboratorName, ContentStrategy, CulturalContext, DocumentId,
    EditorialGuidelines, Feedback, GenerationProvider, GenerationRequest, MedicalFacts,
    ProviderError, PublicationStatus, PublishProvider, PublishReceipt, ResearchBundle,
    ResearchProvider, ReviewSubmission, ScoreReport, Topic,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

// ---------------------------------------------------------------------------
// StaticResearch
// ---------------------------------------------------------------------------

/// Which research lookup a [`StaticResearch`] should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResearchLookup {
    MedicalFacts,
    CulturalContext,
    EditorialGuidelines,
}

/// Returns the same bundle for every brief.
pub struct StaticResearch {
    bundle: ResearchBundle,
    failure: Option<(ResearchLookup, ProviderError)>,
    calls: AtomicUsize,
}

impl StaticResearch {
    pub fn new(bundle: ResearchBundle) -> Self {
        Self {
            bundle,
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A small bundle with one entry per lookup.
    pub fn sample() -> Self {
        Self::new(ResearchBundle {
            medical: MedicalFacts {
                passages: vec!["Ο μηνίσκος απορροφά τους κραδασμούς της άρθρωσης.".into()],
            },
            cultural: CulturalContext {
                notes: vec!["Το ποδόσφαιρο είναι η συχνότερη αιτία τραυματισμού.".into()],
            },
            guidelines: EditorialGuidelines {
                rules: vec!["Τρίτο πρόσωπο σε όλο το κείμενο.".into()],
            },
        })
    }

    /// Makes `lookup` fail with `error` on every call.
    pub fn failing(mut self, lookup: ResearchLookup, error: ProviderError) -> Self {
        self.failure = Some((lookup, error));
        self
    }

    /// Total calls across all three lookups.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, lookup: ResearchLookup) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some((failing, error)) if *failing == lookup => Err(error.clone()),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ResearchProvider for StaticResearch {
    async fn medical_facts(&self, _brief: &ArticleBrief) -> Result<MedicalFacts, ProviderError> {
        self.check(ResearchLookup::MedicalFacts)?;
        Ok(self.bundle.medical.clone())
    }

    async fn cultural_context(
        &self,
        _brief: &ArticleBrief,
    ) -> Result<CulturalContext, ProviderError> {
        self.check(ResearchLookup::CulturalContext)?;
        Ok(self.bundle.cultural.clone())
    }

    async fn editorial_guidelines(
        &self,
        _brief: &ArticleBrief,
    ) -> Result<EditorialGuidelines, ProviderError> {
        self.check(ResearchLookup::EditorialGuidelines)?;
        Ok(self.bundle.guidelines.clone())
    }
}

// ---------------------------------------------------------------------------
// ScriptedGenerator
// ---------------------------------------------------------------------------

/// What the generator was asked for on one call.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub topic: Topic,
    pub attempt: u32,
    pub feedback: Option<Feedback>,
}

/// Replays scripted `generate` responses in order; the last one repeats once
/// the script runs out. An empty script produces empty articles.
///
/// Builder pattern: `.respond()`, `.fail()`, `.with_delay()`.
pub struct ScriptedGenerator {
    strategy: ContentStrategy,
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    last: Mutex<Option<Result<String, ProviderError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    strategy_calls: AtomicUsize,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            strategy: ContentStrategy {
                title: "Ρήξη μηνίσκου: αίτια και αντιμετώπιση".into(),
                sections: vec![
                    "Ανατομία του γόνατος".into(),
                    "Συμπτώματα".into(),
                    "Διάγνωση".into(),
                    "Θεραπεία".into(),
                    "Αποκατάσταση".into(),
                ],
            },
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
            strategy_calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// A generator that always returns `markdown`.
    pub fn always(markdown: impl Into<String>) -> Self {
        Self::new().respond(markdown)
    }

    pub fn respond(self, markdown: impl Into<String>) -> Self {
        lock(&self.script).push_back(Ok(markdown.into()));
        self
    }

    pub fn fail(self, error: ProviderError) -> Self {
        lock(&self.script).push_back(Err(error));
        self
    }

    /// Sleeps for `delay` inside every `generate` call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    pub fn generate_calls(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn strategy_calls(&self) -> usize {
        self.strategy_calls.load(Ordering::SeqCst)
    }

    /// Highest number of `generate` calls that overlapped.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Result<String, ProviderError> {
        let mut last = lock(&self.last);
        if let Some(response) = lock(&self.script).pop_front() {
            *last = Some(response);
        }
        last.clone().unwrap_or_else(|| Ok(String::new()))
    }
}

#[async_trait]
impl GenerationProvider for ScriptedGenerator {
    async fn draft_strategy(
        &self,
        _brief: &ArticleBrief,
        _research: &ResearchBundle,
    ) -> Result<ContentStrategy, ProviderError> {
        self.strategy_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.strategy.clone())
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, ProviderError> {
        lock(&self.requests).push(RecordedRequest {
            topic: request.brief.topic.clone(),
            attempt: request.attempt,
            feedback: request.feedback.cloned(),
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.next_response()
    }
}

// ---------------------------------------------------------------------------
// RecordingPublisher
// ---------------------------------------------------------------------------

/// One call to [`PublishProvider::publish`].
#[derive(Debug, Clone)]
pub struct PublishedArticle {
    pub document_id: DocumentId,
    pub topic: Topic,
    pub article: Article,
    pub report: ScoreReport,
}

/// One call to [`PublishProvider::submit_for_review`].
#[derive(Debug, Clone)]
pub struct ReviewedArticle {
    pub document_id: DocumentId,
    pub topic: Topic,
    pub total: u32,
    pub attempts: u32,
    pub feedback: Feedback,
    pub recommendation: Option<String>,
}

/// Records everything it is asked to publish or file for review.
pub struct RecordingPublisher {
    name: CollaboratorName,
    published: Mutex<Vec<PublishedArticle>>,
    reviewed: Mutex<Vec<ReviewedArticle>>,
    failure: Option<ProviderError>,
    documents: AtomicUsize,
}

impl RecordingPublisher {
    pub fn new(name: CollaboratorName) -> Self {
        Self {
            name,
            published: Mutex::new(Vec::new()),
            reviewed: Mutex::new(Vec::new()),
            failure: None,
            documents: AtomicUsize::new(0),
        }
    }

    /// Makes every call fail with `error`.
    pub fn failing(mut self, error: ProviderError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn published(&self) -> Vec<PublishedArticle> {
        lock(&self.published).clone()
    }

    pub fn reviewed(&self) -> Vec<ReviewedArticle> {
        lock(&self.reviewed).clone()
    }

    fn next_document(&self, prefix: &str) -> Result<DocumentId, ProviderError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        let n = self.documents.fetch_add(1, Ordering::SeqCst) + 1;
        DocumentId::new(format!("{prefix}-{n}")).ok_or_else(|| ProviderError::MalformedResponse {
            collaborator: self.name.clone(),
            message: "blank document id".into(),
        })
    }
}

#[async_trait]
impl PublishProvider for RecordingPublisher {
    async fn publish(
        &self,
        brief: &ArticleBrief,
        article: &Article,
        report: &ScoreReport,
    ) -> Result<PublishReceipt, ProviderError> {
        let document_id = self.next_document("published")?;
        lock(&self.published).push(PublishedArticle {
            document_id: document_id.clone(),
            topic: brief.topic.clone(),
            article: article.clone(),
            report: report.clone(),
        });
        Ok(PublishReceipt {
            location: Some(format!("published/{document_id}.md")),
            document_id,
            status: PublicationStatus::Published,
        })
    }

    async fn submit_for_review(
        &self,
        submission: &ReviewSubmission<'_>,
    ) -> Result<PublishReceipt, ProviderError> {
        let document_id = self.next_document("review")?;
        lock(&self.reviewed).push(ReviewedArticle {
            document_id: document_id.clone(),
            topic: submission.brief.topic.clone(),
            total: submission.report.total(),
            attempts: submission.attempts,
            feedback: submission.feedback.clone(),
            recommendation: submission.trend.map(|t| t.recommendation.clone()),
        });
        Ok(PublishReceipt {
            location: Some(format!("needs_review/{document_id}.md")),
            document_id,
            status: PublicationStatus::NeedsReview,
        })
    }
}
