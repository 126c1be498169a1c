//! Collaborator ports and the data they exchange with the workflow.
//!
//! The workflow reaches research, generation and publishing services only
//! through these traits. They are object-safe (`Arc<dyn ResearchProvider>`)
//! and every method returns [`ProviderError`] so the caller can apply the
//! retry policy uniformly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    Article, DocumentId, Feedback, Keyword, ProviderError, RetryTrend, ScoreReport,
    TargetWordCount, Topic,
};

// ---------------------------------------------------------------------------
// Brief
// ---------------------------------------------------------------------------

/// What one workflow instance is asked to write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleBrief {
    pub topic: Topic,
    pub target_word_count: TargetWordCount,
    #[serde(default)]
    pub main_keywords: Vec<Keyword>,
    #[serde(default)]
    pub secondary_keywords: Vec<Keyword>,
    /// Phrases the article must avoid.
    #[serde(default)]
    pub negative_keywords: Vec<Keyword>,
}

impl ArticleBrief {
    pub fn new(topic: Topic, target_word_count: TargetWordCount) -> Self {
        Self {
            topic,
            target_word_count,
            main_keywords: Vec::new(),
            secondary_keywords: Vec::new(),
            negative_keywords: Vec::new(),
        }
    }

    pub fn with_main_keyword(mut self, keyword: Keyword) -> Self {
        self.main_keywords.push(keyword);
        self
    }

    pub fn with_secondary_keyword(mut self, keyword: Keyword) -> Self {
        self.secondary_keywords.push(keyword);
        self
    }

    pub fn with_negative_keyword(mut self, keyword: Keyword) -> Self {
        self.negative_keywords.push(keyword);
        self
    }

    /// The keyword the SEO checks look for in the title and opening.
    pub fn primary_keyword(&self) -> Option<&Keyword> {
        self.main_keywords.first()
    }
}

// ---------------------------------------------------------------------------
// Research
// ---------------------------------------------------------------------------

/// Passages retrieved from the medical knowledge base.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalFacts {
    pub passages: Vec<String>,
}

/// Local and cultural context found by web search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CulturalContext {
    pub notes: Vec<String>,
}

/// House style rules read from the editorial sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorialGuidelines {
    pub rules: Vec<String>,
}

/// Everything research produced for one brief. Read-only once assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchBundle {
    pub medical: MedicalFacts,
    pub cultural: CulturalContext,
    pub guidelines: EditorialGuidelines,
}

/// Planned title and section headings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStrategy {
    pub title: String,
    pub sections: Vec<String>,
}

// ---------------------------------------------------------------------------
// Generation and publishing payloads
// ---------------------------------------------------------------------------

/// Inputs of one generation attempt. `feedback` is `None` on the first.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub brief: &'a ArticleBrief,
    pub research: &'a ResearchBundle,
    pub strategy: &'a ContentStrategy,
    pub attempt: u32,
    pub feedback: Option<&'a Feedback>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationStatus {
    Published,
    NeedsReview,
}

/// Where a publisher put a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub document_id: DocumentId,
    pub status: PublicationStatus,
    pub location: Option<String>,
}

/// An article routed to a human editor after the retry budget ran out.
#[derive(Debug, Clone, Copy)]
pub struct ReviewSubmission<'a> {
    pub brief: &'a ArticleBrief,
    pub article: &'a Article,
    pub report: &'a ScoreReport,
    pub feedback: &'a Feedback,
    pub trend: Option<&'a RetryTrend>,
    pub attempts: u32,
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Vector search, web search and editorial-sheet lookups.
#[async_trait]
pub trait ResearchProvider: Send + Sync {
    async fn medical_facts(&self, brief: &ArticleBrief) -> Result<MedicalFacts, ProviderError>;

    async fn cultural_context(&self, brief: &ArticleBrief)
        -> Result<CulturalContext, ProviderError>;

    async fn editorial_guidelines(
        &self,
        brief: &ArticleBrief,
    ) -> Result<EditorialGuidelines, ProviderError>;
}

/// The language model that plans and writes articles.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn draft_strategy(
        &self,
        brief: &ArticleBrief,
        research: &ResearchBundle,
    ) -> Result<ContentStrategy, ProviderError>;

    /// Returns the article as markdown.
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, ProviderError>;
}

/// Document storage for passed and escalated articles.
#[async_trait]
pub trait PublishProvider: Send + Sync {
    /// Publishes an article that passed the gate.
    async fn publish(
        &self,
        brief: &ArticleBrief,
        article: &Article,
        report: &ScoreReport,
    ) -> Result<PublishReceipt, ProviderError>;

    /// Files an article for human review. Never publishes it.
    async fn submit_for_review(
        &self,
        submission: &ReviewSubmission<'_>,
    ) -> Result<PublishReceipt, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brief_primary_keyword_is_first_main_keyword() {
        let brief = ArticleBrief::new(
            Topic::new("Ρήξη μηνίσκου").unwrap(),
            TargetWordCount::new(1500).unwrap(),
        )
        .with_main_keyword(Keyword::new("ρήξη μηνίσκου").unwrap())
        .with_main_keyword(Keyword::new("μηνίσκος").unwrap())
        .with_secondary_keyword(Keyword::new("αρθροσκόπηση").unwrap())
        .with_negative_keyword(Keyword::new("θαύμα").unwrap());

        assert_eq!(brief.primary_keyword().unwrap().as_str(), "ρήξη μηνίσκου");
        assert_eq!(brief.secondary_keywords.len(), 1);
        assert_eq!(brief.negative_keywords.len(), 1);
    }

    #[test]
    fn test_brief_deserializes_with_defaults() {
        let brief: ArticleBrief =
            serde_json::from_str(r#"{ "topic": "Αρθροσκόπηση", "target_word_count": 1200 }"#)
                .unwrap();
        assert!(brief.primary_keyword().is_none());
        assert_eq!(brief.target_word_count.as_u32(), 1200);

        let zero = r#"{ "topic": "x", "target_word_count": 0 }"#;
        assert!(serde_json::from_str::<ArticleBrief>(zero).is_err());
    }
}
