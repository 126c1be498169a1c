//! A generator backed by markdown drafts read from disk.

use std::collections::HashMap;

use async_trait::async_trait;
use gate::{
    Article, ArticleBrief, CollaboratorName, ContentStrategy, GenerationProvider,
    GenerationRequest, ProviderError, ResearchBundle, Topic,
};

/// Serves one pre-written draft per topic, on every attempt.
pub struct DraftGenerator {
    name: CollaboratorName,
    drafts: HashMap<Topic, String>,
}

impl DraftGenerator {
    pub fn new(name: CollaboratorName, drafts: HashMap<Topic, String>) -> Self {
        Self { name, drafts }
    }

    fn draft(&self, brief: &ArticleBrief) -> Result<&str, ProviderError> {
        self.drafts
            .get(&brief.topic)
            .map(String::as_str)
            .ok_or_else(|| ProviderError::Rejected {
                collaborator: self.name.clone(),
                message: format!("no draft for topic {}", brief.topic),
            })
    }
}

#[async_trait]
impl GenerationProvider for DraftGenerator {
    async fn draft_strategy(
        &self,
        brief: &ArticleBrief,
        _research: &ResearchBundle,
    ) -> Result<ContentStrategy, ProviderError> {
        let article = Article::from_markdown(self.draft(brief)?, brief.target_word_count);
        Ok(ContentStrategy {
            title: article
                .title()
                .map(str::to_string)
                .unwrap_or_else(|| brief.topic.to_string()),
            sections: article.section_headings().map(str::to_string).collect(),
        })
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, ProviderError> {
        self.draft(request.brief).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use gate::TargetWordCount;

    use super::*;

    fn generator() -> DraftGenerator {
        let mut drafts = HashMap::new();
        drafts.insert(
            Topic::new("meniscus").unwrap(),
            "# Τίτλος\n\nΕισαγωγή.\n\n## Συμπτώματα\n\nΚείμενο.\n".to_string(),
        );
        DraftGenerator::new(CollaboratorName::new("drafts").unwrap(), drafts)
    }

    fn brief(topic: &str) -> ArticleBrief {
        ArticleBrief::new(
            Topic::new(topic).unwrap(),
            TargetWordCount::new(100).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_strategy_follows_the_draft_headings() {
        let strategy = generator()
            .draft_strategy(&brief("meniscus"), &ResearchBundle::default())
            .await
            .unwrap();

        assert_eq!(strategy.title, "Τίτλος");
        assert_eq!(strategy.sections, vec!["Συμπτώματα".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_topic_is_rejected() {
        let err = generator()
            .draft_strategy(&brief("other"), &ResearchBundle::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Rejected { .. }));
    }
}
