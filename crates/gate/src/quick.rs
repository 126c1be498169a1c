//! A cheap pre-screen that runs before the full rubric.
//!
//! [`QualityGate::quick_check`] looks only at length, headings, first-person
//! voice, the required signature and bold text. Blocking problems are
//! `issues`; the rest are `warnings`. The score is a rough guide and is never
//! used for the publish decision.

use serde::Serialize;
use tracing::debug;

use crate::checks;
use crate::scoring::{MarkdownElement, QualityGate, Violation};
use crate::types::WordCountRatio;
use crate::{Article, WorkflowError};

/// Points removed from the quick score per issue.
pub const QUICK_ISSUE_PENALTY: u32 = 15;
/// Points removed from the quick score per warning.
pub const QUICK_WARNING_PENALTY: u32 = 5;

const QUICK_MAX_SCORE: u32 = 100;

/// Result of [`QualityGate::quick_check`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickCheck {
    pub score: u32,
    pub word_count: u32,
    pub target: u32,
    /// Signed distance from the target in percent (`-10.0` is 10% short).
    pub deviation_percent: f64,
    pub h2_count: usize,
    pub paragraph_count: usize,
    pub issues: Vec<Violation>,
    pub warnings: Vec<Violation>,
}

impl QuickCheck {
    /// `true` when nothing blocking was found.
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }
}

impl QualityGate {
    /// Screens `article` without running the full rubric.
    ///
    /// Returns [`WorkflowError::MalformedInput`] for an article with no
    /// countable words, like [`QualityGate::evaluate`].
    pub fn quick_check(&self, article: &Article) -> Result<QuickCheck, WorkflowError> {
        if article.is_blank() || article.word_count().is_zero() {
            return Err(WorkflowError::MalformedInput {
                reason: "article has no text".to_string(),
            });
        }

        let rubric = self.rubric();
        let markdown = article.markdown();
        let mut issues = Vec::new();
        let mut warnings = Vec::new();

        let ratio = WordCountRatio::new(article.word_count(), article.target_word_count());
        let actual = ratio.actual().as_u32();
        let target = ratio.target().as_u32();
        if !ratio.at_least(rubric.word_count.floor_basis_points) {
            issues.push(Violation::WordCountBelowFloor { actual, target });
        } else if !ratio.at_least(rubric.word_count.full_from_basis_points) {
            warnings.push(Violation::WordCountShort { actual, target });
        }

        if article.title().is_none() {
            issues.push(Violation::MissingMarkdown {
                element: MarkdownElement::Title,
            });
        }

        let h2_count = article.section_headings().count();
        if h2_count < rubric.limits.min_sections {
            warnings.push(Violation::FewSections { found: h2_count });
        }

        let occurrences = self.first_person_hits(markdown);
        if occurrences > 0 {
            issues.push(Violation::FirstPersonVoice { occurrences });
        }

        if let Some(signature) = self.missing_signature(markdown) {
            issues.push(Violation::MissingSignature { signature });
        }

        if !checks::has_bold(markdown) {
            warnings.push(Violation::MissingMarkdown {
                element: MarkdownElement::Bold,
            });
        }

        let penalty = (issues.len() as u32)
            .saturating_mul(QUICK_ISSUE_PENALTY)
            .saturating_add((warnings.len() as u32).saturating_mul(QUICK_WARNING_PENALTY));
        let check = QuickCheck {
            score: QUICK_MAX_SCORE.saturating_sub(penalty),
            word_count: actual,
            target,
            deviation_percent: ratio.deviation_percent(),
            h2_count,
            paragraph_count: markdown.split("\n\n").filter(|b| !b.trim().is_empty()).count(),
            issues,
            warnings,
        };
        debug!(
            score = check.score,
            issues = check.issues.len(),
            warnings = check.warnings.len(),
            "Quick check finished"
        );
        Ok(check)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ArticleFixture;
    use crate::{RubricConfig, TargetWordCount};

    const SIGNATURE: &str = "Δρ. Γεώργιος Χλωρός";

    fn target(words: u32) -> TargetWordCount {
        TargetWordCount::new(words).unwrap()
    }

    fn gate() -> QualityGate {
        QualityGate::new(RubricConfig::default()).unwrap()
    }

    #[test]
    fn test_clean_article_passes_with_full_score() {
        let article = ArticleFixture::new(target(1500)).with_keyword().build();
        let check = gate().quick_check(&article).unwrap();

        assert!(check.passed());
        assert!(check.warnings.is_empty(), "{:?}", check.warnings);
        assert_eq!(check.score, 100);
        assert_eq!(check.word_count, 1500);
        assert_eq!(check.deviation_percent, 0.0);
        assert!(check.h2_count >= 3);
    }

    #[test]
    fn test_issues_and_warnings_are_scored_separately() {
        let article = ArticleFixture::new(target(1500))
            .with_first_person()
            .with_word_count(1300)
            .build();
        let check = gate().quick_check(&article).unwrap();

        assert!(!check.passed());
        assert_eq!(
            check.issues.iter().map(Violation::tag).collect::<Vec<_>>(),
            vec!["first_person_voice"]
        );
        assert_eq!(
            check.warnings.iter().map(Violation::tag).collect::<Vec<_>>(),
            vec!["word_count_short"]
        );
        assert_eq!(check.score, 100 - QUICK_ISSUE_PENALTY - QUICK_WARNING_PENALTY);
        assert!(check.deviation_percent < -10.0 && check.deviation_percent > -15.0);
    }

    #[test]
    fn test_far_too_short_article_is_an_issue() {
        let article = ArticleFixture::new(target(1500)).with_word_count(1000).build();
        let check = gate().quick_check(&article).unwrap();

        assert!(check
            .issues
            .iter()
            .any(|v| v.tag() == "word_count_below_floor"));
    }

    #[test]
    fn test_missing_title_and_bold_are_reported() {
        let article = Article::from_markdown(
            "Κείμενο χωρίς τίτλο. Δεύτερη πρόταση εδώ.\n\n## Ενότητα\n\nΤρίτη πρόταση.",
            target(10),
        );
        let check = gate().quick_check(&article).unwrap();

        assert!(check.issues.contains(&Violation::MissingMarkdown {
            element: MarkdownElement::Title
        }));
        assert!(check.warnings.contains(&Violation::MissingMarkdown {
            element: MarkdownElement::Bold
        }));
        assert!(check.warnings.contains(&Violation::FewSections { found: 1 }));
        assert_eq!(check.paragraph_count, 3);
    }

    #[test]
    fn test_required_signature_is_checked_when_configured() {
        let mut rubric = RubricConfig::default();
        rubric.markers.required_signature = Some(SIGNATURE.to_string());
        let gate = QualityGate::new(rubric).unwrap();

        let unsigned = ArticleFixture::new(target(1500)).with_keyword().build();
        let check = gate.quick_check(&unsigned).unwrap();
        assert_eq!(
            check.issues,
            vec![Violation::MissingSignature {
                signature: SIGNATURE.to_string()
            }]
        );

        let signed = Article::from_markdown(
            format!("{}\n**{SIGNATURE}**\n", unsigned.markdown()),
            target(1500),
        );
        assert!(gate.quick_check(&signed).unwrap().passed());
    }

    #[test]
    fn test_blank_article_is_malformed() {
        let err = gate()
            .quick_check(&Article::from_markdown(" ", target(10)))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::MalformedInput { .. }));
    }
}
