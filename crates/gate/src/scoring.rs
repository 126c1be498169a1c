//! The rubric scoring engine.
//!
//! [`QualityGate::evaluate`] turns an [`Article`] into a [`ScoreReport`]. The
//! engine is pure: the same article and rubric always produce the same
//! report, and a report carries no timestamps.
//!
//! Every category starts at its ceiling and each [`Finding`] deducts from it.
//! Categories are clamped to `[0, ceiling]`, so the `deducted` value of a
//! finding is nominal when a category bottoms out.

use std::collections::BTreeSet;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::checks::{self, TextView};
use crate::rubric::RubricConfig;
use crate::types::{Severity, WordCountRatio};
use crate::{Article, WorkflowError};

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// One of the four scored rubric categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Voice,
    Structure,
    MedicalAccuracy,
    SeoTechnical,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Self::Voice,
        Self::Structure,
        Self::MedicalAccuracy,
        Self::SeoTechnical,
    ];

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Voice => "Voice",
            Self::Structure => "Structure",
            Self::MedicalAccuracy => "Medical Accuracy",
            Self::SeoTechnical => "SEO/Technical",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Points awarded in one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryScore {
    pub category: Category,
    pub points: u32,
    pub ceiling: u32,
}

impl CategoryScore {
    /// Returns `true` if the category scored below `percent` of its ceiling.
    pub fn below_percent(&self, percent: u32) -> bool {
        u64::from(self.points) * 100 < u64::from(self.ceiling) * u64::from(percent)
    }
}

/// The four category scores of one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryScores {
    pub voice: CategoryScore,
    pub structure: CategoryScore,
    pub medical_accuracy: CategoryScore,
    pub seo_technical: CategoryScore,
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> &CategoryScore {
        match category {
            Category::Voice => &self.voice,
            Category::Structure => &self.structure,
            Category::MedicalAccuracy => &self.medical_accuracy,
            Category::SeoTechnical => &self.seo_technical,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryScore> {
        Category::ALL.into_iter().map(|c| self.get(c))
    }

    /// Sum of the four category scores.
    pub fn total(&self) -> u32 {
        self.iter().map(|s| s.points).sum()
    }
}

// ---------------------------------------------------------------------------
// Word count
// ---------------------------------------------------------------------------

/// Which word-count band an article fell into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WordCountTier {
    Full,
    Partial,
    Minimal,
    BelowFloor,
}

/// Word-count facts recorded on every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WordCountAssessment {
    pub actual: u32,
    pub target: u32,
    pub tier: WordCountTier,
    /// Points awarded inside SEO/Technical.
    pub sub_score: u32,
    #[serde(skip)]
    ratio: WordCountRatio,
}

impl WordCountAssessment {
    pub fn ratio(&self) -> WordCountRatio {
        self.ratio
    }

    /// Words missing to reach the target.
    pub fn shortfall(&self) -> u32 {
        self.ratio.shortfall()
    }
}

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// Markdown elements every article is expected to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkdownElement {
    Title,
    Subheading,
    Bold,
    List,
}

/// A rubric rule the article broke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    EmptyArticle,
    WordCountBelowFloor { actual: u32, target: u32 },
    WordCountShort { actual: u32, target: u32 },
    FirstPersonVoice { occurrences: usize },
    PersonalAnecdote { occurrences: usize },
    MissingVariabilityDisclaimer,
    RepeatedContent { count: u32 },
    SparseThirdPerson { found: usize },
    SparseProfessionalTone { found: usize },
    CredentialsMissing,
    CredentialsOverused { mentions: usize },
    MissingSignature { signature: String },
    SectionFlowOutOfOrder { inversions: u32 },
    ParagraphLength { paragraphs: u32 },
    AbruptTransitions { headings: u32 },
    MissingSuccessRange,
    AbsoluteSuccessClaim { occurrences: usize },
    ContradictoryClaims { pairs: u32 },
    UnexplainedTerms { explained: usize, mentioned: usize },
    KeywordMissingFromTitle { keyword: String },
    KeywordMissingFromIntro { keyword: String },
    ShortTitle,
    ShortIntro,
    FewSections { found: usize },
    MissingMarkdown { element: MarkdownElement },
}

impl Violation {
    pub fn category(&self) -> Category {
        match self {
            Self::FirstPersonVoice { .. }
            | Self::SparseThirdPerson { .. }
            | Self::SparseProfessionalTone { .. }
            | Self::CredentialsMissing
            | Self::CredentialsOverused { .. }
            | Self::MissingSignature { .. } => Category::Voice,
            Self::PersonalAnecdote { .. }
            | Self::RepeatedContent { .. }
            | Self::SectionFlowOutOfOrder { .. }
            | Self::ParagraphLength { .. }
            | Self::AbruptTransitions { .. } => Category::Structure,
            Self::MissingVariabilityDisclaimer
            | Self::MissingSuccessRange
            | Self::AbsoluteSuccessClaim { .. }
            | Self::ContradictoryClaims { .. }
            | Self::UnexplainedTerms { .. } => Category::MedicalAccuracy,
            Self::EmptyArticle
            | Self::WordCountBelowFloor { .. }
            | Self::WordCountShort { .. }
            | Self::KeywordMissingFromTitle { .. }
            | Self::KeywordMissingFromIntro { .. }
            | Self::ShortTitle
            | Self::ShortIntro
            | Self::FewSections { .. }
            | Self::MissingMarkdown { .. } => Category::SeoTechnical,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::EmptyArticle
            | Self::WordCountBelowFloor { .. }
            | Self::FirstPersonVoice { .. }
            | Self::PersonalAnecdote { .. }
            | Self::MissingVariabilityDisclaimer => Severity::Critical,
            _ => Severity::Minor,
        }
    }

    /// Stable snake_case tag, identical to the serialized `kind`.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::EmptyArticle => "empty_article",
            Self::WordCountBelowFloor { .. } => "word_count_below_floor",
            Self::WordCountShort { .. } => "word_count_short",
            Self::FirstPersonVoice { .. } => "first_person_voice",
            Self::PersonalAnecdote { .. } => "personal_anecdote",
            Self::MissingVariabilityDisclaimer => "missing_variability_disclaimer",
            Self::RepeatedContent { .. } => "repeated_content",
            Self::SparseThirdPerson { .. } => "sparse_third_person",
            Self::SparseProfessionalTone { .. } => "sparse_professional_tone",
            Self::CredentialsMissing => "credentials_missing",
            Self::CredentialsOverused { .. } => "credentials_overused",
            Self::MissingSignature { .. } => "missing_signature",
            Self::SectionFlowOutOfOrder { .. } => "section_flow_out_of_order",
            Self::ParagraphLength { .. } => "paragraph_length",
            Self::AbruptTransitions { .. } => "abrupt_transitions",
            Self::MissingSuccessRange => "missing_success_range",
            Self::AbsoluteSuccessClaim { .. } => "absolute_success_claim",
            Self::ContradictoryClaims { .. } => "contradictory_claims",
            Self::UnexplainedTerms { .. } => "unexplained_terms",
            Self::KeywordMissingFromTitle { .. } => "keyword_missing_from_title",
            Self::KeywordMissingFromIntro { .. } => "keyword_missing_from_intro",
            Self::ShortTitle => "short_title",
            Self::ShortIntro => "short_intro",
            Self::FewSections { .. } => "few_sections",
            Self::MissingMarkdown { .. } => "missing_markdown",
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyArticle => write!(f, "the article is empty"),
            Self::WordCountBelowFloor { actual, target } => write!(
                f,
                "word count {actual} is below the minimum for a target of {target}"
            ),
            Self::WordCountShort { actual, target } => {
                write!(f, "word count {actual} is short of the {target} target")
            }
            Self::FirstPersonVoice { occurrences } => {
                write!(f, "first-person voice used ({occurrences} occurrence(s))")
            }
            Self::PersonalAnecdote { occurrences } => write!(
                f,
                "personal anecdotes or emotional stories ({occurrences} occurrence(s))"
            ),
            Self::MissingVariabilityDisclaimer => {
                write!(f, "no disclaimer that outcomes vary between patients")
            }
            Self::RepeatedContent { count } => {
                write!(f, "{count} repeated sentence(s) or paragraph(s)")
            }
            Self::SparseThirdPerson { found } => {
                write!(f, "too few third-person references ({found})")
            }
            Self::SparseProfessionalTone { found } => {
                write!(f, "too few professional-tone terms ({found})")
            }
            Self::CredentialsMissing => write!(f, "credentials are never mentioned"),
            Self::CredentialsOverused { mentions } => {
                write!(f, "credentials mentioned {mentions} times")
            }
            Self::MissingSignature { signature } => {
                write!(f, "required signature \"{signature}\" is missing")
            }
            Self::SectionFlowOutOfOrder { inversions } => {
                write!(f, "sections out of the expected order ({inversions})")
            }
            Self::ParagraphLength { paragraphs } => {
                write!(f, "{paragraphs} paragraph(s) too short or too long")
            }
            Self::AbruptTransitions { headings } => {
                write!(f, "{headings} heading(s) not followed by a blank line")
            }
            Self::MissingSuccessRange => write!(f, "no success-rate range such as 75-85%"),
            Self::AbsoluteSuccessClaim { occurrences } => {
                write!(f, "absolute success claims ({occurrences})")
            }
            Self::ContradictoryClaims { pairs } => {
                write!(f, "{pairs} pair(s) of contradictory terms")
            }
            Self::UnexplainedTerms {
                explained,
                mentioned,
            } => write!(
                f,
                "only {explained} of {mentioned} technical terms are explained"
            ),
            Self::KeywordMissingFromTitle { keyword } => {
                write!(f, "main keyword \"{keyword}\" missing from the title")
            }
            Self::KeywordMissingFromIntro { keyword } => {
                write!(f, "main keyword \"{keyword}\" missing from the first paragraph")
            }
            Self::ShortTitle => write!(f, "title missing or too short"),
            Self::ShortIntro => write!(f, "first paragraph missing or too short"),
            Self::FewSections { found } => write!(f, "only {found} main section(s)"),
            Self::MissingMarkdown { element } => {
                let name = match element {
                    MarkdownElement::Title => "an H1 title",
                    MarkdownElement::Subheading => "H2 sub-headings",
                    MarkdownElement::Bold => "bold text",
                    MarkdownElement::List => "a list",
                };
                write!(f, "no {name}")
            }
        }
    }
}

/// A violation together with the points it cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    #[serde(flatten)]
    pub violation: Violation,
    pub category: Category,
    pub severity: Severity,
    pub deducted: u32,
}

impl Finding {
    fn new(violation: Violation, deducted: u32) -> Self {
        Self {
            category: violation.category(),
            severity: violation.severity(),
            violation,
            deducted,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// The outcome of scoring one article. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    scores: CategoryScores,
    total: u32,
    threshold: u32,
    passed: bool,
    word_count: WordCountAssessment,
    findings: Vec<Finding>,
}

impl ScoreReport {
    fn from_findings(
        rubric: &RubricConfig,
        word_count: WordCountAssessment,
        findings: Vec<Finding>,
    ) -> Self {
        let score = |category: Category, ceiling: u32| {
            let deducted: u32 = findings
                .iter()
                .filter(|f| f.category == category)
                .map(|f| f.deducted)
                .fold(0, u32::saturating_add);
            CategoryScore {
                category,
                points: ceiling.saturating_sub(deducted),
                ceiling,
            }
        };
        let c = &rubric.ceilings;
        let scores = CategoryScores {
            voice: score(Category::Voice, c.voice),
            structure: score(Category::Structure, c.structure),
            medical_accuracy: score(Category::MedicalAccuracy, c.medical_accuracy),
            seo_technical: score(Category::SeoTechnical, c.seo_technical),
        };
        let total = scores.total();
        let passed = total >= rubric.pass_threshold && !findings.iter().any(Finding::is_critical);

        Self {
            scores,
            total,
            threshold: rubric.pass_threshold,
            passed,
            word_count,
            findings,
        }
    }

    /// Builds the zero-score report recorded for an empty article.
    pub fn malformed(article: &Article, rubric: &RubricConfig) -> Self {
        let ratio = WordCountRatio::new(article.word_count(), article.target_word_count());
        let word_count = WordCountAssessment {
            actual: ratio.actual().as_u32(),
            target: ratio.target().as_u32(),
            tier: WordCountTier::BelowFloor,
            sub_score: 0,
            ratio,
        };
        let findings = vec![Finding::new(Violation::EmptyArticle, rubric.ceilings.total())];
        let zero = |category, ceiling| CategoryScore {
            category,
            points: 0,
            ceiling,
        };
        let c = &rubric.ceilings;
        Self {
            scores: CategoryScores {
                voice: zero(Category::Voice, c.voice),
                structure: zero(Category::Structure, c.structure),
                medical_accuracy: zero(Category::MedicalAccuracy, c.medical_accuracy),
                seo_technical: zero(Category::SeoTechnical, c.seo_technical),
            },
            total: 0,
            threshold: rubric.pass_threshold,
            passed: false,
            word_count,
            findings,
        }
    }

    pub fn scores(&self) -> &CategoryScores {
        &self.scores
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn word_count(&self) -> &WordCountAssessment {
        &self.word_count
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn critical_findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_critical())
    }

    pub fn has_critical(&self) -> bool {
        self.critical_findings().next().is_some()
    }

    /// Distinct violation tags, sorted.
    pub fn violation_tags(&self) -> BTreeSet<&'static str> {
        self.findings.iter().map(|f| f.violation.tag()).collect()
    }

    /// Returns the categories scoring below `percent` of their ceiling.
    pub fn weak_categories(&self, percent: u32) -> impl Iterator<Item = &CategoryScore> {
        self.scores.iter().filter(move |s| s.below_percent(percent))
    }

    /// Turns a failed report into [`WorkflowError::QualityGateFail`].
    pub fn into_decision(self) -> Result<ScoreReport, WorkflowError> {
        if self.passed {
            Ok(self)
        } else {
            Err(WorkflowError::QualityGateFail {
                report: Box::new(self),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Scores articles against a validated rubric.
#[derive(Debug, Clone)]
pub struct QualityGate {
    rubric: RubricConfig,
    absolute_claim: Regex,
    first_person: Regex,
}

impl QualityGate {
    /// Validates `rubric` and prepares the scanners.
    pub fn new(rubric: RubricConfig) -> Result<Self, WorkflowError> {
        rubric.validate()?;
        let pattern = format!(
            r"\d{{1,3}}\s*%\s*{}",
            regex::escape(&rubric.markers.success_word.trim().to_lowercase())
        );
        let absolute_claim = Regex::new(&pattern)
            .map_err(|e| WorkflowError::config(format!("invalid success word: {e}")))?;
        let first_person = checks::whole_words(&rubric.markers.first_person)
            .map_err(|e| WorkflowError::config(format!("invalid first-person marker: {e}")))?
            .ok_or_else(|| WorkflowError::config("first-person marker list is empty"))?;
        Ok(Self {
            rubric,
            absolute_claim,
            first_person,
        })
    }

    pub fn rubric(&self) -> &RubricConfig {
        &self.rubric
    }

    /// Scores `article`.
    ///
    /// Returns [`WorkflowError::MalformedInput`] if the article has no
    /// countable words; [`ScoreReport::malformed`] builds the matching zero
    /// report.
    pub fn evaluate(&self, article: &Article) -> Result<ScoreReport, WorkflowError> {
        if article.is_blank() || article.word_count().is_zero() {
            return Err(WorkflowError::MalformedInput {
                reason: "article has no text".to_string(),
            });
        }

        let view = TextView::new(article.markdown());
        let mut findings = Vec::new();
        let word_count = self.assess_word_count(article, &mut findings);
        self.score_voice(&view, &mut findings);
        self.score_structure(article, &view, &mut findings);
        self.score_medical(&view, &mut findings);
        self.score_seo(article, &view, &mut findings);

        let report = ScoreReport::from_findings(&self.rubric, word_count, findings);
        debug!(
            attempt = article.attempt(),
            total = report.total(),
            passed = report.passed(),
            findings = report.findings().len(),
            "Article scored"
        );
        Ok(report)
    }

    fn assess_word_count(&self, article: &Article, findings: &mut Vec<Finding>) -> WordCountAssessment {
        let wc = &self.rubric.word_count;
        let ratio = WordCountRatio::new(article.word_count(), article.target_word_count());
        let actual = ratio.actual().as_u32();
        let target = ratio.target().as_u32();

        let (tier, sub_score) = if ratio.at_least(wc.full_from_basis_points) {
            (WordCountTier::Full, wc.full_points)
        } else if ratio.at_least(wc.partial_from_basis_points) {
            (WordCountTier::Partial, wc.partial_points)
        } else if ratio.at_least(wc.floor_basis_points) {
            (WordCountTier::Minimal, wc.minimal_points)
        } else {
            (WordCountTier::BelowFloor, 0)
        };

        let lost = wc.full_points - sub_score;
        match tier {
            WordCountTier::Full => {}
            WordCountTier::BelowFloor => {
                findings.push(Finding::new(Violation::WordCountBelowFloor { actual, target }, lost));
            }
            WordCountTier::Partial | WordCountTier::Minimal => {
                findings.push(Finding::new(Violation::WordCountShort { actual, target }, lost));
            }
        }

        WordCountAssessment {
            actual,
            target,
            tier,
            sub_score,
            ratio,
        }
    }

    /// First-person markers found as whole words.
    pub(crate) fn first_person_hits(&self, text: &str) -> usize {
        self.first_person.find_iter(text).count()
    }

    /// The configured signature, if the article lacks it.
    pub(crate) fn missing_signature(&self, text: &str) -> Option<String> {
        let signature = self.rubric.markers.required_signature.as_deref()?.trim();
        (!text.contains(signature)).then(|| signature.to_string())
    }

    fn score_voice(&self, view: &TextView<'_>, findings: &mut Vec<Finding>) {
        let p = &self.rubric.penalties;
        let m = &self.rubric.markers;
        let limits = &self.rubric.limits;

        let first_person = self.first_person_hits(view.raw);
        if first_person > 0 {
            findings.push(Finding::new(
                Violation::FirstPersonVoice {
                    occurrences: first_person,
                },
                p.first_person,
            ));
        }

        let third_person = checks::count_occurrences(&view.lower, &m.third_person);
        if third_person < limits.min_third_person_indicators {
            findings.push(Finding::new(
                Violation::SparseThirdPerson {
                    found: third_person,
                },
                p.sparse_third_person,
            ));
        }

        let professional = checks::count_occurrences(&view.lower, &m.professional_tone);
        if professional < limits.min_professional_indicators {
            findings.push(Finding::new(
                Violation::SparseProfessionalTone {
                    found: professional,
                },
                p.sparse_professional_tone,
            ));
        }

        if let Some(signature) = self.missing_signature(view.raw) {
            findings.push(Finding::new(
                Violation::MissingSignature { signature },
                p.missing_signature,
            ));
        }

        if !m.credentials.is_empty() {
            let mentions = checks::count_occurrences(&view.lower, &m.credentials);
            if mentions == 0 {
                findings.push(Finding::new(Violation::CredentialsMissing, p.credentials_missing));
            } else if mentions > limits.max_credential_mentions {
                findings.push(Finding::new(
                    Violation::CredentialsOverused { mentions },
                    p.credentials_overused,
                ));
            }
        }
    }

    fn score_structure(&self, article: &Article, view: &TextView<'_>, findings: &mut Vec<Finding>) {
        let p = &self.rubric.penalties;
        let m = &self.rubric.markers;
        let limits = &self.rubric.limits;

        let anecdotes = checks::count_occurrences(&view.lower, &m.anecdote);
        if anecdotes > 0 {
            findings.push(Finding::new(
                Violation::PersonalAnecdote {
                    occurrences: anecdotes,
                },
                p.personal_anecdote,
            ));
        }

        let duplicates = checks::duplicate_count(&view.paragraphs, limits.min_words_for_duplicate);
        if duplicates > 0 {
            findings.push(Finding::new(
                Violation::RepeatedContent { count: duplicates },
                capped(duplicates, p.per_duplicate, p.duplicate_cap),
            ));
        }

        let inversions = checks::flow_inversions(article.section_headings(), &m.section_flow);
        if inversions > 0 {
            findings.push(Finding::new(
                Violation::SectionFlowOutOfOrder { inversions },
                capped(inversions, p.per_flow_inversion, p.flow_cap),
            ));
        }

        let bad_paragraphs = checks::paragraph_length_violations(
            &view.paragraphs,
            limits.min_sentences_per_paragraph,
            limits.max_sentences_per_paragraph,
        );
        if bad_paragraphs > 0 {
            findings.push(Finding::new(
                Violation::ParagraphLength {
                    paragraphs: bad_paragraphs,
                },
                capped(bad_paragraphs, p.per_bad_paragraph, p.paragraph_cap),
            ));
        }

        let abrupt = checks::abrupt_transitions(view.raw);
        if abrupt > 0 {
            findings.push(Finding::new(
                Violation::AbruptTransitions { headings: abrupt },
                capped(abrupt, p.per_abrupt_transition, p.transition_cap),
            ));
        }
    }

    fn score_medical(&self, view: &TextView<'_>, findings: &mut Vec<Finding>) {
        let p = &self.rubric.penalties;
        let m = &self.rubric.markers;

        if !checks::contains_any(&view.lower, &m.variability_disclaimers) {
            findings.push(Finding::new(
                Violation::MissingVariabilityDisclaimer,
                p.missing_disclaimer,
            ));
        }

        if checks::success_ranges(view.raw) == 0 {
            findings.push(Finding::new(Violation::MissingSuccessRange, p.missing_success_range));
        }

        let absolute = self.absolute_claim.find_iter(&view.lower).count();
        if absolute > 0 {
            findings.push(Finding::new(
                Violation::AbsoluteSuccessClaim {
                    occurrences: absolute,
                },
                p.absolute_claim,
            ));
        }

        let pairs = checks::contradiction_pairs(&view.lower, &m.contradictions);
        if pairs > 0 {
            findings.push(Finding::new(
                Violation::ContradictoryClaims { pairs },
                capped(pairs, p.per_contradiction, p.contradiction_cap),
            ));
        }

        let (explained, mentioned) = checks::explained_terms(&view.lower, &m.explained_terms);
        if mentioned > 0 && explained * 2 < mentioned {
            // Scales from the full cap (nothing explained) down to zero (half explained).
            let cap = u64::from(p.unexplained_terms_cap);
            let missing = (mentioned - explained * 2) as u64;
            let deducted = u32::try_from(cap * missing / mentioned as u64).unwrap_or(u32::MAX);
            if deducted > 0 {
                findings.push(Finding::new(
                    Violation::UnexplainedTerms {
                        explained,
                        mentioned,
                    },
                    deducted,
                ));
            }
        }
    }

    fn score_seo(&self, article: &Article, view: &TextView<'_>, findings: &mut Vec<Finding>) {
        let p = &self.rubric.penalties;
        let limits = &self.rubric.limits;
        let title = article.title().unwrap_or_default();
        let intro = view.paragraphs.first().map(String::as_str).unwrap_or_default();

        match article.main_keyword() {
            Some(keyword) => {
                let needle = keyword.as_str().to_lowercase();
                if !title.to_lowercase().contains(&needle) {
                    findings.push(Finding::new(
                        Violation::KeywordMissingFromTitle {
                            keyword: keyword.to_string(),
                        },
                        p.keyword_missing_from_title,
                    ));
                }
                if !intro.to_lowercase().contains(&needle) {
                    findings.push(Finding::new(
                        Violation::KeywordMissingFromIntro {
                            keyword: keyword.to_string(),
                        },
                        p.keyword_missing_from_intro,
                    ));
                }
            }
            None => {
                if title.chars().count() < limits.min_title_chars {
                    findings.push(Finding::new(Violation::ShortTitle, p.keyword_missing_from_title));
                }
                if intro.chars().count() < limits.min_intro_chars {
                    findings.push(Finding::new(Violation::ShortIntro, p.keyword_missing_from_intro));
                }
            }
        }

        let sections = article.section_headings().count();
        if sections < limits.min_sections {
            findings.push(Finding::new(Violation::FewSections { found: sections }, p.few_sections));
        }

        let present = [
            (MarkdownElement::Title, article.title().is_some()),
            (MarkdownElement::Subheading, checks::has_heading_level(view.raw, 2)),
            (MarkdownElement::Bold, checks::has_bold(view.raw)),
            (MarkdownElement::List, checks::has_list(view.raw)),
        ];
        for (element, found) in present {
            if !found {
                findings.push(Finding::new(
                    Violation::MissingMarkdown { element },
                    p.per_missing_markdown_element,
                ));
            }
        }
    }
}

fn capped(count: u32, per: u32, cap: u32) -> u32 {
    count.saturating_mul(per).min(cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Keyword, TargetWordCount};

    fn gate() -> QualityGate {
        QualityGate::new(RubricConfig::default()).unwrap()
    }

    fn article(md: &str, target: u32) -> Article {
        Article::from_markdown(md, TargetWordCount::new(target).unwrap())
    }

    #[test]
    fn test_blank_article_is_malformed() {
        let err = gate().evaluate(&article("  \n", 100)).unwrap_err();
        assert!(matches!(err, WorkflowError::MalformedInput { .. }));

        let markup_only = gate().evaluate(&article("## **", 100)).unwrap_err();
        assert!(matches!(markup_only, WorkflowError::MalformedInput { .. }));
    }

    #[test]
    fn test_malformed_report_is_zero_and_critical() {
        let rubric = RubricConfig::default();
        let report = ScoreReport::malformed(&article("", 100), &rubric);
        assert_eq!(report.total(), 0);
        assert!(!report.passed());
        assert!(report.has_critical());
        assert_eq!(report.scores().iter().map(|s| s.points).sum::<u32>(), 0);
        assert!(report.violation_tags().contains("empty_article"));
    }

    #[test]
    fn test_short_text_collects_many_findings_and_stays_in_range() {
        let report = gate().evaluate(&article("μία λέξη", 2000)).unwrap();
        assert!(!report.passed());
        assert_eq!(report.total(), report.scores().total());
        for score in report.scores().iter() {
            assert!(score.points <= score.ceiling);
        }
        let tags = report.violation_tags();
        assert!(tags.contains("word_count_below_floor"));
        assert!(tags.contains("missing_variability_disclaimer"));
        assert!(tags.contains("short_title"));
    }

    #[test]
    fn test_keyword_checks_replace_length_fallbacks() {
        let md = "# Ρήξη μηνίσκου στο γόνατο\n\nΗ ρήξη μηνίσκου είναι συχνή.";
        let keyword = Keyword::new("ρήξη μηνίσκου");
        let report = gate()
            .evaluate(&article(md, 10).with_main_keyword(keyword))
            .unwrap();
        let tags = report.violation_tags();
        assert!(!tags.contains("keyword_missing_from_title"));
        assert!(!tags.contains("keyword_missing_from_intro"));
        assert!(!tags.contains("short_intro"));

        let other = Keyword::new("χόνδρος");
        let report = gate().evaluate(&article(md, 10).with_main_keyword(other)).unwrap();
        let tags = report.violation_tags();
        assert!(tags.contains("keyword_missing_from_title"));
        assert!(tags.contains("keyword_missing_from_intro"));
    }

    #[test]
    fn test_absolute_claim_detected() {
        let md = "Η θεραπεία έχει 90% επιτυχία.";
        let report = gate().evaluate(&article(md, 5)).unwrap();
        assert!(report.violation_tags().contains("absolute_success_claim"));
    }

    #[test]
    fn test_unexplained_terms_scale() {
        let md = "Ο χόνδρος και ο μηνίσκος.";
        let report = gate().evaluate(&article(md, 5)).unwrap();
        let finding = report
            .findings()
            .iter()
            .find(|f| f.violation.tag() == "unexplained_terms")
            .unwrap();
        assert_eq!(finding.deducted, 4);

        // Half explained: no deduction.
        let md = "Ο χόνδρος (επικάλυψη των οστών) και ο μηνίσκος.";
        let report = gate().evaluate(&article(md, 5)).unwrap();
        assert!(!report.violation_tags().contains("unexplained_terms"));
    }

    #[test]
    fn test_into_decision() {
        let report = gate().evaluate(&article("λέξη", 1)).unwrap();
        assert!(!report.passed());
        match report.into_decision() {
            Err(WorkflowError::QualityGateFail { report }) => assert!(!report.passed()),
            other => panic!("expected QualityGateFail, got {other:?}"),
        }
    }

    #[test]
    fn test_capped_deduction() {
        assert_eq!(capped(3, 2, 8), 6);
        assert_eq!(capped(10, 2, 8), 8);
    }

    #[test]
    fn test_report_serializes_violation_kind() {
        let report = gate().evaluate(&article("λέξη", 1)).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        let kinds: Vec<&str> = json["findings"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["kind"].as_str().unwrap())
            .collect();
        assert!(kinds.contains(&"missing_variability_disclaimer"));
        assert_eq!(json["total"], report.total());
    }
}
