//! Rubric configuration: category ceilings, pass threshold, word-count tiers,
//! point deductions, and the marker phrases the scanners look for.
//!
//! Every field has a default, so a rubric file only needs to name what it
//! changes. Defaults reproduce the editorial rubric of the Greek orthopaedic
//! blog the gate was first written for; the marker lists are plain data and
//! can be replaced wholesale for another language or publication.
//!
//! A [`RubricConfig`] must pass [`RubricConfig::validate`] before use;
//! [`crate::QualityGate::new`] does this.

use serde::{Deserialize, Serialize};

use crate::types::BASIS_POINTS_PER_UNIT;
use crate::WorkflowError;

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

/// The complete, fixed scoring rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RubricConfig {
    pub ceilings: CategoryCeilings,
    /// Minimum total for a pass (inclusive).
    pub pass_threshold: u32,
    pub word_count: WordCountRubric,
    pub penalties: Penalties,
    pub limits: Limits,
    pub markers: MarkerSets,
}

impl Default for RubricConfig {
    fn default() -> Self {
        Self {
            ceilings: CategoryCeilings::default(),
            pass_threshold: 80,
            word_count: WordCountRubric::default(),
            penalties: Penalties::default(),
            limits: Limits::default(),
            markers: MarkerSets::default(),
        }
    }
}

impl RubricConfig {
    /// Parses a rubric from JSON, filling omitted fields with defaults, and
    /// validates it.
    pub fn from_json_str(json: &str) -> Result<Self, WorkflowError> {
        let rubric: Self = serde_json::from_str(json)
            .map_err(|e| WorkflowError::config(format!("invalid rubric JSON: {e}")))?;
        rubric.validate()?;
        Ok(rubric)
    }

    /// Checks the internal consistency of the rubric.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        let max_total = self.ceilings.checked_total().ok_or_else(|| {
            WorkflowError::config(format!("category ceilings overflow: {:?}", self.ceilings))
        })?;
        if max_total == 0 {
            return Err(WorkflowError::config("category ceilings sum to zero"));
        }
        if self.pass_threshold == 0 || self.pass_threshold > max_total {
            return Err(WorkflowError::config(format!(
                "pass threshold {} must be within 1..={max_total}",
                self.pass_threshold
            )));
        }

        let wc = &self.word_count;
        if !(wc.floor_basis_points <= wc.partial_from_basis_points
            && wc.partial_from_basis_points <= wc.full_from_basis_points
            && wc.full_from_basis_points <= BASIS_POINTS_PER_UNIT)
        {
            return Err(WorkflowError::config(format!(
                "word-count tiers must satisfy floor ({}) <= partial ({}) <= full ({}) <= {BASIS_POINTS_PER_UNIT}",
                wc.floor_basis_points, wc.partial_from_basis_points, wc.full_from_basis_points
            )));
        }
        if wc.floor_basis_points == 0 {
            return Err(WorkflowError::config("word-count floor must be positive"));
        }
        if !(wc.minimal_points > 0
            && wc.minimal_points <= wc.partial_points
            && wc.partial_points <= wc.full_points)
        {
            return Err(WorkflowError::config(
                "word-count sub-scores must satisfy 0 < minimal <= partial <= full",
            ));
        }
        if wc.full_points > self.ceilings.seo_technical {
            return Err(WorkflowError::config(format!(
                "word-count full sub-score {} exceeds the SEO/technical ceiling {}",
                wc.full_points, self.ceilings.seo_technical
            )));
        }

        if self.limits.min_sentences_per_paragraph > self.limits.max_sentences_per_paragraph {
            return Err(WorkflowError::config(
                "paragraph sentence limits are inverted",
            ));
        }
        if self.markers.first_person.iter().all(|w| w.trim().is_empty()) {
            return Err(WorkflowError::config("first-person marker list is empty"));
        }
        if let Some(signature) = &self.markers.required_signature {
            if signature.trim().is_empty() {
                return Err(WorkflowError::config("required signature is blank"));
            }
        }
        if self.markers.variability_disclaimers.is_empty() {
            return Err(WorkflowError::config(
                "variability disclaimer list is empty",
            ));
        }
        if self.markers.success_word.trim().is_empty() {
            return Err(WorkflowError::config("success word is empty"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Ceilings
// ---------------------------------------------------------------------------

/// Maximum points per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryCeilings {
    pub voice: u32,
    pub structure: u32,
    pub medical_accuracy: u32,
    pub seo_technical: u32,
}

impl Default for CategoryCeilings {
    fn default() -> Self {
        Self {
            voice: 25,
            structure: 25,
            medical_accuracy: 30,
            seo_technical: 20,
        }
    }
}

impl CategoryCeilings {
    /// Sum of the four ceilings, `None` if it does not fit in a `u32`.
    pub fn checked_total(&self) -> Option<u32> {
        self.voice
            .checked_add(self.structure)?
            .checked_add(self.medical_accuracy)?
            .checked_add(self.seo_technical)
    }

    /// Sum of the four ceilings. Saturates for rubrics that failed
    /// validation.
    pub fn total(&self) -> u32 {
        self.checked_total().unwrap_or(u32::MAX)
    }
}

// ---------------------------------------------------------------------------
// Word count
// ---------------------------------------------------------------------------

/// Word-count tiers, expressed in basis points of the target
/// (`8500` = 85%). The sub-score is part of the SEO/technical category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordCountRubric {
    /// Below this ratio the sub-score is zero and the article fails outright.
    pub floor_basis_points: u32,
    /// From this ratio up, the partial sub-score applies.
    pub partial_from_basis_points: u32,
    /// From this ratio up, the full sub-score applies.
    pub full_from_basis_points: u32,
    pub full_points: u32,
    pub partial_points: u32,
    pub minimal_points: u32,
}

impl Default for WordCountRubric {
    fn default() -> Self {
        Self {
            floor_basis_points: 8_500,
            partial_from_basis_points: 9_000,
            full_from_basis_points: 9_500,
            full_points: 6,
            partial_points: 4,
            minimal_points: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Deductions
// ---------------------------------------------------------------------------

/// Points deducted per finding. `*_cap` fields bound a repeated deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Penalties {
    // Critical
    pub first_person: u32,
    pub personal_anecdote: u32,
    pub missing_disclaimer: u32,

    // Voice
    pub sparse_third_person: u32,
    pub sparse_professional_tone: u32,
    pub credentials_missing: u32,
    pub credentials_overused: u32,
    pub missing_signature: u32,

    // Structure
    pub per_duplicate: u32,
    pub duplicate_cap: u32,
    pub per_flow_inversion: u32,
    pub flow_cap: u32,
    pub per_bad_paragraph: u32,
    pub paragraph_cap: u32,
    pub per_abrupt_transition: u32,
    pub transition_cap: u32,

    // Medical accuracy
    pub missing_success_range: u32,
    pub absolute_claim: u32,
    pub per_contradiction: u32,
    pub contradiction_cap: u32,
    pub unexplained_terms_cap: u32,

    // SEO / technical
    pub keyword_missing_from_title: u32,
    pub keyword_missing_from_intro: u32,
    pub few_sections: u32,
    pub per_missing_markdown_element: u32,
}

impl Default for Penalties {
    fn default() -> Self {
        Self {
            first_person: 10,
            personal_anecdote: 8,
            missing_disclaimer: 8,

            sparse_third_person: 5,
            sparse_professional_tone: 4,
            credentials_missing: 4,
            credentials_overused: 2,
            missing_signature: 3,

            per_duplicate: 2,
            duplicate_cap: 8,
            per_flow_inversion: 2,
            flow_cap: 10,
            per_bad_paragraph: 1,
            paragraph_cap: 4,
            per_abrupt_transition: 1,
            transition_cap: 3,

            missing_success_range: 5,
            absolute_claim: 3,
            per_contradiction: 2,
            contradiction_cap: 8,
            unexplained_terms_cap: 4,

            keyword_missing_from_title: 3,
            keyword_missing_from_intro: 3,
            few_sections: 2,
            per_missing_markdown_element: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Counting thresholds used by the non-critical checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub min_third_person_indicators: usize,
    pub min_professional_indicators: usize,
    pub max_credential_mentions: usize,
    pub min_sections: usize,
    pub min_sentences_per_paragraph: usize,
    pub max_sentences_per_paragraph: usize,
    /// Sentences shorter than this are ignored by duplicate detection.
    pub min_words_for_duplicate: usize,
    /// Fallback title check when the brief has no main keyword.
    pub min_title_chars: usize,
    /// Fallback opening-paragraph check when the brief has no main keyword.
    pub min_intro_chars: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_third_person_indicators: 3,
            min_professional_indicators: 2,
            max_credential_mentions: 2,
            min_sections: 3,
            min_sentences_per_paragraph: 2,
            max_sentences_per_paragraph: 5,
            min_words_for_duplicate: 4,
            min_title_chars: 10,
            min_intro_chars: 50,
        }
    }
}

// ---------------------------------------------------------------------------
// Marker phrases
// ---------------------------------------------------------------------------

/// Phrase lists matched case-insensitively against the article.
///
/// `first_person` entries are matched as whole words, so `"μου"` hits
/// `"Η ομάδα μου,"` but not `"μουσική"`. The other lists are matched as
/// substrings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerSets {
    /// Disallowed grammatical voice. Any hit is critical.
    pub first_person: Vec<String>,
    /// Author sign-off that must appear verbatim. `None` disables the check.
    pub required_signature: Option<String>,
    /// Personal anecdote / emotional story shapes. Any hit is critical.
    pub anecdote: Vec<String>,
    /// At least one must appear, otherwise the disclaimer finding is critical.
    pub variability_disclaimers: Vec<String>,
    pub third_person: Vec<String>,
    pub professional_tone: Vec<String>,
    /// Credentials that should be mentioned once or twice. Empty disables
    /// the check.
    pub credentials: Vec<String>,
    /// Expected order of level-2 sections, matched by substring.
    pub section_flow: Vec<String>,
    /// Pairs of terms that contradict each other when both appear.
    pub contradictions: Vec<(String, String)>,
    /// Technical terms that should be followed by a parenthesised
    /// plain-language explanation on the same line.
    pub explained_terms: Vec<String>,
    /// Word that, directly after a percentage, makes an absolute success
    /// claim (`"80% επιτυχία"`).
    pub success_word: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl Default for MarkerSets {
    fn default() -> Self {
        Self {
            first_person: strings(&[
                "εγώ",
                "μου",
                "μας",
                "εμείς",
                "πιστεύω",
                "νομίζω",
                "συνιστώ",
                "προτείνω",
                "χρησιμοποιώ",
            ]),
            required_signature: None,
            anecdote: strings(&["προσωπικές ιστορίες", "ιστορία ασθενούς", "συναισθήματα"]),
            variability_disclaimers: strings(&[
                "μεταβλητότητα",
                "εξαρτάται",
                "διαφέρει",
                "ποικίλλει",
            ]),
            third_person: strings(&[
                "ο δρ",
                "η θεραπεία",
                "η επέμβαση",
                "το πρόβλημα",
                "εφαρμόζει",
                "χρησιμοποιεί",
                "συνιστά",
                "περιλαμβάνει",
            ]),
            professional_tone: strings(&[
                "ιατρικός",
                "κλινικός",
                "θεραπευτικός",
                "χειρουργικός",
                "επιστημονικός",
                "αποτελεσματικός",
            ]),
            credentials: strings(&["vcu medical center", "leeds hospital"]),
            section_flow: strings(&[
                "ανατομία",
                "συμπτώματα",
                "διάγνωση",
                "θεραπεία",
                "αποκατάσταση",
            ]),
            contradictions: [
                ("αυξάνει", "μειώνει"),
                ("υψηλός", "χαμηλός"),
                ("αποτελεσματικός", "αναποτελεσματικός"),
                ("ασφαλής", "επικίνδυνος"),
                ("συνιστάται", "δεν συνιστάται"),
            ]
            .iter()
            .map(|(a, b)| ((*a).to_string(), (*b).to_string()))
            .collect(),
            explained_terms: strings(&["χόνδρος", "σύνδεσμος", "μηνίσκος", "αρθρίτιδα"]),
            success_word: "επιτυχία".to_string(),
        }
    }
}
