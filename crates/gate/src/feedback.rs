//! Feedback handed to the generator when an attempt fails the gate.

use serde::Serialize;

use crate::scoring::{Category, ScoreReport, WordCountTier};

/// Categories scoring below this share of their ceiling get an instruction.
pub const WEAK_CATEGORY_PERCENT: u32 = 80;

/// Corrective guidance derived from one [`ScoreReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    /// The attempt the report belongs to.
    pub attempt: u32,
    pub total: u32,
    pub max_total: u32,
    pub threshold: u32,
    /// One line per violation, critical ones first.
    pub issues: Vec<String>,
    /// Category and word-count instructions for the next attempt.
    pub instructions: Vec<String>,
}

impl Feedback {
    pub fn from_report(report: &ScoreReport, attempt: u32) -> Self {
        let mut findings: Vec<_> = report.findings().iter().collect();
        findings.sort_by_key(|f| f.severity);
        let issues = findings
            .iter()
            .map(|f| {
                let marker = if f.is_critical() { "CRITICAL" } else { "minor" };
                format!("[{marker}] {}: {}", f.category, f.violation)
            })
            .collect();

        let mut instructions: Vec<String> = report
            .weak_categories(WEAK_CATEGORY_PERCENT)
            .map(|score| {
                format!(
                    "{} ({}/{}): {}",
                    score.category,
                    score.points,
                    score.ceiling,
                    instruction_for(score.category)
                )
            })
            .collect();

        let wc = report.word_count();
        if wc.tier != WordCountTier::Full {
            instructions.push(format!(
                "Expand the article by about {} words to reach the {}-word target (currently {}).",
                wc.shortfall(),
                wc.target,
                wc.actual
            ));
        }

        Self {
            attempt,
            total: report.total(),
            max_total: report.scores().iter().map(|s| s.ceiling).sum(),
            threshold: report.threshold(),
            issues,
            instructions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty() && self.instructions.is_empty()
    }

    /// Renders the feedback as plain text for a generation prompt.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Attempt {} scored {}/{} (needs {}).\n",
            self.attempt,
            self.total,
            self.max_total,
            self.threshold
        );
        if !self.issues.is_empty() {
            out.push_str("\nIssues:\n");
            for issue in &self.issues {
                out.push_str("- ");
                out.push_str(issue);
                out.push('\n');
            }
        }
        if !self.instructions.is_empty() {
            out.push_str("\nFor the next version:\n");
            for instruction in &self.instructions {
                out.push_str("- ");
                out.push_str(instruction);
                out.push('\n');
            }
        }
        out
    }
}

fn instruction_for(category: Category) -> &'static str {
    match category {
        Category::Voice => {
            "write strictly in the third person, refer to the doctor by title, and keep a clinical, professional tone"
        }
        Category::Structure => {
            "follow the expected section order, keep paragraphs to 2-5 sentences, remove repeated passages and personal stories"
        }
        Category::MedicalAccuracy => {
            "state success rates as ranges, note that outcomes vary between patients, and explain technical terms in parentheses"
        }
        Category::SeoTechnical => {
            "put the main keyword in the title and first paragraph, use at least three H2 sections, bold text, and a list"
        }
    }
}
