//! Per-attempt records and the retry-trend analysis attached to human-review
//! hand-offs.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::scoring::ScoreReport;
use crate::types::{Timestamp, Trend};

/// What one scored generation attempt produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    pub attempt: u32,
    pub total: u32,
    pub passed: bool,
    pub violations: Vec<&'static str>,
    pub critical: Vec<&'static str>,
    pub word_count: u32,
    pub recorded_at: Timestamp,
}

impl AttemptRecord {
    pub fn from_report(attempt: u32, report: &ScoreReport) -> Self {
        Self {
            attempt,
            total: report.total(),
            passed: report.passed(),
            violations: report.violation_tags().into_iter().collect(),
            critical: report.critical_findings().map(|f| f.violation.tag()).collect(),
            word_count: report.word_count().actual,
            recorded_at: Timestamp::now(),
        }
    }
}

/// Ordered attempt records of one workflow instance, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttemptHistory {
    records: Vec<AttemptRecord>,
}

impl AttemptHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: AttemptRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[AttemptRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Summarises how the attempts evolved. `None` for an empty history.
    pub fn analyze(&self) -> Option<RetryTrend> {
        let first = self.records.first()?;
        let last = self.records.last()?;

        let mut seen_in: BTreeMap<&'static str, usize> = BTreeMap::new();
        for record in &self.records {
            for tag in &record.violations {
                *seen_in.entry(*tag).or_default() += 1;
            }
        }
        let persistent_violations: Vec<&'static str> = seen_in
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(tag, _)| tag)
            .collect();

        let lowest = self.records.iter().map(|r| r.total).min().unwrap_or(0);
        let highest = self.records.iter().map(|r| r.total).max().unwrap_or(0);
        let score_trend = Trend::between(first.total, last.total);
        let recommendation = recommend(score_trend, &persistent_violations);

        Some(RetryTrend {
            attempts: self.records.len(),
            score_trend,
            score_range: (lowest, highest),
            final_score: last.total,
            word_count_trend: Trend::between(first.word_count, last.word_count),
            persistent_violations,
            recommendation,
        })
    }
}

/// Trend analysis over an [`AttemptHistory`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetryTrend {
    pub attempts: usize,
    pub score_trend: Trend,
    /// `(lowest, highest)` total across attempts.
    pub score_range: (u32, u32),
    pub final_score: u32,
    pub word_count_trend: Trend,
    /// Violation tags reported by more than one attempt.
    pub persistent_violations: Vec<&'static str>,
    pub recommendation: String,
}

fn recommend(score_trend: Trend, persistent: &[&'static str]) -> String {
    match score_trend {
        Trend::Rising if persistent.len() <= 1 => {
            "Scores are improving; another pass with the same brief is likely to succeed.".to_string()
        }
        Trend::Stable if !persistent.is_empty() => {
            let focus: Vec<&str> = persistent.iter().take(2).copied().collect();
            format!("Resolve the persistent issues first: {}.", focus.join(", "))
        }
        Trend::Falling => {
            "Scores are declining; revise the brief or strategy before regenerating.".to_string()
        }
        _ => "No clear pattern; review the last article manually.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(attempt: u32, total: u32, word_count: u32, violations: &[&'static str]) -> AttemptRecord {
        AttemptRecord {
            attempt,
            total,
            passed: false,
            violations: violations.to_vec(),
            critical: Vec::new(),
            word_count,
            recorded_at: Timestamp::now(),
        }
    }

    #[test]
    fn test_empty_history_has_no_trend() {
        assert!(AttemptHistory::new().analyze().is_none());
    }

    #[test]
    fn test_rising_scores() {
        let mut history = AttemptHistory::new();
        history.push(record(1, 60, 1500, &["first_person_voice", "few_sections"]));
        history.push(record(2, 72, 1800, &["few_sections"]));
        history.push(record(3, 78, 1900, &["missing_success_range"]));

        let trend = history.analyze().unwrap();
        assert_eq!(trend.attempts, 3);
        assert_eq!(trend.score_trend, Trend::Rising);
        assert_eq!(trend.word_count_trend, Trend::Rising);
        assert_eq!(trend.score_range, (60, 78));
        assert_eq!(trend.final_score, 78);
        assert_eq!(trend.persistent_violations, vec!["few_sections"]);
        assert!(trend.recommendation.contains("improving"));
    }

    #[test]
    fn test_stable_scores_with_persistent_issues() {
        let mut history = AttemptHistory::new();
        history.push(record(1, 70, 2000, &["a", "b", "c"]));
        history.push(record(2, 70, 2000, &["a", "b", "c"]));

        let trend = history.analyze().unwrap();
        assert_eq!(trend.score_trend, Trend::Stable);
        assert_eq!(trend.recommendation, "Resolve the persistent issues first: a, b.");
    }

    #[test]
    fn test_falling_scores() {
        let mut history = AttemptHistory::new();
        history.push(record(1, 75, 2000, &[]));
        history.push(record(2, 65, 1900, &[]));
        let trend = history.analyze().unwrap();
        assert_eq!(trend.score_trend, Trend::Falling);
        assert_eq!(trend.word_count_trend, Trend::Falling);
        assert!(trend.recommendation.contains("declining"));
    }
}
