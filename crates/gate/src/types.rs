//! Shared value types for the quality gate domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (e.g. a target word count is strictly
//! positive, a ratio is kept as an exact fraction) and participate in scoring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Word counts
// ---------------------------------------------------------------------------

/// Number of words counted in an article body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WordCount(u32);

impl WordCount {
    /// Creates a [`WordCount`] from a raw integer.
    pub fn new(count: u32) -> Self {
        Self(count)
    }

    /// Returns the underlying integer value.
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns `true` if no words were counted.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for WordCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// The word count a brief asks for. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TargetWordCount(u32);

impl TargetWordCount {
    /// Creates a [`TargetWordCount`], returning `None` for zero.
    #[must_use]
    pub fn new(count: u32) -> Option<Self> {
        if count == 0 {
            None
        } else {
            Some(Self(count))
        }
    }

    /// Returns the underlying integer value.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for TargetWordCount {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "target word count must be positive".to_string())
    }
}

impl From<TargetWordCount> for u32 {
    fn from(value: TargetWordCount) -> Self {
        value.0
    }
}

impl std::fmt::Display for TargetWordCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// Actual words over target words, kept as an exact fraction.
///
/// Tier boundaries are compared in basis points with integer arithmetic so
/// that a ratio of exactly `0.85` lands on the `0.85` side of a boundary
/// regardless of floating-point rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordCountRatio {
    actual: WordCount,
    target: TargetWordCount,
}

/// One whole ratio (`1.0`) in basis points.
pub const BASIS_POINTS_PER_UNIT: u32 = 10_000;

impl WordCountRatio {
    /// Creates the ratio `actual / target`.
    pub fn new(actual: WordCount, target: TargetWordCount) -> Self {
        Self { actual, target }
    }

    /// Returns the counted words.
    pub fn actual(self) -> WordCount {
        self.actual
    }

    /// Returns the requested words.
    pub fn target(self) -> TargetWordCount {
        self.target
    }

    /// Returns `true` if the ratio is at least `basis_points / 10_000`.
    pub fn at_least(self, basis_points: u32) -> bool {
        u64::from(self.actual.as_u32()) * u64::from(BASIS_POINTS_PER_UNIT)
            >= u64::from(self.target.as_u32()) * u64::from(basis_points)
    }

    /// Returns the ratio as a float, for reporting only.
    pub fn as_f64(self) -> f64 {
        f64::from(self.actual.as_u32()) / f64::from(self.target.as_u32())
    }

    /// Returns the signed deviation from target in percent (e.g. `-15.0`).
    pub fn deviation_percent(self) -> f64 {
        (self.as_f64() - 1.0) * 100.0
    }

    /// Returns how many words are missing to reach the target (zero if met).
    pub fn shortfall(self) -> u32 {
        self.target.as_u32().saturating_sub(self.actual.as_u32())
    }
}

impl std::fmt::Display for WordCountRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({:.4})", self.actual, self.target, self.as_f64())
    }
}

// ---------------------------------------------------------------------------
// Findings
// ---------------------------------------------------------------------------

/// Severity of a rubric finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Forces the gate to fail regardless of the numeric total.
    Critical,
    /// Deducts points but does not block on its own.
    Minor,
}

// ---------------------------------------------------------------------------
// Trends
// ---------------------------------------------------------------------------

/// Direction of a value across successive attempts (first versus last).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

impl Trend {
    /// Compares the first and last observations of a sequence.
    pub fn between<T: Ord>(first: T, last: T) -> Self {
        match last.cmp(&first) {
            std::cmp::Ordering::Greater => Self::Rising,
            std::cmp::Ordering::Less => Self::Falling,
            std::cmp::Ordering::Equal => Self::Stable,
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
