//! Runtime settings: rubric, retry budgets and batch concurrency.
//!
//! Values come from an optional rubric JSON file plus environment overrides.
//! Invalid values are reported as [`WorkflowError::ConfigurationError`] and
//! never cause a panic.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use gate::{RetryConfig, RubricConfig, WorkflowError};
use tracing::debug;

use crate::batch::DEFAULT_MAX_CONCURRENT;

/// Path of a rubric JSON file.
pub const RUBRIC_PATH: &str = "RUBRIC_PATH";
/// Pass threshold (integer points).
pub const QUALITY_PASS_THRESHOLD: &str = "QUALITY_PASS_THRESHOLD";
/// Word-count floor as a whole percentage of the target (e.g. `85`).
pub const WORD_COUNT_FLOOR_PERCENT: &str = "WORD_COUNT_FLOOR_PERCENT";
/// Maximum scored generation attempts.
pub const MAX_ATTEMPTS: &str = "MAX_ATTEMPTS";
/// Tries per collaborator call.
pub const COLLABORATOR_RETRIES: &str = "COLLABORATOR_RETRIES";
/// Workflow instances allowed to run at once in a batch.
pub const BATCH_MAX_CONCURRENT: &str = "BATCH_MAX_CONCURRENT";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub rubric: RubricConfig,
    pub retry: RetryConfig,
    pub batch_max_concurrent: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rubric: RubricConfig::default(),
            retry: RetryConfig::default(),
            batch_max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

impl Settings {
    /// Loads settings using `lookup` for every variable.
    ///
    /// `rubric_path` takes precedence over `RUBRIC_PATH`.
    pub fn from_lookup_with_rubric(
        lookup: impl Fn(&str) -> Option<String>,
        rubric_path: Option<&Path>,
    ) -> Result<Self, WorkflowError> {
        let path = rubric_path
            .map(Path::to_path_buf)
            .or_else(|| lookup(RUBRIC_PATH).map(PathBuf::from));
        let mut rubric = match path {
            Some(path) => load_rubric(&path)?,
            None => RubricConfig::default(),
        };

        if let Some(threshold) = parse_var::<u32>(&lookup, QUALITY_PASS_THRESHOLD)? {
            rubric.pass_threshold = threshold;
        }
        if let Some(percent) = parse_var::<u32>(&lookup, WORD_COUNT_FLOOR_PERCENT)? {
            if percent == 0 || percent > 100 {
                return Err(WorkflowError::config(format!(
                    "{WORD_COUNT_FLOOR_PERCENT} must be within 1..=100, got {percent}"
                )));
            }
            rubric.word_count.floor_basis_points = percent * 100;
        }
        rubric.validate()?;

        let mut retry = RetryConfig::default();
        if let Some(attempts) = parse_var(&lookup, MAX_ATTEMPTS)? {
            retry.max_attempts = attempts;
        }
        if let Some(tries) = parse_var(&lookup, COLLABORATOR_RETRIES)? {
            retry.collaborator_retries = tries;
        }
        retry.validate()?;

        let batch_max_concurrent =
            parse_var(&lookup, BATCH_MAX_CONCURRENT)?.unwrap_or(DEFAULT_MAX_CONCURRENT);
        if batch_max_concurrent == 0 {
            return Err(WorkflowError::config(format!(
                "{BATCH_MAX_CONCURRENT} must be at least 1"
            )));
        }

        debug!(
            pass_threshold = rubric.pass_threshold,
            floor_basis_points = rubric.word_count.floor_basis_points,
            max_attempts = retry.max_attempts,
            collaborator_retries = retry.collaborator_retries,
            batch_max_concurrent,
            "Settings loaded"
        );

        Ok(Self {
            rubric,
            retry,
            batch_max_concurrent,
        })
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, WorkflowError> {
        Self::from_lookup_with_rubric(lookup, None)
    }
}

/// Reads and validates a rubric JSON file.
pub fn load_rubric(path: &Path) -> Result<RubricConfig, WorkflowError> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        WorkflowError::config(format!("cannot read rubric {}: {e}", path.display()))
    })?;
    RubricConfig::from_json_str(&json)
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, WorkflowError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| WorkflowError::config(format!("{key}={raw:?} is invalid: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_overrides_apply() {
        let settings = Settings::from_lookup(lookup(&[
            (QUALITY_PASS_THRESHOLD, "85"),
            (WORD_COUNT_FLOOR_PERCENT, "88"),
            (MAX_ATTEMPTS, "5"),
            (COLLABORATOR_RETRIES, "2"),
            (BATCH_MAX_CONCURRENT, "4"),
        ]))
        .unwrap();

        assert_eq!(settings.rubric.pass_threshold, 85);
        assert_eq!(settings.rubric.word_count.floor_basis_points, 8_800);
        assert_eq!(settings.retry.max_attempts, 5);
        assert_eq!(settings.retry.collaborator_retries, 2);
        assert_eq!(settings.batch_max_concurrent, 4);
    }

    #[test]
    fn test_invalid_values_are_configuration_errors() {
        let cases: &[(&str, &str)] = &[
            (QUALITY_PASS_THRESHOLD, "eighty"),
            (QUALITY_PASS_THRESHOLD, "0"),
            (QUALITY_PASS_THRESHOLD, "150"),
            (WORD_COUNT_FLOOR_PERCENT, "0"),
            (WORD_COUNT_FLOOR_PERCENT, "96"),
            (MAX_ATTEMPTS, "0"),
            (MAX_ATTEMPTS, "-1"),
            (COLLABORATOR_RETRIES, "0"),
            (BATCH_MAX_CONCURRENT, "0"),
        ];
        for &(key, value) in cases {
            let err = Settings::from_lookup(lookup(&[(key, value)])).unwrap_err();
            assert!(
                matches!(err, WorkflowError::ConfigurationError { .. }),
                "{key}={value} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_missing_rubric_file_is_a_configuration_error() {
        let err = Settings::from_lookup(lookup(&[(RUBRIC_PATH, "/nonexistent/rubric.json")]))
            .unwrap_err();
        assert!(err.to_string().contains("cannot read rubric"));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let settings = Settings::from_lookup(lookup(&[(MAX_ATTEMPTS, "  ")])).unwrap();
        assert_eq!(settings.retry.max_attempts, 3);
    }
}
