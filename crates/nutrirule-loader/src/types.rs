//! Loader-specific types for seed file processing.

use std::path::PathBuf;

use nutrirule_types::ValidationError;
use thiserror::Error;

/// Errors that can occur while loading or looking up condition rules.
#[derive(Error, Debug)]
pub enum LoadError {
    /// I/O error reading a seed file.
    #[error("IO error reading seed file: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing error in a custom rule document.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A value failed validation outside any particular rule.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A bound references a nutrient key the engine does not recognise.
    #[error("Unknown nutrient key '{key}' in condition '{condition}' (line {line})")]
    UnknownNutrientKey {
        /// The condition the bound belongs to.
        condition: String,
        /// The unrecognised key.
        key: String,
        /// Line number in the seed file.
        line: u64,
    },

    /// A rule failed validation.
    #[error("Invalid rule '{code}': {source}")]
    InvalidRule {
        /// The rule's condition code.
        code: String,
        /// What was wrong with it.
        source: ValidationError,
    },

    /// A row references a condition missing from the condition file.
    #[error("Row in {file} references unknown condition '{code}'")]
    UnknownCondition {
        /// The seed file the row came from.
        file: String,
        /// The unknown code.
        code: String,
    },

    /// A condition code appears twice in the condition file.
    #[error("Duplicate condition code: {code}")]
    DuplicateCondition {
        /// The repeated code.
        code: String,
    },

    /// A nutrient is bounded twice for the same condition.
    #[error("Duplicate bound for '{nutrient}' in condition '{code}'")]
    DuplicateBound {
        /// The condition code.
        code: String,
        /// The nutrient key.
        nutrient: String,
    },

    /// Invalid numeric value.
    #[error("Invalid number: {value}")]
    InvalidNumber {
        /// The invalid value.
        value: String,
    },

    /// Invalid boolean value.
    #[error("Invalid boolean value: {value} (expected 0 or 1)")]
    InvalidBoolean {
        /// The invalid value.
        value: String,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Directory not found.
    #[error("Directory not found: {path}")]
    DirectoryNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Required file missing from the seed directory.
    #[error("Required seed file not found: {file_type} in {directory}")]
    RequiredFileMissing {
        /// The type of file that was missing.
        file_type: String,
        /// The directory that was searched.
        directory: String,
    },

    /// Invalid header - column count mismatch.
    #[error("Invalid header: expected {expected} columns, found {found}")]
    InvalidHeader {
        /// Expected column count.
        expected: usize,
        /// Found column count.
        found: usize,
    },

    /// Unexpected column name.
    #[error("Unexpected column '{found}' at position {position}, expected '{expected}'")]
    UnexpectedColumn {
        /// The column position.
        position: usize,
        /// Expected column name.
        expected: String,
        /// Found column name.
        found: String,
    },

    /// No rule exists for a condition code.
    #[error("Condition rule not found: {code}")]
    RuleNotFound {
        /// The requested code.
        code: String,
    },

    /// A custom rule tried to reuse a curated condition code.
    #[error("Condition code '{code}' is reserved by a curated rule")]
    ReservedCode {
        /// The reserved code.
        code: String,
    },
}

/// Result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Configuration for seed loading.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Whether to load active conditions only.
    pub active_only: bool,
    /// Condition codes to load (empty = all conditions).
    pub condition_codes: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            active_only: true,
            condition_codes: vec![],
        }
    }
}

impl LoaderConfig {
    /// Creates a config that loads only the given conditions.
    pub fn only<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            active_only: true,
            condition_codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if a condition code passes the code filter.
    pub fn includes(&self, code: &str) -> bool {
        self.condition_codes.is_empty() || self.condition_codes.iter().any(|c| c == code)
    }
}

/// Statistics from loading a seed directory.
#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    /// Condition rules loaded.
    pub conditions: usize,
    /// Bound rows applied.
    pub bounds: usize,
    /// Food rows applied.
    pub foods: usize,
    /// Guidance rows applied.
    pub guidance: usize,
    /// Rows skipped because their condition was filtered out.
    pub skipped_rows: usize,
    /// Time taken to load in milliseconds.
    pub load_time_ms: u64,
}

impl LoadStats {
    /// Returns the total number of rows applied.
    pub fn total_rows(&self) -> usize {
        self.conditions + self.bounds + self.foods + self.guidance
    }
}

/// Discovered seed files in a rule directory.
#[derive(Debug, Clone, Default)]
pub struct RuleFiles {
    /// Path to the condition file.
    pub condition_file: Option<PathBuf>,
    /// Path to the bound file.
    pub bound_file: Option<PathBuf>,
    /// Path to the food list file.
    pub food_file: Option<PathBuf>,
    /// Path to the guidance file.
    pub guidance_file: Option<PathBuf>,
    /// Release date extracted from filename (YYYYMMDD).
    pub release_date: Option<String>,
}

impl RuleFiles {
    /// Creates a new empty RuleFiles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if all required files (condition, bound) are present.
    pub fn has_required_files(&self) -> bool {
        self.condition_file.is_some() && self.bound_file.is_some()
    }

    /// Returns a list of missing required files.
    pub fn missing_files(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.condition_file.is_none() {
            missing.push("Condition");
        }
        if self.bound_file.is_none() {
            missing.push("Bound");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_config_default() {
        let config = LoaderConfig::default();
        assert!(config.active_only);
        assert!(config.includes("anything"));
    }

    #[test]
    fn test_loader_config_only() {
        let config = LoaderConfig::only(["diabetes", "gout"]);
        assert!(config.includes("gout"));
        assert!(!config.includes("hypertension"));
    }

    #[test]
    fn test_load_stats_total() {
        let stats = LoadStats {
            conditions: 2,
            bounds: 5,
            foods: 7,
            guidance: 1,
            ..Default::default()
        };
        assert_eq!(stats.total_rows(), 15);
    }

    #[test]
    fn test_rule_files_missing() {
        let files = RuleFiles {
            condition_file: Some(PathBuf::from("rules_Condition_20250101.txt")),
            ..Default::default()
        };

        assert!(!files.has_required_files());
        assert_eq!(files.missing_files(), vec!["Bound"]);
    }

    #[test]
    fn test_error_messages() {
        let err = LoadError::UnknownNutrientKey {
            condition: "gout".into(),
            key: "purines".into(),
            line: 4,
        };
        assert_eq!(
            err.to_string(),
            "Unknown nutrient key 'purines' in condition 'gout' (line 4)"
        );
    }
}
