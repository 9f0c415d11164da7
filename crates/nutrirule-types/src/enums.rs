//! Enumerations shared by condition rules and assignments.

use std::str::FromStr;

use crate::ValidationError;

/// Priority of a condition rule.
///
/// Ordered `Low < Medium < High`. Priority decides which side wins when two
/// rules' bounds cannot both hold, and weights per-nutrient penalties during
/// scoring.
///
/// # Examples
///
/// ```
/// use nutrirule_types::Priority;
///
/// assert!(Priority::High > Priority::Medium);
/// assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
/// assert_eq!(Priority::Low.default_weight(), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Priority {
    /// Advisory constraint.
    Low,
    /// Standard constraint.
    #[default]
    Medium,
    /// Constraint that must dominate.
    High,
}

impl Priority {
    /// Returns the label used in seed files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Returns the index of this priority (0 = low, 2 = high).
    pub fn index(self) -> usize {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }

    /// Returns the default penalty weight: low 1, medium 2, high 3.
    pub fn default_weight(self) -> f64 {
        (self.index() + 1) as f64
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "1" => Ok(Self::Low),
            "medium" | "2" => Ok(Self::Medium),
            "high" | "3" => Ok(Self::High),
            _ => Err(ValidationError::UnknownPriority(s.to_string())),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clinical severity of an assigned condition.
///
/// Metadata only; it does not feed the numeric logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Severity {
    /// Mild.
    Mild,
    /// Moderate.
    #[default]
    Moderate,
    /// Severe.
    Severe,
}

impl FromStr for Severity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mild" => Ok(Self::Mild),
            "moderate" => Ok(Self::Moderate),
            "severe" => Ok(Self::Severe),
            _ => Err(ValidationError::UnknownSeverity(s.to_string())),
        }
    }
}

/// Which food list of a rule an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FoodList {
    /// Foods the condition forbids.
    Avoid,
    /// Foods the condition encourages.
    Recommend,
    /// Food categories the condition forbids.
    AvoidCategory,
    /// Food categories the condition encourages.
    RecommendCategory,
}

impl FromStr for FoodList {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "avoid" | "restricted" => Ok(Self::Avoid),
            "recommend" | "allowed" => Ok(Self::Recommend),
            "avoid_category" | "restricted_category" => Ok(Self::AvoidCategory),
            "recommend_category" | "allowed_category" => Ok(Self::RecommendCategory),
            _ => Err(ValidationError::UnknownFoodList(s.to_string())),
        }
    }
}
