//! Validation errors raised while constructing rule-engine values.
//!
//! These errors indicate data-authoring bugs (a curated seed file or a
//! user-authored custom rule) and are meant for the authoring workflow,
//! never for end users.

/// Error raised when a value violates a structural invariant.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A bound or profile references a nutrient key that is not recognised.
    UnknownNutrientKey(String),
    /// A bound has neither a minimum nor a maximum.
    EmptyBound,
    /// A bound has `min > max`.
    InvertedBound {
        /// The minimum that was supplied.
        min: f64,
        /// The maximum that was supplied.
        max: f64,
    },
    /// A numeric value is negative, NaN or infinite.
    InvalidValue {
        /// What the value belonged to (a nutrient key or bound side).
        field: String,
        /// The rejected value.
        value: f64,
    },
    /// A condition code is empty after trimming.
    EmptyConditionCode,
    /// A priority label could not be parsed.
    UnknownPriority(String),
    /// A severity label could not be parsed.
    UnknownSeverity(String),
    /// A food-list label could not be parsed.
    UnknownFoodList(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownNutrientKey(key) => write!(f, "unknown nutrient key: '{}'", key),
            Self::EmptyBound => write!(f, "bound must set at least one of min or max"),
            Self::InvertedBound { min, max } => {
                write!(f, "bound minimum {} is greater than maximum {}", min, max)
            }
            Self::InvalidValue { field, value } => {
                write!(f, "invalid value {} for '{}' (expected a finite, non-negative number)", value, field)
            }
            Self::EmptyConditionCode => write!(f, "condition code must not be empty"),
            Self::UnknownPriority(s) => {
                write!(f, "unknown priority: '{}' (expected low, medium or high)", s)
            }
            Self::UnknownSeverity(s) => {
                write!(f, "unknown severity: '{}' (expected mild, moderate or severe)", s)
            }
            Self::UnknownFoodList(s) => {
                write!(f, "unknown food list: '{}' (expected avoid or recommend)", s)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Error raised when mutating a user's condition assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    /// The condition is not assigned to the user.
    NotAssigned(String),
    /// The condition is already assigned to the user.
    AlreadyAssigned(String),
}

impl std::fmt::Display for AssignmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAssigned(code) => write!(f, "condition '{}' is not assigned to this user", code),
            Self::AlreadyAssigned(code) => {
                write!(f, "condition '{}' is already assigned to this user", code)
            }
        }
    }
}

impl std::error::Error for AssignmentError {}

/// Checks that a value is finite and non-negative.
pub(crate) fn check_value(field: &str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value,
        })
    }
}
