//! Nutrient bound type.
//!
//! A [`Bound`] is an optional minimum and/or maximum permissible value for
//! one nutrient. Construction enforces the invariants: at least one side
//! is set, both sides are finite and non-negative, and `min <= max`.

use crate::error::check_value;
use crate::ValidationError;

/// One side of a [`Bound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BoundSide {
    /// Lower limit.
    Min,
    /// Upper limit.
    Max,
}

/// Permissible range for a single nutrient.
///
/// # Examples
///
/// ```
/// use nutrirule_types::Bound;
///
/// let sodium = Bound::at_most(400.0).unwrap();
/// assert!(sodium.contains(350.0));
/// assert!(!sodium.contains(800.0));
///
/// let fiber = Bound::between(25.0, 40.0).unwrap();
/// assert_eq!(fiber.min(), Some(25.0));
///
/// assert!(Bound::new(None, None).is_err());
/// assert!(Bound::between(10.0, 5.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawBound", into = "RawBound"))]
pub struct Bound {
    min: Option<f64>,
    max: Option<f64>,
}

/// Unvalidated wire form of a [`Bound`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawBound {
    /// Lower limit, if any.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub min: Option<f64>,
    /// Upper limit, if any.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub max: Option<f64>,
}

impl TryFrom<RawBound> for Bound {
    type Error = ValidationError;

    fn try_from(raw: RawBound) -> Result<Self, Self::Error> {
        Bound::new(raw.min, raw.max)
    }
}

impl From<Bound> for RawBound {
    fn from(bound: Bound) -> Self {
        RawBound {
            min: bound.min,
            max: bound.max,
        }
    }
}

impl Bound {
    /// Creates a bound, validating its invariants.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyBound`] when neither side is set,
    /// [`ValidationError::InvalidValue`] for negative or non-finite limits,
    /// and [`ValidationError::InvertedBound`] when `min > max`.
    pub fn new(min: Option<f64>, max: Option<f64>) -> Result<Self, ValidationError> {
        if min.is_none() && max.is_none() {
            return Err(ValidationError::EmptyBound);
        }
        let min = min.map(|v| check_value("min", v)).transpose()?;
        let max = max.map(|v| check_value("max", v)).transpose()?;
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(ValidationError::InvertedBound { min: lo, max: hi });
            }
        }
        Ok(Self { min, max })
    }

    /// Creates an upper-limit-only bound.
    pub fn at_most(max: f64) -> Result<Self, ValidationError> {
        Self::new(None, Some(max))
    }

    /// Creates a lower-limit-only bound.
    pub fn at_least(min: f64) -> Result<Self, ValidationError> {
        Self::new(Some(min), None)
    }

    /// Creates a bound with both limits.
    pub fn between(min: f64, max: f64) -> Result<Self, ValidationError> {
        Self::new(Some(min), Some(max))
    }

    /// Returns the lower limit.
    pub fn min(&self) -> Option<f64> {
        self.min
    }

    /// Returns the upper limit.
    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// Returns the limit on the given side.
    pub fn side(&self, side: BoundSide) -> Option<f64> {
        match side {
            BoundSide::Min => self.min,
            BoundSide::Max => self.max,
        }
    }

    /// Returns true if `value` satisfies both limits (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|lo| value >= lo) && self.max.is_none_or(|hi| value <= hi)
    }

    /// Returns the side `value` breaches, if any.
    pub fn breached_side(&self, value: f64) -> Option<BoundSide> {
        if self.max.is_some_and(|hi| value > hi) {
            Some(BoundSide::Max)
        } else if self.min.is_some_and(|lo| value < lo) {
            Some(BoundSide::Min)
        } else {
            None
        }
    }

    /// Intersects two bounds.
    ///
    /// Returns `None` when the intersection is empty (`min > max`).
    pub fn intersect(&self, other: &Bound) -> Option<Bound> {
        let min = tighter(self.min, other.min, f64::max);
        let max = tighter(self.max, other.max, f64::min);
        match (min, max) {
            (Some(lo), Some(hi)) if lo > hi => None,
            _ => Some(Bound { min, max }),
        }
    }

    /// Returns true if every value allowed by `self` is allowed by `other`.
    pub fn is_within(&self, other: &Bound) -> bool {
        let min_ok = match (self.min, other.min) {
            (_, None) => true,
            (Some(a), Some(b)) => a >= b,
            (None, Some(_)) => false,
        };
        let max_ok = match (self.max, other.max) {
            (_, None) => true,
            (Some(a), Some(b)) => a <= b,
            (None, Some(_)) => false,
        };
        min_ok && max_ok
    }
}

fn tighter(a: Option<f64>, b: Option<f64>, pick: fn(f64, f64) -> f64) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(pick(x, y)),
        (x, None) => x,
        (None, y) => y,
    }
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.min, self.max) {
            (Some(lo), Some(hi)) => write!(f, "{}..={}", lo, hi),
            (Some(lo), None) => write!(f, ">={}", lo),
            (None, Some(hi)) => write!(f, "<={}", hi),
            (None, None) => write!(f, "*"),
        }
    }
}
