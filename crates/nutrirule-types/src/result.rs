//! Suitability result types.

use crate::{Bound, BoundSide, NutrientKey};

/// Coarse safety classification of a food or meal.
///
/// Ordered from most to least suitable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Tier {
    /// Fits the user's constraints.
    Safe,
    /// Acceptable in moderation.
    Moderate,
    /// Eat with caution.
    Caution,
    /// Should be avoided.
    Avoid,
}

impl Tier {
    /// Returns the snake_case label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Moderate => "moderate",
            Self::Caution => "caution",
            Self::Avoid => "avoid",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A nutrient outside its merged bound.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Violation {
    /// The nutrient.
    pub nutrient: NutrientKey,
    /// The value reported by the profile.
    pub actual: f64,
    /// Which side of the bound was breached.
    pub side: BoundSide,
    /// The breached limit.
    pub limit: f64,
    /// The full merged bound.
    pub bound: Bound,
    /// Per-nutrient penalty in `[0, 1]`.
    pub penalty: f64,
    /// Weight applied to the penalty.
    pub weight: f64,
}

impl Violation {
    /// Returns how far the value is from the breached limit.
    pub fn distance(&self) -> f64 {
        (self.actual - self.limit).abs()
    }
}

/// A nutrient within its merged bound.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Compliance {
    /// The nutrient.
    pub nutrient: NutrientKey,
    /// The value reported by the profile.
    pub actual: f64,
    /// The merged bound it satisfies.
    pub bound: Bound,
}

/// The outcome of scoring one food or meal against a constraint set.
///
/// Freshly computed for each evaluation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SuitabilityResult {
    /// The evaluated food or meal name, as supplied.
    pub name: String,
    /// Suitability score in `[0, 100]`, unaffected by the name override.
    pub score: u8,
    /// Safety tier.
    pub tier: Tier,
    /// Nutrients outside their bound, in canonical nutrient order.
    pub violations: Vec<Violation>,
    /// Nutrients within their bound, in canonical nutrient order.
    pub compliances: Vec<Compliance>,
    /// Bounded nutrients the profile did not report; not penalised.
    pub skipped: Vec<NutrientKey>,
    /// True if the name matched an avoid entry.
    pub flagged_by_name: bool,
    /// The avoid entries the name matched.
    pub matched_avoid: Vec<String>,
    /// True if the name matched a recommend entry.
    pub recommended_by_name: bool,
    /// The food category supplied with the name, if any.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub category: Option<String>,
    /// The avoided category the food's category matched.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub matched_avoid_category: Option<String>,
    /// True if the food's category is a recommended category.
    #[cfg_attr(feature = "serde", serde(default))]
    pub recommended_by_category: bool,
    /// True if the profile reported no nutrients at all.
    pub empty_evaluation: bool,
    /// Guidance notes of the contributing conditions.
    pub guidance: Vec<String>,
}

impl SuitabilityResult {
    /// Returns true if no nutrient breached its bound.
    pub fn is_compliant(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns true if the food's category is avoided.
    pub fn flagged_by_category(&self) -> bool {
        self.matched_avoid_category.is_some()
    }

    /// Returns the violation for a nutrient, if any.
    pub fn violation(&self, nutrient: NutrientKey) -> Option<&Violation> {
        self.violations.iter().find(|v| v.nutrient == nutrient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(Tier::Safe < Tier::Moderate);
        assert!(Tier::Caution < Tier::Avoid);
        assert_eq!(Tier::Avoid.max(Tier::Safe), Tier::Avoid);
        assert_eq!(Tier::Caution.to_string(), "caution");
    }

    #[test]
    fn test_violation_distance() {
        let v = Violation {
            nutrient: NutrientKey::FiberG,
            actual: 10.0,
            side: BoundSide::Min,
            limit: 25.0,
            bound: Bound::at_least(25.0).unwrap(),
            penalty: 0.6,
            weight: 2.0,
        };
        assert_eq!(v.distance(), 15.0);
    }
}
