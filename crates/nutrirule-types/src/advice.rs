//! Structured advice types.
//!
//! Advice is structured data with stable message keys; rendering it into
//! prose or another language is the caller's job.

use crate::{BoundSide, NutrientKey, NutrientUnit, Tier};

/// Summary line of the advice.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Headline {
    /// Safety tier.
    pub tier: Tier,
    /// Suitability score.
    pub score: u8,
    /// True if the tier was forced by an avoid-list match.
    pub flagged_by_name: bool,
    /// Avoid entries the name matched.
    pub matched_avoid: Vec<String>,
    /// True if the name matched a recommend entry.
    pub recommended_by_name: bool,
    /// The avoided category that forced the tier, if any.
    pub matched_avoid_category: Option<String>,
    /// True if there was nothing to evaluate.
    pub empty_evaluation: bool,
}

impl Headline {
    /// Returns the localisation key for this headline.
    pub fn message_key(&self) -> &'static str {
        if self.flagged_by_name {
            "advice.headline.avoid_listed"
        } else if self.matched_avoid_category.is_some() {
            "advice.headline.avoid_category"
        } else if self.empty_evaluation {
            "advice.headline.nothing_to_evaluate"
        } else {
            match self.tier {
                Tier::Safe => "advice.headline.safe",
                Tier::Moderate => "advice.headline.moderate",
                Tier::Caution => "advice.headline.caution",
                Tier::Avoid => "advice.headline.avoid",
            }
        }
    }
}

/// A warning about one nutrient outside its bound.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NutrientWarning {
    /// The nutrient.
    pub nutrient: NutrientKey,
    /// The reported value.
    pub actual: f64,
    /// Which limit was breached.
    pub side: BoundSide,
    /// The breached limit.
    pub limit: f64,
    /// Unit of `actual` and `limit`.
    pub unit: NutrientUnit,
}

impl NutrientWarning {
    /// Returns the localisation key for this warning.
    pub fn message_key(&self) -> &'static str {
        match self.side {
            BoundSide::Max => "advice.warning.above_max",
            BoundSide::Min => "advice.warning.below_min",
        }
    }
}

/// Direction a nutrient should move in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AdjustmentDirection {
    /// Lower the nutrient.
    Reduce,
    /// Raise the nutrient.
    Increase,
}

/// A suggested change that would bring one nutrient within bound.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdjustmentSuggestion {
    /// The nutrient.
    pub nutrient: NutrientKey,
    /// Which way to move it.
    pub direction: AdjustmentDirection,
    /// How much it must change to reach the limit.
    pub amount: f64,
    /// Unit of `amount`.
    pub unit: NutrientUnit,
}

impl AdjustmentSuggestion {
    /// Returns the localisation key for this suggestion.
    pub fn message_key(&self) -> &'static str {
        match self.direction {
            AdjustmentDirection::Reduce => "advice.adjust.reduce",
            AdjustmentDirection::Increase => "advice.adjust.increase",
        }
    }
}

/// Advice derived from a [`SuitabilityResult`](crate::SuitabilityResult).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StructuredAdvice {
    /// Tier and score summary.
    pub headline: Headline,
    /// One warning per violation.
    pub specific_warnings: Vec<NutrientWarning>,
    /// One suggestion per violation.
    pub adjustment_suggestions: Vec<AdjustmentSuggestion>,
    /// Condition guidance notes, verbatim and deduplicated.
    pub general_guidance: Vec<String>,
}
