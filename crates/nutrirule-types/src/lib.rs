//! # nutrirule-types
//!
//! Type definitions for disease-constrained nutrition rules.
//!
//! This crate provides the data model shared by the loader and the engine:
//! nutrient keys and profiles, per-condition rules with typed bounds, user
//! condition assignments, and the merged constraint set, suitability result
//! and structured advice the engine produces.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!   Validated types deserialize through their raw forms, so invalid data is
//!   rejected on the way in.
//!
//! ## Usage
//!
//! ```rust
//! use nutrirule_types::{Bound, NutrientKey, NutrientProfile, Priority};
//!
//! let bound = Bound::at_most(400.0).unwrap();
//! let soup = NutrientProfile::builder()
//!     .value(NutrientKey::SodiumMg, 800.0)
//!     .build()
//!     .unwrap();
//!
//! assert!(!bound.contains(soup.get(NutrientKey::SodiumMg).unwrap()));
//! assert!(Priority::High > Priority::Low);
//! ```

#![warn(missing_docs)]

mod advice;
mod assignment;
mod bound;
mod constraint;
mod enums;
mod error;
mod normalize;
mod nutrient;
mod profile;
mod result;
mod rule;

// Re-export all public types at crate root
pub use advice::{
    AdjustmentDirection, AdjustmentSuggestion, Headline, NutrientWarning, StructuredAdvice,
};
pub use assignment::{ConditionAssignment, UserConditions};
pub use bound::{Bound, BoundSide, RawBound};
pub use constraint::{
    BoundContribution, ContributionOutcome, EffectiveConstraintSet, FoodSet, NutrientSource,
};
pub use enums::{FoodList, Priority, Severity};
pub use error::{AssignmentError, ValidationError};
pub use normalize::{food_name_matches, lowercase_food_name, name_matches, normalize_food_name};
pub use nutrient::{NutrientKey, NutrientUnit};
pub use profile::{NutrientProfile, NutrientProfileBuilder};
pub use result::{Compliance, SuitabilityResult, Tier, Violation};
pub use rule::{ConditionCode, ConditionRule, ConditionRuleDraft, RuleOwner, UserId};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_are_exported() {
        // Verify all types are accessible from crate root
        let _key = NutrientKey::SodiumMg;
        let _priority = Priority::High;
        let _severity = Severity::Mild;
        let _tier = Tier::Caution;
        let _side = BoundSide::Max;
        let _list = FoodList::Avoid;
        let _set = EffectiveConstraintSet::default();
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let set = EffectiveConstraintSet {
            bounds: [(NutrientKey::SodiumMg, Bound::at_most(400.0).unwrap())]
                .into_iter()
                .collect(),
            avoid: ["mắm tôm"].into_iter().collect(),
            ..Default::default()
        };

        let json = serde_json::to_string(&set).unwrap();
        let parsed: EffectiveConstraintSet = serde_json::from_str(&json).unwrap();
        assert_eq!(set, parsed);
    }
}
