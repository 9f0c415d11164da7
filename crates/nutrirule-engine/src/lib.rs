//! # nutrirule-engine
//!
//! Disease-constraint rule engine: merges a user's condition rules into one
//! effective constraint set, scores foods and meals against it, and turns
//! the score into structured advice.
//!
//! ```text
//! conditions ──► RuleMerger ──► EffectiveConstraintSet
//!                                      │
//!            profile + name ──► SuitabilityScorer ──► SuitabilityResult ──► AdviceComposer
//! ```
//!
//! Merging and scoring are pure functions of their inputs. The only state
//! is an optional cache of merged sets keyed by the merged rules' content.
//!
//! ## Features
//!
//! - `parallel` (default): batch evaluation runs on the rayon thread pool.
//!
//! ## Usage
//!
//! ```rust
//! use nutrirule_engine::NutritionEngine;
//! use nutrirule_types::{ConditionRule, ConditionRuleDraft, NutrientKey, NutrientProfile, Tier};
//!
//! let lipids = ConditionRule::try_from(ConditionRuleDraft {
//!     code: "dyslipidemia".into(),
//!     name: "Mỡ trong máu".into(),
//!     avoid: vec!["ba chỉ lợn".into()],
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! let engine = NutritionEngine::default();
//! let profile = NutrientProfile::from_values([(NutrientKey::FatG, 5.0)]).unwrap();
//! let result = engine.evaluate(&profile, "ba chỉ lợn", [&lipids]);
//!
//! assert_eq!(result.tier, Tier::Avoid);
//! assert!(result.flagged_by_name);
//! ```

#![warn(missing_docs)]

mod advice;
mod cache;
mod engine;
mod error;
mod merger;
mod scorer;

pub use advice::AdviceComposer;
pub use cache::{ConstraintCache, RuleSetKey, DEFAULT_CACHE_CAPACITY};
pub use engine::{EngineConfig, FoodItem, NutritionEngine};
pub use error::{EngineError, EngineResult};
pub use merger::RuleMerger;
pub use scorer::{ScoringConfig, SuitabilityScorer, TierThresholds};
