//! # nutrirule-service
//!
//! Request handling for the `nutrirule-check` binary.
//!
//! A request names a user, the user's assigned conditions, optional custom
//! rules, and the foods and meals to evaluate. The response carries the
//! merged constraints plus one scored result and its advice per item.
//!
//! ## Request
//!
//! ```json
//! {
//!   "user": "alice",
//!   "conditions": [{ "code": "hypertension", "primary": true, "severity": "severe" }],
//!   "custom_rules": [{ "code": "low_sugar", "bounds": { "sugar_g": { "max": 10 } } }],
//!   "foods": [{ "name": "phở bò", "category": "phở", "nutrients": { "sodium_mg": 1200 }, "portion_g": 350 }],
//!   "meals": [{ "name": "bữa tối", "items": [ ... ] }]
//! }
//! ```
//!
//! ## Configuration
//!
//! The binary reads its configuration from the environment:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `NUTRIRULE_DATA_PATH` | `data/rules` | Seed directory |
//! | `NUTRIRULE_CACHE_CAPACITY` | `1024` | Cached constraint sets (0 disables) |
//! | `RUST_LOG` | `info` | Log filter |

#![warn(missing_docs)]

mod checker;
mod dto;

pub use checker::Checker;
pub use dto::{
    AssignedCondition, Assessment, CheckRequest, CheckResponse, FoodRequest, MealRequest,
};
