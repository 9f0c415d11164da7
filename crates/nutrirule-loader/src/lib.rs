//! # nutrirule-loader
//!
//! Seed-file parser and rule store for disease nutrition constraints.
//!
//! Curated rules ship as four tab-delimited snapshot files:
//!
//! | File | Columns |
//! |------|---------|
//! | `rules_Condition_<date>.txt` | `code active priority name` |
//! | `rules_Bound_<date>.txt` | `conditionCode nutrientKey min max` |
//! | `rules_Food_<date>.txt` | `conditionCode listType food` |
//! | `rules_Guidance_<date>.txt` | `conditionCode note` |
//!
//! `listType` is one of `avoid`, `recommend`, `avoid_category` or
//! `recommend_category`. The condition and bound files are required. A load either succeeds
//! completely or leaves the store untouched.
//!
//! ## Features
//!
//! - `parallel` (default): parses the seed files concurrently via rayon.
//!
//! ## Usage
//!
//! ```ignore
//! use nutrirule_loader::{ConditionRuleStore, LoaderConfig, RuleStore};
//!
//! let store = RuleStore::from_dir("/path/to/seed", &LoaderConfig::default())?;
//! for rule in store.list_rules() {
//!     println!("{} ({})", rule.code(), rule.priority());
//! }
//! ```

#![warn(missing_docs)]

pub mod bound;
pub mod condition;
pub mod custom;
pub mod food;
pub mod guidance;
pub mod loader;
pub mod parser;
pub mod store;
pub mod types;

pub use bound::BoundRow;
pub use condition::ConditionRow;
pub use custom::parse_custom_rules;
pub use food::FoodRow;
pub use guidance::GuidanceRow;
pub use loader::{discover_rule_files, extract_release_date};
pub use parser::{SeedParser, SeedRecord};
pub use store::{ConditionRuleStore, RuleStore};
pub use types::{LoadError, LoadResult, LoadStats, LoaderConfig, RuleFiles};
