//! Effective constraint set type.
//!
//! The merge of all of a user's active condition rules. Derived on demand,
//! never persisted.

use std::collections::{BTreeMap, BTreeSet};

use crate::normalize::{normalize_food_name, NameForms};
use crate::{Bound, BoundSide, ConditionCode, NutrientKey, Priority};

/// A set of food names compared by their normalised form.
///
/// Spellings that normalise to the same key share one entry. Every spelling
/// is kept for matching; the lexicographically smallest one is used for
/// display, so the result does not depend on insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FoodSet {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl FoodSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a food name. Blank names are ignored.
    pub fn insert(&mut self, display: &str) {
        let key = normalize_food_name(display);
        if key.is_empty() {
            return;
        }
        self.entries
            .entry(key)
            .or_default()
            .insert(display.trim().to_string());
    }

    /// Returns true if the set contains a name with the same normalised form.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize_food_name(name))
    }

    /// Removes every entry whose normalised form is in `other`.
    pub fn remove_all(&mut self, other: &FoodSet) {
        self.entries.retain(|key, _| !other.entries.contains_key(key));
    }

    /// Returns the display names of entries matching a food name.
    ///
    /// An entry matches when its words appear as a contiguous run of the
    /// name's words. See [`food_name_matches`](crate::food_name_matches).
    pub fn matches(&self, name: &str) -> Vec<&str> {
        let name = NameForms::new(name);
        self.entries
            .values()
            .filter(|spellings| {
                spellings
                    .iter()
                    .any(|spelling| name.matches(&NameForms::new(spelling)))
            })
            .filter_map(|spellings| spellings.first().map(String::as_str))
            .collect()
    }

    /// Returns the display name of the entry that names `label` as a whole.
    ///
    /// Used for category labels, where "bún" must not match "bún bò" and
    /// "bún" must not match "bùn".
    pub fn find(&self, label: &str) -> Option<&str> {
        let label = NameForms::new(label);
        self.entries
            .get(label.folded())
            .filter(|spellings| {
                spellings
                    .iter()
                    .any(|spelling| label.same_as(&NameForms::new(spelling)))
            })
            .and_then(|spellings| spellings.first().map(String::as_str))
    }

    /// Iterates over display names in normalised order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .values()
            .filter_map(|spellings| spellings.first().map(String::as_str))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for FoodSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

/// How one rule's bound fared in the merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ContributionOutcome {
    /// The rule's limit is the merged limit on at least one side.
    Binding,
    /// The rule's limits were applied but a tighter rule superseded them.
    Overridden,
    /// One side of the rule's bound was dropped to resolve a conflict.
    Discarded(BoundSide),
}

/// One rule's contribution to a merged nutrient bound.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundContribution {
    /// The contributing condition.
    pub condition: ConditionCode,
    /// The contributing rule's priority.
    pub priority: Priority,
    /// The bound as authored in the rule.
    pub bound: Bound,
    /// What happened to it.
    pub outcome: ContributionOutcome,
}

/// Explains where a merged nutrient bound came from.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NutrientSource {
    /// Every contribution, ordered by condition code.
    pub contributions: Vec<BoundContribution>,
    /// True if rules conflicted and a side was discarded.
    pub conflict_resolved: bool,
}

impl NutrientSource {
    /// Returns the codes of every contributing condition.
    pub fn conditions(&self) -> impl Iterator<Item = &ConditionCode> + '_ {
        self.contributions.iter().map(|c| &c.condition)
    }

    /// Returns the highest priority among contributors.
    pub fn max_priority(&self) -> Option<Priority> {
        self.contributions.iter().map(|c| c.priority).max()
    }

    /// Returns the contribution of a condition, if it contributed.
    pub fn contribution(&self, condition: &ConditionCode) -> Option<&BoundContribution> {
        self.contributions.iter().find(|c| &c.condition == condition)
    }
}

/// The merged constraints of all a user's active conditions.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectiveConstraintSet {
    /// One merged bound per constrained nutrient.
    pub bounds: BTreeMap<NutrientKey, Bound>,
    /// Union of every rule's avoid list.
    pub avoid: FoodSet,
    /// Union of every rule's recommend list, minus anything avoided.
    pub recommend: FoodSet,
    /// Union of every rule's avoided food categories.
    #[cfg_attr(feature = "serde", serde(default))]
    pub avoid_categories: FoodSet,
    /// Union of every rule's recommended food categories, minus avoided ones.
    #[cfg_attr(feature = "serde", serde(default))]
    pub recommend_categories: FoodSet,
    /// Provenance of each merged bound.
    pub source_breakdown: BTreeMap<NutrientKey, NutrientSource>,
    /// Guidance notes of every rule, deduplicated, ordered by condition code.
    pub guidance: Vec<String>,
    /// Codes of the merged conditions, sorted.
    pub conditions: Vec<ConditionCode>,
}

impl EffectiveConstraintSet {
    /// Returns the merged bound for a nutrient.
    pub fn bound(&self, key: NutrientKey) -> Option<&Bound> {
        self.bounds.get(&key)
    }

    /// Returns the provenance of a nutrient's bound.
    pub fn source(&self, key: NutrientKey) -> Option<&NutrientSource> {
        self.source_breakdown.get(&key)
    }

    /// Returns true if nothing is constrained: no bounds, no avoid entries,
    /// no avoided categories.
    pub fn is_unconstrained(&self) -> bool {
        self.bounds.is_empty() && self.avoid.is_empty() && self.avoid_categories.is_empty()
    }

    /// Returns true if any nutrient bound required conflict resolution.
    pub fn has_conflicts(&self) -> bool {
        self.source_breakdown.values().any(|s| s.conflict_resolved)
    }
}
