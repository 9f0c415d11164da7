//! Rule merging.
//!
//! Combines a user's condition rules into one [`EffectiveConstraintSet`].
//! Bounds on the same nutrient are intersected. When the intersection is
//! empty, the side from the higher-priority rule is kept; between rules of
//! equal priority the upper limit is kept. Every dropped side is recorded
//! in the source breakdown.

use std::collections::BTreeMap;

use nutrirule_types::{
    Bound, BoundContribution, BoundSide, ConditionCode, ConditionRule, ContributionOutcome,
    EffectiveConstraintSet, NutrientKey, NutrientSource, Priority,
};

/// Priorities from strongest to weakest.
const PRIORITY_ORDER: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

/// Merges condition rules into an effective constraint set.
///
/// The merge is order-independent: rules are put into a canonical order
/// (by condition code) before any bound is combined.
///
/// # Examples
///
/// ```
/// use nutrirule_engine::RuleMerger;
/// use nutrirule_types::{ConditionRule, ConditionRuleDraft, NutrientKey, Priority, RawBound};
///
/// let rule = |code: &str, priority, max| {
///     ConditionRule::try_from(ConditionRuleDraft {
///         code: code.into(),
///         priority,
///         bounds: [("sodium_mg".to_string(), RawBound { min: None, max: Some(max) })]
///             .into_iter()
///             .collect(),
///         ..Default::default()
///     })
///     .unwrap()
/// };
///
/// let rules = [rule("a", Priority::Medium, 400.0), rule("b", Priority::High, 600.0)];
/// let set = RuleMerger::new().merge(&rules);
/// assert_eq!(set.bound(NutrientKey::SodiumMg).unwrap().max(), Some(400.0));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleMerger;

/// One rule's bound on the nutrient being merged.
struct Candidate<'a> {
    condition: &'a ConditionCode,
    priority: Priority,
    bound: Bound,
}

impl RuleMerger {
    /// Creates a merger.
    pub fn new() -> Self {
        Self
    }

    /// Merges rules into an effective constraint set.
    ///
    /// Zero rules yield an unconstrained set. A rule code given more than
    /// once is merged once.
    pub fn merge<'a, I>(&self, rules: I) -> EffectiveConstraintSet
    where
        I: IntoIterator<Item = &'a ConditionRule>,
    {
        let rules = canonical_order(rules);
        let mut set = EffectiveConstraintSet::default();
        let mut candidates: BTreeMap<NutrientKey, Vec<Candidate<'_>>> = BTreeMap::new();

        for rule in &rules {
            for (key, bound) in rule.bounds() {
                candidates.entry(*key).or_default().push(Candidate {
                    condition: rule.code(),
                    priority: rule.priority(),
                    bound: *bound,
                });
            }
            for food in rule.avoid() {
                set.avoid.insert(food);
            }
            for food in rule.recommend() {
                set.recommend.insert(food);
            }
            for category in rule.avoid_categories() {
                set.avoid_categories.insert(category);
            }
            for category in rule.recommend_categories() {
                set.recommend_categories.insert(category);
            }
            for note in rule.notes() {
                if !set.guidance.contains(note) {
                    set.guidance.push(note.clone());
                }
            }
            set.conditions.push(rule.code().clone());
        }

        // Avoid always wins over recommend.
        set.recommend.remove_all(&set.avoid);
        set.recommend_categories.remove_all(&set.avoid_categories);

        for (key, group) in candidates {
            if let Some((bound, source)) = merge_nutrient(key, &group) {
                set.bounds.insert(key, bound);
                set.source_breakdown.insert(key, source);
            }
        }

        tracing::debug!(
            conditions = set.conditions.len(),
            bounds = set.bounds.len(),
            avoid = set.avoid.len(),
            recommend = set.recommend.len(),
            avoid_categories = set.avoid_categories.len(),
            "merged condition rules"
        );

        set
    }
}

/// Sorts rules by code and drops repeated codes.
///
/// Rules sharing a code are ordered by content digest so the survivor does
/// not depend on input order.
fn canonical_order<'a, I>(rules: I) -> Vec<&'a ConditionRule>
where
    I: IntoIterator<Item = &'a ConditionRule>,
{
    let mut rules: Vec<&ConditionRule> = rules.into_iter().collect();
    rules.sort_by(|a, b| {
        a.code()
            .cmp(b.code())
            .then_with(|| a.content_digest().cmp(&b.content_digest()))
    });
    rules.dedup_by(|b, a| a.code() == b.code());
    rules
}

/// Merges every candidate bound on one nutrient.
///
/// Candidates are processed one priority level at a time, strongest first.
/// A side that contradicts the limits already fixed by stronger rules is
/// discarded. Within one level, a lower limit that exceeds the level's
/// upper limit is discarded.
fn merge_nutrient(key: NutrientKey, candidates: &[Candidate<'_>]) -> Option<(Bound, NutrientSource)> {
    let mut lo: Option<f64> = None;
    let mut hi: Option<f64> = None;
    let mut discarded: Vec<Option<BoundSide>> = vec![None; candidates.len()];

    for priority in PRIORITY_ORDER {
        let level: Vec<usize> = (0..candidates.len())
            .filter(|&i| candidates[i].priority == priority)
            .collect();
        if level.is_empty() {
            continue;
        }

        for &i in &level {
            let bound = &candidates[i].bound;
            if exceeds(bound.min(), hi) {
                discarded[i] = Some(BoundSide::Min);
            } else if exceeds(lo, bound.max()) {
                discarded[i] = Some(BoundSide::Max);
            }
        }

        let level_hi = level
            .iter()
            .filter(|&&i| discarded[i] != Some(BoundSide::Max))
            .filter_map(|&i| candidates[i].bound.max())
            .fold(hi, |acc, v| Some(acc.map_or(v, |a| a.min(v))));

        for &i in &level {
            if discarded[i].is_none() && exceeds(candidates[i].bound.min(), level_hi) {
                discarded[i] = Some(BoundSide::Min);
            }
        }

        hi = level_hi;
        lo = level
            .iter()
            .filter(|&&i| discarded[i] != Some(BoundSide::Min))
            .filter_map(|&i| candidates[i].bound.min())
            .fold(lo, |acc, v| Some(acc.map_or(v, |a| a.max(v))));
    }

    let bound = match Bound::new(lo, hi) {
        Ok(bound) => bound,
        Err(e) => {
            tracing::warn!(nutrient = %key, error = %e, "merged bound failed validation");
            return None;
        }
    };

    let conflict_resolved = discarded.iter().any(Option::is_some);
    if conflict_resolved {
        tracing::info!(
            nutrient = %key,
            merged = %bound,
            "resolved conflicting bounds"
        );
    }

    let contributions = candidates
        .iter()
        .zip(&discarded)
        .map(|(candidate, dropped)| {
            let outcome = match dropped {
                Some(side) => ContributionOutcome::Discarded(*side),
                None if binds(candidate.bound.min(), lo) || binds(candidate.bound.max(), hi) => {
                    ContributionOutcome::Binding
                }
                None => ContributionOutcome::Overridden,
            };
            BoundContribution {
                condition: candidate.condition.clone(),
                priority: candidate.priority,
                bound: candidate.bound,
                outcome,
            }
        })
        .collect();

    Some((
        bound,
        NutrientSource {
            contributions,
            conflict_resolved,
        },
    ))
}

/// Returns true if both limits are set and `lower > upper`.
fn exceeds(lower: Option<f64>, upper: Option<f64>) -> bool {
    matches!((lower, upper), (Some(lo), Some(hi)) if lo > hi)
}

fn binds(limit: Option<f64>, merged: Option<f64>) -> bool {
    limit.is_some() && limit == merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutrirule_types::{ConditionRuleDraft, RawBound};

    fn rule(
        code: &str,
        priority: Priority,
        bounds: &[(&str, Option<f64>, Option<f64>)],
    ) -> ConditionRule {
        ConditionRule::try_from(ConditionRuleDraft {
            code: code.into(),
            priority,
            bounds: bounds
                .iter()
                .map(|(k, min, max)| (k.to_string(), RawBound { min: *min, max: *max }))
                .collect(),
            ..Default::default()
        })
        .unwrap()
    }

    fn code(s: &str) -> ConditionCode {
        ConditionCode::new(s).unwrap()
    }

    #[test]
    fn test_zero_rules_is_unconstrained() {
        let none: [ConditionRule; 0] = [];
        let set = RuleMerger::new().merge(&none);
        assert!(set.is_unconstrained());
        assert!(set.recommend.is_empty());
        assert!(set.conditions.is_empty());
    }

    #[test]
    fn test_tighter_max_wins() {
        let a = rule("a", Priority::Medium, &[("sodium_mg", None, Some(400.0))]);
        let b = rule("b", Priority::High, &[("sodium_mg", None, Some(600.0))]);

        let set = RuleMerger::new().merge([&b, &a]);
        assert_eq!(set.bound(NutrientKey::SodiumMg).unwrap().max(), Some(400.0));

        let source = set.source(NutrientKey::SodiumMg).unwrap();
        assert!(!source.conflict_resolved);
        let outcomes: Vec<_> = source
            .contributions
            .iter()
            .map(|c| (c.condition.as_str(), c.outcome))
            .collect();
        assert_eq!(
            outcomes,
            vec![
                ("a", ContributionOutcome::Binding),
                ("b", ContributionOutcome::Overridden),
            ]
        );
    }

    #[test]
    fn test_intersects_min_and_max() {
        let a = rule("a", Priority::Low, &[("fiber_g", Some(25.0), None)]);
        let b = rule("b", Priority::Medium, &[("fiber_g", Some(20.0), Some(40.0))]);

        let set = RuleMerger::new().merge([&a, &b]);
        let bound = set.bound(NutrientKey::FiberG).unwrap();
        assert_eq!(bound.min(), Some(25.0));
        assert_eq!(bound.max(), Some(40.0));

        let source = set.source(NutrientKey::FiberG).unwrap();
        assert_eq!(
            source.contribution(&code("a")).unwrap().outcome,
            ContributionOutcome::Binding
        );
        assert_eq!(
            source.contribution(&code("b")).unwrap().outcome,
            ContributionOutcome::Binding
        );
    }

    #[test]
    fn test_conflict_higher_priority_wins() {
        // Kidney disease caps protein; a low-priority rule asks for more.
        let kidney = rule("ckd", Priority::High, &[("protein_g", None, Some(40.0))]);
        let muscle = rule("sarcopenia", Priority::Low, &[("protein_g", Some(60.0), None)]);

        let set = RuleMerger::new().merge([&muscle, &kidney]);
        let bound = set.bound(NutrientKey::ProteinG).unwrap();
        assert_eq!(bound.min(), None);
        assert_eq!(bound.max(), Some(40.0));

        let source = set.source(NutrientKey::ProteinG).unwrap();
        assert!(source.conflict_resolved);
        assert!(set.has_conflicts());
        assert_eq!(
            source.contribution(&code("sarcopenia")).unwrap().outcome,
            ContributionOutcome::Discarded(BoundSide::Min)
        );
        assert_eq!(
            source.contribution(&code("ckd")).unwrap().outcome,
            ContributionOutcome::Binding
        );
    }

    #[test]
    fn test_conflict_higher_priority_min_wins() {
        let high = rule("a", Priority::High, &[("energy_kcal", Some(1800.0), None)]);
        let low = rule("b", Priority::Low, &[("energy_kcal", Some(1000.0), Some(1500.0))]);

        let set = RuleMerger::new().merge([&high, &low]);
        let bound = set.bound(NutrientKey::EnergyKcal).unwrap();
        assert_eq!(bound.min(), Some(1800.0));
        assert_eq!(bound.max(), None);
        assert_eq!(
            set.source(NutrientKey::EnergyKcal)
                .unwrap()
                .contribution(&code("b"))
                .unwrap()
                .outcome,
            ContributionOutcome::Discarded(BoundSide::Max)
        );
    }

    #[test]
    fn test_conflict_tie_keeps_upper_limit() {
        let a = rule("a", Priority::Medium, &[("carbohydrate_g", Some(200.0), None)]);
        let b = rule("b", Priority::Medium, &[("carbohydrate_g", None, Some(150.0))]);

        for order in [[&a, &b], [&b, &a]] {
            let set = RuleMerger::new().merge(order);
            let bound = set.bound(NutrientKey::CarbohydrateG).unwrap();
            assert_eq!(bound.min(), None);
            assert_eq!(bound.max(), Some(150.0));

            let source = set.source(NutrientKey::CarbohydrateG).unwrap();
            assert!(source.conflict_resolved);
            assert_eq!(
                source.contribution(&code("a")).unwrap().outcome,
                ContributionOutcome::Discarded(BoundSide::Min)
            );
        }
    }

    #[test]
    fn test_avoid_wins_over_recommend() {
        let a = ConditionRule::try_from(ConditionRuleDraft {
            code: "a".into(),
            recommend: vec!["Rau muống".into(), "cá hồi".into()],
            notes: vec!["Uống đủ nước".into()],
            ..Default::default()
        })
        .unwrap();
        let b = ConditionRule::try_from(ConditionRuleDraft {
            code: "b".into(),
            avoid: vec!["rau muong".into()],
            notes: vec!["Uống đủ nước".into(), "Ăn chậm".into()],
            ..Default::default()
        })
        .unwrap();

        let set = RuleMerger::new().merge([&b, &a]);
        assert!(set.avoid.contains("Rau muống"));
        assert!(!set.recommend.contains("Rau muống"));
        assert!(set.recommend.contains("cá hồi"));
        assert_eq!(set.guidance, vec!["Uống đủ nước".to_string(), "Ăn chậm".to_string()]);
        assert_eq!(set.conditions, vec![code("a"), code("b")]);
    }

    #[test]
    fn test_categories_union_and_avoid_wins() {
        let a = ConditionRule::try_from(ConditionRuleDraft {
            code: "diabetes_t2".into(),
            avoid_categories: vec!["bánh".into()],
            recommend_categories: vec!["canh".into(), "đồ chiên".into()],
            ..Default::default()
        })
        .unwrap();
        let b = ConditionRule::try_from(ConditionRuleDraft {
            code: "dyslipidemia".into(),
            avoid_categories: vec!["Đồ chiên".into()],
            ..Default::default()
        })
        .unwrap();

        let set = RuleMerger::new().merge([&b, &a]);
        assert_eq!(set.avoid_categories.iter().collect::<Vec<_>>(), vec!["bánh", "Đồ chiên"]);
        assert_eq!(set.recommend_categories.iter().collect::<Vec<_>>(), vec!["canh"]);
        assert!(!set.is_unconstrained());
    }

    #[test]
    fn test_repeated_rule_merged_once() {
        let a = rule("a", Priority::Medium, &[("sugar_g", None, Some(25.0))]);
        let set = RuleMerger::new().merge([&a, &a]);
        assert_eq!(set.conditions.len(), 1);
        assert_eq!(set.source(NutrientKey::SugarG).unwrap().contributions.len(), 1);
    }
}
