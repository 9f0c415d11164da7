//! Engine facade.
//!
//! Chains merge, scoring and advice for callers that hold either the rules
//! themselves or a rule store plus a user's condition assignments.

use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use nutrirule_loader::ConditionRuleStore;
use nutrirule_types::{
    ConditionRule, EffectiveConstraintSet, NutrientProfile, StructuredAdvice, SuitabilityResult,
    UserConditions, UserId,
};

use crate::advice::AdviceComposer;
use crate::cache::{ConstraintCache, DEFAULT_CACHE_CAPACITY};
use crate::error::EngineResult;
use crate::merger::RuleMerger;
use crate::scorer::{ScoringConfig, SuitabilityScorer};

/// Configuration for [`NutritionEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Scoring weights, cap and tier thresholds.
    pub scoring: ScoringConfig,
    /// Maximum number of cached constraint sets (0 disables the cache).
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// One food or meal to score in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodItem {
    /// Name matched against the avoid and recommend lists.
    pub name: String,
    /// Optional food category, such as "canh" or "đồ chiên".
    pub category: Option<String>,
    /// Nutrient values to score.
    pub profile: NutrientProfile,
}

impl FoodItem {
    /// Creates an uncategorised item.
    pub fn new(name: impl Into<String>, profile: NutrientProfile) -> Self {
        Self {
            name: name.into(),
            category: None,
            profile,
        }
    }

    /// Sets the item's category.
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Merges rules, scores foods and composes advice.
///
/// Every evaluation is independent; the engine can be shared across
/// threads. The only state is the constraint cache, which is invalidated
/// whenever a custom rule is written through the engine.
///
/// # Example
///
/// ```ignore
/// let engine = NutritionEngine::new(EngineConfig::default());
/// let result = engine.evaluate_for_user(&store, &conditions, &profile, "phở bò")?;
/// let advice = engine.advise(&result);
/// ```
#[derive(Debug, Default)]
pub struct NutritionEngine {
    merger: RuleMerger,
    scorer: SuitabilityScorer,
    composer: AdviceComposer,
    cache: ConstraintCache,
}

impl NutritionEngine {
    /// Creates an engine.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            merger: RuleMerger::new(),
            scorer: SuitabilityScorer::new(config.scoring),
            composer: AdviceComposer::new(),
            cache: ConstraintCache::new(config.cache_capacity),
        }
    }

    /// Merges rules into an effective constraint set, bypassing the cache.
    pub fn merge<'a, I>(&self, rules: I) -> EffectiveConstraintSet
    where
        I: IntoIterator<Item = &'a ConditionRule>,
    {
        self.merger.merge(rules)
    }

    /// Returns the cached constraint set for `rules`, merging on a miss.
    pub fn constraints<'a, I>(&self, rules: I) -> Arc<EffectiveConstraintSet>
    where
        I: IntoIterator<Item = &'a ConditionRule>,
    {
        let rules: Vec<&ConditionRule> = rules.into_iter().collect();
        self.cache.get_or_merge(&rules, &self.merger)
    }

    /// Scores a food or meal against the merged `rules`.
    pub fn evaluate<'a, I>(&self, profile: &NutrientProfile, name: &str, rules: I) -> SuitabilityResult
    where
        I: IntoIterator<Item = &'a ConditionRule>,
    {
        let constraints = self.constraints(rules);
        self.scorer.score(profile, name, &constraints)
    }

    /// Scores a food or meal against an already merged set.
    pub fn evaluate_with(
        &self,
        profile: &NutrientProfile,
        name: &str,
        constraints: &EffectiveConstraintSet,
    ) -> SuitabilityResult {
        self.scorer.score(profile, name, constraints)
    }

    /// Composes advice for a result.
    pub fn advise(&self, result: &SuitabilityResult) -> StructuredAdvice {
        self.composer.compose(result)
    }

    /// Resolves a user's conditions through `store` and merges them.
    ///
    /// # Errors
    /// Fails if any assigned condition has no rule visible to the user.
    pub fn constraints_for_user<S>(
        &self,
        store: &S,
        conditions: &UserConditions,
    ) -> EngineResult<Arc<EffectiveConstraintSet>>
    where
        S: ConditionRuleStore + ?Sized,
    {
        let rules = store.resolve_conditions(conditions)?;
        Ok(self.cache.get_or_merge(&rules, &self.merger))
    }

    /// Scores a food or meal for a user.
    ///
    /// # Errors
    /// Fails if any assigned condition has no rule visible to the user.
    pub fn evaluate_for_user<S>(
        &self,
        store: &S,
        conditions: &UserConditions,
        profile: &NutrientProfile,
        name: &str,
    ) -> EngineResult<SuitabilityResult>
    where
        S: ConditionRuleStore + ?Sized,
    {
        let constraints = self.constraints_for_user(store, conditions)?;
        Ok(self.scorer.score(profile, name, &constraints))
    }

    /// Scores many named profiles against one constraint set.
    ///
    /// Results are returned in input order.
    pub fn evaluate_batch(
        &self,
        constraints: &EffectiveConstraintSet,
        items: &[FoodItem],
    ) -> Vec<SuitabilityResult> {
        #[cfg(feature = "parallel")]
        let iter = items.par_iter();
        #[cfg(not(feature = "parallel"))]
        let iter = items.iter();

        iter.map(|item| {
            self.scorer.score_in_category(
                &item.profile,
                &item.name,
                item.category.as_deref(),
                constraints,
            )
        })
        .collect()
    }

    /// Writes a custom rule to `store` and drops cached sets that used it.
    ///
    /// # Errors
    /// Fails if the store rejects the rule.
    pub fn upsert_custom_rule<S>(
        &self,
        store: &mut S,
        rule: ConditionRule,
        owner: &UserId,
    ) -> EngineResult<Option<ConditionRule>>
    where
        S: ConditionRuleStore + ?Sized,
    {
        let code = rule.code().clone();
        let previous = store.upsert_custom_rule(rule, owner)?;
        self.cache.invalidate_condition(&code);
        Ok(previous)
    }

    /// Returns the constraint cache.
    pub fn cache(&self) -> &ConstraintCache {
        &self.cache
    }

    /// Returns the scoring configuration.
    pub fn scoring_config(&self) -> &ScoringConfig {
        self.scorer.config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutrirule_loader::{LoadError, RuleStore};
    use nutrirule_types::{
        ConditionCode, ConditionRuleDraft, NutrientKey, Priority, RawBound, Severity, Tier,
    };

    use crate::EngineError;

    fn rule(code: &str, priority: Priority, key: &str, max: f64, avoid: &[&str]) -> ConditionRule {
        ConditionRule::try_from(ConditionRuleDraft {
            code: code.into(),
            priority,
            bounds: [(key.to_string(), RawBound { min: None, max: Some(max) })]
                .into_iter()
                .collect(),
            avoid: avoid.iter().map(|s| s.to_string()).collect(),
            notes: vec![format!("note for {code}")],
            ..Default::default()
        })
        .unwrap()
    }

    fn store() -> RuleStore {
        let mut store = RuleStore::new();
        store.insert_curated(rule("hypertension", Priority::High, "sodium_mg", 600.0, &["mắm tôm"]));
        store.insert_curated(rule("diabetes_t2", Priority::Medium, "sugar_g", 25.0, &[]));
        store
    }

    fn code(s: &str) -> ConditionCode {
        ConditionCode::new(s).unwrap()
    }

    fn conditions(user: &str, codes: &[&str]) -> UserConditions {
        let mut conditions = UserConditions::new(UserId::new(user));
        for c in codes {
            conditions.assign(code(c), Severity::Moderate, None).unwrap();
        }
        conditions
    }

    fn profile(values: &[(NutrientKey, f64)]) -> NutrientProfile {
        NutrientProfile::from_values(values.iter().copied()).unwrap()
    }

    #[test]
    fn test_evaluate_with_no_rules() {
        let engine = NutritionEngine::default();
        let none: [ConditionRule; 0] = [];
        let result = engine.evaluate(&profile(&[(NutrientKey::SugarG, 90.0)]), "chè", &none);
        assert_eq!(result.score, 100);
        assert_eq!(result.tier, Tier::Safe);
    }

    #[test]
    fn test_evaluate_for_user() {
        let engine = NutritionEngine::new(EngineConfig::default());
        let store = store();
        let user = conditions("alice", &["hypertension", "diabetes_t2"]);

        let result = engine
            .evaluate_for_user(
                &store,
                &user,
                &profile(&[(NutrientKey::SodiumMg, 300.0), (NutrientKey::SugarG, 50.0)]),
                "bánh ngọt",
            )
            .unwrap();

        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].nutrient, NutrientKey::SugarG);
        assert_eq!(result.compliances.len(), 1);
        // Sugar (medium, weight 2) fully penalised, sodium (high, weight 3) clean.
        assert_eq!(result.score, 60);
        assert_eq!(result.guidance.len(), 2);
        assert_eq!(engine.cache().len(), 1);

        let advice = engine.advise(&result);
        assert_eq!(advice.specific_warnings.len(), 1);
        assert_eq!(advice.general_guidance.len(), 2);
    }

    #[test]
    fn test_unknown_condition_surfaces() {
        let engine = NutritionEngine::default();
        let user = conditions("alice", &["asthma"]);

        let err = engine
            .evaluate_for_user(&store(), &user, &NutrientProfile::default(), "x")
            .unwrap_err();
        assert!(matches!(err, EngineError::Load(LoadError::RuleNotFound { .. })));
    }

    #[test]
    fn test_custom_rule_upsert_invalidates_cache() {
        let engine = NutritionEngine::default();
        let mut store = store();
        let alice = UserId::new("alice");
        let user = conditions("alice", &["hypertension", "low_fat"]);
        let meal = profile(&[(NutrientKey::FatG, 30.0)]);

        engine
            .upsert_custom_rule(&mut store, rule("low_fat", Priority::Low, "fat_g", 40.0, &[]), &alice)
            .unwrap();
        let before = engine.evaluate_for_user(&store, &user, &meal, "gà rán").unwrap();
        assert!(before.is_compliant());
        assert_eq!(engine.cache().len(), 1);

        engine
            .upsert_custom_rule(&mut store, rule("low_fat", Priority::Low, "fat_g", 20.0, &[]), &alice)
            .unwrap();
        assert!(engine.cache().is_empty());

        let after = engine.evaluate_for_user(&store, &user, &meal, "gà rán").unwrap();
        assert_eq!(after.violations.len(), 1);

        // Another user never sees alice's rule.
        let bob = conditions("bob", &["low_fat"]);
        assert!(engine.evaluate_for_user(&store, &bob, &meal, "gà rán").is_err());
    }

    #[test]
    fn test_evaluate_batch_keeps_order() {
        let engine = NutritionEngine::default();
        let store = store();
        let constraints = engine
            .constraints_for_user(&store, &conditions("alice", &["hypertension"]))
            .unwrap();

        let items = vec![
            FoodItem::new("canh rau", profile(&[(NutrientKey::SodiumMg, 200.0)])),
            FoodItem::new("bún mắm tôm", profile(&[(NutrientKey::SodiumMg, 200.0)])),
            FoodItem::new("mì tôm", profile(&[(NutrientKey::SodiumMg, 1500.0)])),
        ];

        let results = engine.evaluate_batch(&constraints, &items);
        let tiers: Vec<_> = results.iter().map(|r| (r.name.as_str(), r.tier)).collect();
        assert_eq!(
            tiers,
            vec![
                ("canh rau", Tier::Safe),
                ("bún mắm tôm", Tier::Avoid),
                ("mì tôm", Tier::Avoid),
            ]
        );
    }

    #[test]
    fn test_evaluate_matches_pure_pipeline() {
        let engine = NutritionEngine::default();
        let rules = [
            rule("a", Priority::Medium, "sodium_mg", 400.0, &[]),
            rule("b", Priority::High, "sodium_mg", 600.0, &[]),
        ];
        let meal = profile(&[(NutrientKey::SodiumMg, 800.0)]);

        let cached = engine.evaluate(&meal, "meal", &rules);
        let direct = engine.evaluate_with(&meal, "meal", &engine.merge(&rules));
        assert_eq!(cached, direct);
    }
}
