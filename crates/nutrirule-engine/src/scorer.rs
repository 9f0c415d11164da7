//! Suitability scoring.
//!
//! Scores a nutrient profile against an effective constraint set. Each
//! bounded nutrient the profile reports gets a penalty in `[0, cap]`
//! proportional to how far it lies outside its bound. The aggregate penalty
//! is the weighted mean over every evaluated nutrient, weighted by the
//! strongest priority that constrained it:
//!
//! ```text
//! penalty(max breach) = min((value - max) / max, cap)
//! penalty(min breach) = min((min - value) / min, cap)
//! score               = round(100 * (1 - Σ wᵢ·pᵢ / Σ wᵢ))
//! ```

use nutrirule_types::{
    BoundSide, Compliance, EffectiveConstraintSet, NutrientProfile, Priority, SuitabilityResult,
    Tier, Violation,
};

/// Lowest score of each tier above `avoid`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierThresholds {
    /// Minimum score for [`Tier::Safe`].
    pub safe: u8,
    /// Minimum score for [`Tier::Moderate`].
    pub moderate: u8,
    /// Minimum score for [`Tier::Caution`].
    pub caution: u8,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            safe: 80,
            moderate: 60,
            caution: 40,
        }
    }
}

impl TierThresholds {
    /// Maps a score to its tier.
    pub fn tier_for(&self, score: u8) -> Tier {
        if score >= self.safe {
            Tier::Safe
        } else if score >= self.moderate {
            Tier::Moderate
        } else if score >= self.caution {
            Tier::Caution
        } else {
            Tier::Avoid
        }
    }
}

/// Configuration for suitability scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Penalty weight per priority, indexed low, medium, high.
    pub priority_weights: [f64; 3],
    /// Largest penalty a single nutrient can incur.
    pub penalty_cap: f64,
    /// Score thresholds for each tier.
    pub tiers: TierThresholds,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            priority_weights: [
                Priority::Low.default_weight(),
                Priority::Medium.default_weight(),
                Priority::High.default_weight(),
            ],
            penalty_cap: 1.0,
            tiers: TierThresholds::default(),
        }
    }
}

impl ScoringConfig {
    /// Returns the penalty weight of a priority.
    pub fn weight(&self, priority: Priority) -> f64 {
        self.priority_weights[priority.index()]
    }
}

/// Scores foods and meals against a constraint set.
#[derive(Debug, Clone, Default)]
pub struct SuitabilityScorer {
    config: ScoringConfig,
}

impl SuitabilityScorer {
    /// Creates a scorer with the given configuration.
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Returns the scorer's configuration.
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores a profile named `name` against `constraints`.
    ///
    /// A bounded nutrient the profile does not report is listed in
    /// `skipped` and not penalised. A name matching an avoid entry forces
    /// the tier to [`Tier::Avoid`] but leaves the score as computed.
    pub fn score(
        &self,
        profile: &NutrientProfile,
        name: &str,
        constraints: &EffectiveConstraintSet,
    ) -> SuitabilityResult {
        self.score_in_category(profile, name, None, constraints)
    }

    /// Scores a profile like [`score`](Self::score), also checking the
    /// food's category against the avoided and recommended categories.
    ///
    /// An avoided category forces [`Tier::Avoid`] the same way an avoid
    /// entry does. The category is compared as a whole label.
    pub fn score_in_category(
        &self,
        profile: &NutrientProfile,
        name: &str,
        category: Option<&str>,
        constraints: &EffectiveConstraintSet,
    ) -> SuitabilityResult {
        let matched_avoid: Vec<String> = constraints
            .avoid
            .matches(name)
            .into_iter()
            .map(str::to_string)
            .collect();
        let flagged_by_name = !matched_avoid.is_empty();
        let matched_avoid_category = category
            .and_then(|c| constraints.avoid_categories.find(c))
            .map(str::to_string);
        let flagged = flagged_by_name || matched_avoid_category.is_some();
        let recommended_by_name = !flagged && !constraints.recommend.matches(name).is_empty();
        let recommended_by_category = !flagged
            && category.is_some_and(|c| constraints.recommend_categories.find(c).is_some());

        let mut violations = Vec::new();
        let mut compliances = Vec::new();
        let mut skipped = Vec::new();
        let mut weighted_penalty = 0.0;
        let mut total_weight = 0.0;

        for (&nutrient, bound) in &constraints.bounds {
            let Some(actual) = profile.get(nutrient) else {
                skipped.push(nutrient);
                continue;
            };

            let weight = constraints
                .source(nutrient)
                .and_then(|s| s.max_priority())
                .map_or(self.config.weight(Priority::Low), |p| self.config.weight(p));
            total_weight += weight;

            match bound.breached_side(actual) {
                Some(side) => {
                    // breached_side only reports a side that is set
                    let limit = bound.side(side).unwrap_or_default();
                    let penalty = self.penalty(side, actual, limit);
                    weighted_penalty += weight * penalty;
                    violations.push(Violation {
                        nutrient,
                        actual,
                        side,
                        limit,
                        bound: *bound,
                        penalty,
                        weight,
                    });
                }
                None => compliances.push(Compliance {
                    nutrient,
                    actual,
                    bound: *bound,
                }),
            }
        }

        let aggregate = if total_weight > 0.0 {
            weighted_penalty / total_weight
        } else {
            0.0
        };
        let score = (100.0 * (1.0 - aggregate)).round().clamp(0.0, 100.0) as u8;

        let tier = if flagged {
            Tier::Avoid
        } else {
            self.config.tiers.tier_for(score)
        };

        tracing::debug!(
            name,
            score,
            tier = %tier,
            violations = violations.len(),
            skipped = skipped.len(),
            flagged_by_name,
            category,
            "scored profile"
        );

        SuitabilityResult {
            name: name.to_string(),
            score,
            tier,
            violations,
            compliances,
            skipped,
            flagged_by_name,
            matched_avoid,
            recommended_by_name,
            category: category.map(str::to_string),
            matched_avoid_category,
            recommended_by_category,
            empty_evaluation: profile.is_empty(),
            guidance: constraints.guidance.clone(),
        }
    }

    /// Penalty for a value breaching `limit` on `side`.
    fn penalty(&self, side: BoundSide, actual: f64, limit: f64) -> f64 {
        let cap = self.config.penalty_cap;
        let relative = match side {
            BoundSide::Max if limit > 0.0 => (actual - limit) / limit,
            BoundSide::Min if limit > 0.0 => (limit - actual) / limit,
            // Any amount breaches a zero limit.
            _ => cap,
        };
        relative.clamp(0.0, cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleMerger;
    use nutrirule_types::{ConditionRule, ConditionRuleDraft, NutrientKey, RawBound};

    fn rule(
        code: &str,
        priority: Priority,
        bounds: &[(&str, Option<f64>, Option<f64>)],
        avoid: &[&str],
    ) -> ConditionRule {
        ConditionRule::try_from(ConditionRuleDraft {
            code: code.into(),
            priority,
            bounds: bounds
                .iter()
                .map(|(k, min, max)| (k.to_string(), RawBound { min: *min, max: *max }))
                .collect(),
            avoid: avoid.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        })
        .unwrap()
    }

    fn profile(values: &[(NutrientKey, f64)]) -> NutrientProfile {
        NutrientProfile::from_values(values.iter().copied()).unwrap()
    }

    #[test]
    fn test_tier_thresholds() {
        let tiers = TierThresholds::default();
        assert_eq!(tiers.tier_for(100), Tier::Safe);
        assert_eq!(tiers.tier_for(80), Tier::Safe);
        assert_eq!(tiers.tier_for(79), Tier::Moderate);
        assert_eq!(tiers.tier_for(60), Tier::Moderate);
        assert_eq!(tiers.tier_for(59), Tier::Caution);
        assert_eq!(tiers.tier_for(40), Tier::Caution);
        assert_eq!(tiers.tier_for(39), Tier::Avoid);
        assert_eq!(tiers.tier_for(0), Tier::Avoid);
    }

    #[test]
    fn test_default_weights() {
        let config = ScoringConfig::default();
        assert_eq!(config.weight(Priority::Low), 1.0);
        assert_eq!(config.weight(Priority::Medium), 2.0);
        assert_eq!(config.weight(Priority::High), 3.0);
    }

    #[test]
    fn test_no_constraints_scores_full() {
        let result = SuitabilityScorer::default().score(
            &profile(&[(NutrientKey::SodiumMg, 5000.0)]),
            "mì tôm",
            &EffectiveConstraintSet::default(),
        );
        assert_eq!(result.score, 100);
        assert_eq!(result.tier, Tier::Safe);
        assert!(result.violations.is_empty());
        assert!(!result.empty_evaluation);
    }

    #[test]
    fn test_sodium_example() {
        let a = rule("a", Priority::Medium, &[("sodium_mg", None, Some(400.0))], &[]);
        let b = rule("b", Priority::High, &[("sodium_mg", None, Some(600.0))], &[]);
        let set = RuleMerger::new().merge([&a, &b]);

        let result = SuitabilityScorer::default().score(
            &profile(&[(NutrientKey::SodiumMg, 800.0)]),
            "canh chua",
            &set,
        );

        assert_eq!(result.violations.len(), 1);
        let violation = result.violation(NutrientKey::SodiumMg).unwrap();
        assert_eq!(violation.actual, 800.0);
        assert_eq!(violation.limit, 400.0);
        assert_eq!(violation.side, BoundSide::Max);
        assert_eq!(violation.weight, 3.0);
        assert!(result.score < 40);
        assert_eq!(result.tier, Tier::Avoid);
    }

    #[test]
    fn test_avoid_name_overrides_compliant_profile() {
        let lipids = rule(
            "dyslipidemia",
            Priority::Medium,
            &[("saturated_fat_g", None, Some(13.0))],
            &["ba chỉ lợn"],
        );
        let set = RuleMerger::new().merge([&lipids]);

        let result = SuitabilityScorer::default().score(
            &profile(&[(NutrientKey::SaturatedFatG, 2.0)]),
            "ba chỉ lợn",
            &set,
        );

        assert_eq!(result.score, 100);
        assert_eq!(result.tier, Tier::Avoid);
        assert!(result.flagged_by_name);
        assert_eq!(result.matched_avoid, vec!["ba chỉ lợn".to_string()]);
        assert!(result.is_compliant());
    }

    #[test]
    fn test_name_match_is_normalised_word_run() {
        let rule = rule("gout", Priority::High, &[], &["Nội tạng"]);
        let set = RuleMerger::new().merge([&rule]);
        let scorer = SuitabilityScorer::default();

        assert!(scorer.score(&NutrientProfile::default(), "noi tang lon xao", &set).flagged_by_name);
        assert!(!scorer.score(&NutrientProfile::default(), "nội", &set).flagged_by_name);
    }

    #[test]
    fn test_avoid_entries_do_not_match_word_fragments() {
        let rule = rule("gout", Priority::High, &[], &["gà", "cá"]);
        let set = RuleMerger::new().merge([&rule]);
        let scorer = SuitabilityScorer::default();

        for name in ["gạo lứt", "cà chua", "rau cải"] {
            let result = scorer.score(&NutrientProfile::default(), name, &set);
            assert!(!result.flagged_by_name, "{name} flagged by {:?}", result.matched_avoid);
            assert_eq!(result.tier, Tier::Safe);
        }

        let result = scorer.score(&NutrientProfile::default(), "cá kho tộ", &set);
        assert_eq!(result.matched_avoid, vec!["cá".to_string()]);
        assert_eq!(result.tier, Tier::Avoid);
    }

    #[test]
    fn test_avoided_category_forces_avoid() {
        let r = ConditionRule::try_from(ConditionRuleDraft {
            code: "dyslipidemia".into(),
            bounds: [("fat_g".to_string(), RawBound { min: None, max: Some(20.0) })]
                .into_iter()
                .collect(),
            avoid_categories: vec!["đồ chiên".into()],
            recommend_categories: vec!["canh".into()],
            ..Default::default()
        })
        .unwrap();
        let set = RuleMerger::new().merge([&r]);
        let scorer = SuitabilityScorer::default();
        let lean = profile(&[(NutrientKey::FatG, 8.0)]);

        let fried = scorer.score_in_category(&lean, "đậu phụ", Some("Đồ chiên"), &set);
        assert_eq!(fried.matched_avoid_category.as_deref(), Some("đồ chiên"));
        assert!(fried.flagged_by_category());
        assert!(!fried.flagged_by_name);
        assert_eq!(fried.score, 100);
        assert_eq!(fried.tier, Tier::Avoid);

        let soup = scorer.score_in_category(&lean, "canh bí", Some("canh"), &set);
        assert!(soup.recommended_by_category);
        assert_eq!(soup.tier, Tier::Safe);

        // Categories are whole labels, and no category means no category check.
        let fried_rice = scorer.score_in_category(&lean, "cơm", Some("đồ chiên giòn"), &set);
        assert!(!fried_rice.flagged_by_category());
        let plain = scorer.score(&lean, "đồ chiên", &set);
        assert!(!plain.flagged_by_category());
        assert_eq!(plain.category, None);
    }

    #[test]
    fn test_recommended_by_name() {
        let r = ConditionRule::try_from(ConditionRuleDraft {
            code: "diabetes_t2".into(),
            recommend: vec!["rau luộc".into()],
            ..Default::default()
        })
        .unwrap();
        let set = RuleMerger::new().merge([&r]);

        let result = SuitabilityScorer::default().score(&NutrientProfile::default(), "Rau luộc", &set);
        assert!(result.recommended_by_name);
        assert!(!result.flagged_by_name);
    }

    #[test]
    fn test_missing_nutrient_is_skipped() {
        let r = rule("lipids", Priority::Medium, &[("fiber_g", Some(25.0), None)], &[]);
        let set = RuleMerger::new().merge([&r]);

        let result = SuitabilityScorer::default().score(
            &profile(&[(NutrientKey::SodiumMg, 100.0)]),
            "cơm trắng",
            &set,
        );
        assert_eq!(result.skipped, vec![NutrientKey::FiberG]);
        assert!(result.violations.is_empty());
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_empty_profile_flagged() {
        let r = rule("lipids", Priority::Medium, &[("fiber_g", Some(25.0), None)], &[]);
        let set = RuleMerger::new().merge([&r]);

        let result = SuitabilityScorer::default().score(&NutrientProfile::default(), "?", &set);
        assert!(result.empty_evaluation);
        assert_eq!(result.score, 100);
        assert_eq!(result.tier, Tier::Safe);
    }

    #[test]
    fn test_weighted_average_over_evaluated_nutrients() {
        // Sugar (high, weight 3) is 50% over; fat (low, weight 1) is compliant.
        let a = rule("a", Priority::High, &[("sugar_g", None, Some(20.0))], &[]);
        let b = rule("b", Priority::Low, &[("fat_g", None, Some(30.0))], &[]);
        let set = RuleMerger::new().merge([&a, &b]);

        let result = SuitabilityScorer::default().score(
            &profile(&[(NutrientKey::SugarG, 30.0), (NutrientKey::FatG, 10.0)]),
            "chè",
            &set,
        );
        // 100 * (1 - (3 * 0.5 + 1 * 0) / 4) = 62.5, rounded away from zero
        assert_eq!(result.score, 63);
        assert_eq!(result.tier, Tier::Moderate);
        assert_eq!(result.compliances.len(), 1);
    }

    #[test]
    fn test_min_breach_penalty() {
        let r = rule("a", Priority::Medium, &[("fiber_g", Some(20.0), None)], &[]);
        let set = RuleMerger::new().merge([&r]);

        let result = SuitabilityScorer::default().score(
            &profile(&[(NutrientKey::FiberG, 15.0)]),
            "bánh mì",
            &set,
        );
        let violation = result.violation(NutrientKey::FiberG).unwrap();
        assert_eq!(violation.side, BoundSide::Min);
        assert_eq!(violation.penalty, 0.25);
        assert_eq!(result.score, 75);
    }

    #[test]
    fn test_zero_max_breach_is_full_penalty() {
        let r = rule("pku", Priority::High, &[("protein_g", None, Some(0.0))], &[]);
        let set = RuleMerger::new().merge([&r]);

        let result = SuitabilityScorer::default().score(
            &profile(&[(NutrientKey::ProteinG, 0.5)]),
            "sữa",
            &set,
        );
        assert_eq!(result.violation(NutrientKey::ProteinG).unwrap().penalty, 1.0);
        assert_eq!(result.score, 0);
    }
}
