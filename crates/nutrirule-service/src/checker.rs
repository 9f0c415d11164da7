//! Request handling.

use nutrirule_engine::{EngineResult, FoodItem, NutritionEngine};
use nutrirule_loader::{ConditionRuleStore, LoadError, RuleStore};
use nutrirule_types::{ConditionRule, NutrientProfile, UserConditions};

use crate::dto::{Assessment, CheckRequest, CheckResponse, FoodRequest};

/// Evaluates check requests against a loaded rule store.
#[derive(Debug)]
pub struct Checker {
    store: RuleStore,
    engine: NutritionEngine,
}

impl Checker {
    /// Creates a checker.
    pub fn new(store: RuleStore, engine: NutritionEngine) -> Self {
        Self { store, engine }
    }

    /// Handles one request.
    ///
    /// The whole request is validated before anything is written: custom
    /// rules are stored for the user only once every draft, assignment and
    /// nutrient profile has been accepted and every assigned condition
    /// resolves. A failed request leaves the store and cache untouched.
    pub fn check(&mut self, request: CheckRequest) -> EngineResult<CheckResponse> {
        let custom_rules = request
            .custom_rules
            .into_iter()
            .map(ConditionRule::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut conditions = UserConditions::new(request.user.clone());
        for assigned in &request.conditions {
            conditions.assign(assigned.code.clone(), assigned.severity, assigned.diagnosed_on)?;
        }
        if let Some(primary) = request.conditions.iter().find(|c| c.primary) {
            conditions.set_primary(&primary.code)?;
        }

        let mut items = Vec::with_capacity(request.foods.len() + request.meals.len());
        for food in &request.foods {
            let item = FoodItem::new(food.name.clone(), portion_profile(food)?);
            items.push(match &food.category {
                Some(category) => item.in_category(category.clone()),
                None => item,
            });
        }
        for meal in &request.meals {
            let portions = meal
                .items
                .iter()
                .map(portion_profile)
                .collect::<EngineResult<Vec<_>>>()?;
            items.push(FoodItem::new(meal.name.clone(), NutrientProfile::combine(&portions)));
        }

        self.ensure_writable(&custom_rules, &conditions)?;
        for rule in custom_rules {
            self.engine
                .upsert_custom_rule(&mut self.store, rule, &request.user)?;
        }

        let constraints = self.engine.constraints_for_user(&self.store, &conditions)?;

        let assessments = self
            .engine
            .evaluate_batch(&constraints, &items)
            .into_iter()
            .map(|result| Assessment {
                advice: self.engine.advise(&result),
                result,
            })
            .collect();

        tracing::info!(
            user = %request.user,
            conditions = conditions.len(),
            evaluated = items.len(),
            "handled check request"
        );

        Ok(CheckResponse {
            user: request.user,
            primary: conditions.primary().cloned(),
            constraints: (*constraints).clone(),
            assessments,
        })
    }

    /// Fails if storing `custom_rules` would be rejected, or if an assigned
    /// condition would still have no rule once they are stored.
    fn ensure_writable(
        &self,
        custom_rules: &[ConditionRule],
        conditions: &UserConditions,
    ) -> EngineResult<()> {
        for rule in custom_rules {
            if self.store.get_rule(rule.code()).is_ok() {
                return Err(LoadError::ReservedCode {
                    code: rule.code().to_string(),
                }
                .into());
            }
        }
        for code in conditions.codes() {
            if !custom_rules.iter().any(|rule| rule.code() == code) {
                self.store.get_rule_for_user(code, conditions.user())?;
            }
        }
        Ok(())
    }
}

/// Builds the profile of one food, scaled to its portion if given.
fn portion_profile(food: &FoodRequest) -> EngineResult<NutrientProfile> {
    let per_100g = NutrientProfile::try_from(food.nutrients.clone())?;
    match food.portion_g {
        Some(grams) => Ok(per_100g.scaled(grams)?),
        None => Ok(per_100g),
    }
}
