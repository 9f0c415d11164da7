//! Request and response documents.

use std::collections::BTreeMap;

use nutrirule_types::{
    ConditionCode, ConditionRuleDraft, EffectiveConstraintSet, Severity, StructuredAdvice,
    SuitabilityResult, UserId,
};
use serde::{Deserialize, Serialize};

/// A check request: who is asking, what they have, and what to evaluate.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckRequest {
    /// The requesting user.
    pub user: UserId,
    /// The user's assigned conditions.
    #[serde(default)]
    pub conditions: Vec<AssignedCondition>,
    /// Custom rules to store for the user before evaluating.
    #[serde(default)]
    pub custom_rules: Vec<ConditionRuleDraft>,
    /// Single foods to evaluate.
    #[serde(default)]
    pub foods: Vec<FoodRequest>,
    /// Meals to evaluate as one aggregate each.
    #[serde(default)]
    pub meals: Vec<MealRequest>,
}

/// One condition assigned to the user.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignedCondition {
    /// Condition code.
    pub code: ConditionCode,
    /// Marks this condition as the primary one.
    #[serde(default)]
    pub primary: bool,
    /// Clinical severity.
    #[serde(default)]
    pub severity: Severity,
    /// Diagnosis date as YYYYMMDD.
    #[serde(default)]
    pub diagnosed_on: Option<u32>,
}

/// A food with its nutrient values.
#[derive(Debug, Clone, Deserialize)]
pub struct FoodRequest {
    /// Display name.
    pub name: String,
    /// Nutrient values per 100 g, keyed by nutrient name.
    pub nutrients: BTreeMap<String, f64>,
    /// Portion size in grams; values are used per 100 g when absent.
    #[serde(default)]
    pub portion_g: Option<f64>,
    /// Food category, checked against avoided and recommended categories.
    #[serde(default)]
    pub category: Option<String>,
}

/// A meal made of several portions.
#[derive(Debug, Clone, Deserialize)]
pub struct MealRequest {
    /// Display name.
    pub name: String,
    /// The meal's components.
    pub items: Vec<FoodRequest>,
}

/// The response to a [`CheckRequest`].
#[derive(Debug, Clone, Serialize)]
pub struct CheckResponse {
    /// The requesting user.
    pub user: UserId,
    /// The primary condition, if any condition is assigned.
    pub primary: Option<ConditionCode>,
    /// The merged constraints the evaluations used.
    pub constraints: EffectiveConstraintSet,
    /// One assessment per food, then one per meal, in request order.
    pub assessments: Vec<Assessment>,
}

/// A scored food or meal with its advice.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    /// The suitability result.
    pub result: SuitabilityResult,
    /// Advice derived from the result.
    pub advice: StructuredAdvice,
}
