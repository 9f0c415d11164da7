//! Advice composition.

use nutrirule_types::{
    AdjustmentDirection, AdjustmentSuggestion, BoundSide, Headline, NutrientWarning,
    StructuredAdvice, SuitabilityResult,
};

/// Turns a [`SuitabilityResult`] into [`StructuredAdvice`].
///
/// Pure and deterministic: one warning and one adjustment per violation,
/// guidance copied verbatim. No text is generated.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdviceComposer;

impl AdviceComposer {
    /// Creates a composer.
    pub fn new() -> Self {
        Self
    }

    /// Composes advice for a scored food or meal.
    pub fn compose(&self, result: &SuitabilityResult) -> StructuredAdvice {
        let headline = Headline {
            tier: result.tier,
            score: result.score,
            flagged_by_name: result.flagged_by_name,
            matched_avoid: result.matched_avoid.clone(),
            recommended_by_name: result.recommended_by_name,
            matched_avoid_category: result.matched_avoid_category.clone(),
            empty_evaluation: result.empty_evaluation,
        };

        let specific_warnings = result
            .violations
            .iter()
            .map(|v| NutrientWarning {
                nutrient: v.nutrient,
                actual: v.actual,
                side: v.side,
                limit: v.limit,
                unit: v.nutrient.unit(),
            })
            .collect();

        let adjustment_suggestions = result
            .violations
            .iter()
            .map(|v| AdjustmentSuggestion {
                nutrient: v.nutrient,
                direction: match v.side {
                    BoundSide::Max => AdjustmentDirection::Reduce,
                    BoundSide::Min => AdjustmentDirection::Increase,
                },
                amount: v.distance(),
                unit: v.nutrient.unit(),
            })
            .collect();

        let mut general_guidance: Vec<String> = Vec::with_capacity(result.guidance.len());
        for note in &result.guidance {
            if !general_guidance.contains(note) {
                general_guidance.push(note.clone());
            }
        }

        StructuredAdvice {
            headline,
            specific_warnings,
            adjustment_suggestions,
            general_guidance,
        }
    }
}
