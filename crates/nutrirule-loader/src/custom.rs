//! Custom rule ingestion.
//!
//! User-authored rules arrive as a JSON array of rule drafts. Each draft is
//! validated like seed data, so an unknown nutrient key or an inverted bound
//! is rejected before anything is stored.

use std::io::Read;

use nutrirule_types::{ConditionRule, ConditionRuleDraft, UserId};

use crate::types::{LoadError, LoadResult};

/// Parses a JSON array of rule drafts into custom rules owned by `owner`.
///
/// Any `owner` field inside the JSON is ignored.
///
/// # Errors
/// Returns [`LoadError::Json`] for malformed JSON and
/// [`LoadError::InvalidRule`] for the first draft that fails validation.
pub fn parse_custom_rules<R: Read>(reader: R, owner: &UserId) -> LoadResult<Vec<ConditionRule>> {
    let drafts: Vec<ConditionRuleDraft> = serde_json::from_reader(reader)?;

    drafts
        .into_iter()
        .map(|draft| {
            let code = draft.code.clone();
            ConditionRule::try_from(draft)
                .map(|rule| rule.into_custom(owner.clone()))
                .map_err(|source| LoadError::InvalidRule { code, source })
        })
        .collect()
}
