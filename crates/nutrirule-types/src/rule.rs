//! Condition rule type.
//!
//! A [`ConditionRule`] is one medical condition's dietary constraint
//! definition: per-nutrient bounds, foods to avoid, foods to recommend,
//! a priority, and free-text guidance notes. Rules are immutable; an edit
//! replaces the whole rule.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::bound::RawBound;
use crate::{Bound, NutrientKey, Priority, ValidationError};

/// Stable code identifying a condition (e.g. `diabetes_t2`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct ConditionCode(String);

impl ConditionCode {
    /// Creates a code, trimming surrounding whitespace.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyConditionCode`] for a blank code.
    pub fn new(code: impl AsRef<str>) -> Result<Self, ValidationError> {
        let code = code.as_ref().trim();
        if code.is_empty() {
            return Err(ValidationError::EmptyConditionCode);
        }
        Ok(Self(code.to_string()))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ConditionCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConditionCode> for String {
    fn from(code: ConditionCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for ConditionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an application user, as issued by the calling layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct UserId(pub String);

impl UserId {
    /// Creates a user id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who authored a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum RuleOwner {
    /// Curated seed data, visible to every user.
    #[default]
    Curated,
    /// A user-authored rule, visible only to its owner.
    Custom(UserId),
}

/// A condition's dietary constraint definition.
///
/// Build one through [`ConditionRuleDraft`], which validates every bound
/// and rejects unknown nutrient keys.
///
/// # Examples
///
/// ```
/// use nutrirule_types::{ConditionRule, ConditionRuleDraft, NutrientKey, Priority, RawBound};
///
/// let rule = ConditionRule::try_from(ConditionRuleDraft {
///     code: "hypertension".into(),
///     name: "Huyết áp cao".into(),
///     priority: Priority::High,
///     bounds: [("sodium_mg".to_string(), RawBound { min: None, max: Some(600.0) })]
///         .into_iter()
///         .collect(),
///     avoid: vec!["mắm tôm".into()],
///     ..Default::default()
/// })
/// .unwrap();
///
/// assert_eq!(rule.code().as_str(), "hypertension");
/// assert_eq!(rule.bound(NutrientKey::SodiumMg).unwrap().max(), Some(600.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "ConditionRuleDraft", into = "ConditionRuleDraft")
)]
pub struct ConditionRule {
    code: ConditionCode,
    name: String,
    priority: Priority,
    bounds: BTreeMap<NutrientKey, Bound>,
    avoid: Vec<String>,
    recommend: Vec<String>,
    avoid_categories: Vec<String>,
    recommend_categories: Vec<String>,
    notes: Vec<String>,
    owner: RuleOwner,
}

impl ConditionRule {
    /// Returns the condition code.
    pub fn code(&self) -> &ConditionCode {
        &self.code
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the priority.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the bound for a nutrient, if the rule constrains it.
    pub fn bound(&self, key: NutrientKey) -> Option<&Bound> {
        self.bounds.get(&key)
    }

    /// Returns all bounds in canonical nutrient order.
    pub fn bounds(&self) -> &BTreeMap<NutrientKey, Bound> {
        &self.bounds
    }

    /// Returns the avoid list as authored.
    pub fn avoid(&self) -> &[String] {
        &self.avoid
    }

    /// Returns the recommend list as authored.
    pub fn recommend(&self) -> &[String] {
        &self.recommend
    }

    /// Returns the avoided food categories as authored.
    pub fn avoid_categories(&self) -> &[String] {
        &self.avoid_categories
    }

    /// Returns the recommended food categories as authored.
    pub fn recommend_categories(&self) -> &[String] {
        &self.recommend_categories
    }

    /// Returns the guidance notes, deduplicated, in authored order.
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Returns the rule's owner.
    pub fn owner(&self) -> &RuleOwner {
        &self.owner
    }

    /// Returns true if this is a user-authored rule.
    pub fn is_custom(&self) -> bool {
        matches!(self.owner, RuleOwner::Custom(_))
    }

    /// Re-issues this rule as a custom rule owned by `user`.
    pub fn into_custom(self, user: UserId) -> Self {
        Self {
            owner: RuleOwner::Custom(user),
            ..self
        }
    }

    /// Returns a digest of the rule's full content.
    ///
    /// Two rules with the same code but different bounds, lists or notes
    /// produce different digests, so the digest can key derived data.
    pub fn content_digest(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.code.hash(&mut hasher);
        self.name.hash(&mut hasher);
        self.priority.hash(&mut hasher);
        for (key, bound) in &self.bounds {
            key.hash(&mut hasher);
            bound.min().map(f64::to_bits).hash(&mut hasher);
            bound.max().map(f64::to_bits).hash(&mut hasher);
        }
        self.avoid.hash(&mut hasher);
        self.recommend.hash(&mut hasher);
        self.avoid_categories.hash(&mut hasher);
        self.recommend_categories.hash(&mut hasher);
        self.notes.hash(&mut hasher);
        self.owner.hash(&mut hasher);
        hasher.finish()
    }
}

/// Unvalidated form of a [`ConditionRule`], as authored in seed data or
/// submitted as a custom rule.
///
/// Bounds are keyed by raw nutrient names so that an unknown key surfaces
/// as [`ValidationError::UnknownNutrientKey`] during conversion.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConditionRuleDraft {
    /// Stable condition code.
    pub code: String,
    /// Display name; defaults to the code when empty.
    pub name: String,
    /// Rule priority.
    pub priority: Priority,
    /// Bounds keyed by nutrient name.
    pub bounds: BTreeMap<String, RawBound>,
    /// Foods to avoid.
    pub avoid: Vec<String>,
    /// Foods to recommend.
    pub recommend: Vec<String>,
    /// Food categories to avoid, such as "đồ chiên".
    pub avoid_categories: Vec<String>,
    /// Food categories to recommend.
    pub recommend_categories: Vec<String>,
    /// Guidance notes.
    pub notes: Vec<String>,
    /// Owning user for custom rules.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub owner: Option<UserId>,
}

impl TryFrom<ConditionRuleDraft> for ConditionRule {
    type Error = ValidationError;

    fn try_from(draft: ConditionRuleDraft) -> Result<Self, Self::Error> {
        let code = ConditionCode::new(&draft.code)?;

        let mut bounds = BTreeMap::new();
        for (key, raw) in draft.bounds {
            let key: NutrientKey = key.parse()?;
            bounds.insert(key, Bound::try_from(raw)?);
        }

        let name = match draft.name.trim() {
            "" => code.as_str().to_string(),
            name => name.to_string(),
        };

        Ok(Self {
            code,
            name,
            priority: draft.priority,
            bounds,
            avoid: clean_entries(draft.avoid),
            recommend: clean_entries(draft.recommend),
            avoid_categories: clean_entries(draft.avoid_categories),
            recommend_categories: clean_entries(draft.recommend_categories),
            notes: clean_entries(draft.notes),
            owner: draft.owner.map(RuleOwner::Custom).unwrap_or_default(),
        })
    }
}

impl From<ConditionRule> for ConditionRuleDraft {
    fn from(rule: ConditionRule) -> Self {
        Self {
            code: rule.code.into(),
            name: rule.name,
            priority: rule.priority,
            bounds: rule
                .bounds
                .into_iter()
                .map(|(k, b)| (k.as_str().to_string(), RawBound::from(b)))
                .collect(),
            avoid: rule.avoid,
            recommend: rule.recommend,
            avoid_categories: rule.avoid_categories,
            recommend_categories: rule.recommend_categories,
            notes: rule.notes,
            owner: match rule.owner {
                RuleOwner::Curated => None,
                RuleOwner::Custom(user) => Some(user),
            },
        }
    }
}

/// Trims entries, drops blanks and exact duplicates, keeps authored order.
fn clean_entries(entries: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries {
        let entry = entry.trim();
        if !entry.is_empty() && !out.iter().any(|e| e == entry) {
            out.push(entry.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ConditionRuleDraft {
        ConditionRuleDraft {
            code: " dyslipidemia ".into(),
            name: "Mỡ trong máu".into(),
            priority: Priority::Medium,
            bounds: [
                ("saturated_fat_g".to_string(), RawBound { min: None, max: Some(13.0) }),
                ("fiber".to_string(), RawBound { min: Some(25.0), max: None }),
            ]
            .into_iter()
            .collect(),
            avoid: vec!["ba chỉ lợn".into(), " ".into(), "ba chỉ lợn".into()],
            recommend: vec!["cá hồi".into()],
            avoid_categories: vec!["đồ chiên".into(), "".into()],
            recommend_categories: vec![],
            notes: vec!["Hạn chế mỡ động vật".into(), "Hạn chế mỡ động vật".into()],
            owner: None,
        }
    }

    #[test]
    fn test_condition_code_validation() {
        assert_eq!(ConditionCode::new("  gout ").unwrap().as_str(), "gout");
        assert_eq!(ConditionCode::new("  "), Err(ValidationError::EmptyConditionCode));
    }

    #[test]
    fn test_rule_from_draft() {
        let rule = ConditionRule::try_from(draft()).unwrap();
        assert_eq!(rule.code().as_str(), "dyslipidemia");
        assert_eq!(rule.name(), "Mỡ trong máu");
        assert_eq!(rule.bounds().len(), 2);
        assert_eq!(rule.bound(NutrientKey::FiberG).unwrap().min(), Some(25.0));
        assert_eq!(rule.avoid(), ["ba chỉ lợn".to_string()]);
        assert_eq!(rule.avoid_categories(), ["đồ chiên".to_string()]);
        assert_eq!(rule.notes().len(), 1);
        assert_eq!(rule.owner(), &RuleOwner::Curated);
    }

    #[test]
    fn test_unknown_nutrient_key_surfaces() {
        let mut d = draft();
        d.bounds.insert("trans_fat_mg".into(), RawBound { min: None, max: Some(1.0) });
        let err = ConditionRule::try_from(d).unwrap_err();
        assert_eq!(err, ValidationError::UnknownNutrientKey("trans_fat_mg".into()));
    }

    #[test]
    fn test_invalid_bound_rejected() {
        let mut d = draft();
        d.bounds.insert("sugar_g".into(), RawBound { min: Some(30.0), max: Some(10.0) });
        assert!(matches!(
            ConditionRule::try_from(d),
            Err(ValidationError::InvertedBound { .. })
        ));
    }

    #[test]
    fn test_name_defaults_to_code() {
        let mut d = draft();
        d.name = String::new();
        assert_eq!(ConditionRule::try_from(d).unwrap().name(), "dyslipidemia");
    }

    #[test]
    fn test_content_digest_tracks_content() {
        let a = ConditionRule::try_from(draft()).unwrap();
        let b = ConditionRule::try_from(draft()).unwrap();
        assert_eq!(a.content_digest(), b.content_digest());

        let mut d = draft();
        d.bounds.insert("sodium_mg".into(), RawBound { min: None, max: Some(1500.0) });
        let c = ConditionRule::try_from(d).unwrap();
        assert_ne!(a.content_digest(), c.content_digest());

        let mut d = draft();
        d.recommend_categories.push("canh".into());
        let with_category = ConditionRule::try_from(d).unwrap();
        assert_ne!(a.content_digest(), with_category.content_digest());

        let custom = a.clone().into_custom(UserId::new("u-1"));
        assert!(custom.is_custom());
        assert_ne!(a.content_digest(), custom.content_digest());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let rule = ConditionRule::try_from(draft()).unwrap();
        let json = serde_json::to_string(&rule).unwrap();
        let parsed: ConditionRule = serde_json::from_str(&json).unwrap();
        assert_eq!(rule, parsed);

        let bad = r#"{"code": "x", "bounds": {"vitamin_q": {"max": 1}}}"#;
        assert!(serde_json::from_str::<ConditionRule>(bad).is_err());
    }
}
