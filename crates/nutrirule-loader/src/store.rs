//! In-memory condition rule store.
//!
//! Holds curated rules loaded from seed files alongside user-authored
//! custom rules. Custom rules are scoped to their owner: they are visible
//! only through the `*_for_user` lookups and never affect another user.
//!
//! ```ignore
//! let files = discover_rule_files("/path/to/seed")?;
//! let mut store = RuleStore::new();
//! let stats = store.load_all(&files, &LoaderConfig::default())?;
//!
//! let rule = store.get_rule(&ConditionCode::new("hypertension")?)?;
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use nutrirule_types::{
    ConditionCode, ConditionRule, ConditionRuleDraft, FoodList, UserConditions, UserId,
};

use crate::bound::BoundRow;
use crate::condition::ConditionRow;
use crate::custom::parse_custom_rules;
use crate::food::FoodRow;
use crate::guidance::GuidanceRow;
use crate::loader::discover_rule_files;
use crate::parser::{SeedParser, SeedRecord};
use crate::types::{LoadError, LoadResult, LoadStats, LoaderConfig, RuleFiles};

/// Read access to condition rules, plus custom-rule authoring.
///
/// The engine consumes rules through this trait and never owns their
/// persistence.
pub trait ConditionRuleStore {
    /// Returns a curated rule by code.
    ///
    /// # Errors
    /// Returns [`LoadError::RuleNotFound`] if no curated rule has the code.
    fn get_rule(&self, code: &ConditionCode) -> LoadResult<&ConditionRule>;

    /// Returns a rule by code as seen by `user`: curated rules plus the
    /// user's own custom rules.
    fn get_rule_for_user(&self, code: &ConditionCode, user: &UserId) -> LoadResult<&ConditionRule>;

    /// Returns every curated rule, ordered by code.
    fn list_rules(&self) -> Vec<&ConditionRule>;

    /// Returns every rule visible to `user`, ordered by code.
    fn list_rules_for_user(&self, user: &UserId) -> Vec<&ConditionRule>;

    /// Inserts or replaces a custom rule owned by `owner`.
    ///
    /// Returns the rule it replaced, if any.
    ///
    /// # Errors
    /// Returns [`LoadError::ReservedCode`] if the code belongs to a curated rule.
    fn upsert_custom_rule(
        &mut self,
        rule: ConditionRule,
        owner: &UserId,
    ) -> LoadResult<Option<ConditionRule>>;

    /// Resolves a user's assigned conditions to their rules.
    ///
    /// Fails on the first code with no rule visible to the user.
    fn resolve_conditions(&self, conditions: &UserConditions) -> LoadResult<Vec<&ConditionRule>> {
        conditions
            .codes()
            .map(|code| self.get_rule_for_user(code, conditions.user()))
            .collect()
    }
}

/// In-memory rule store backed by hash maps.
#[derive(Default)]
pub struct RuleStore {
    /// Curated rules indexed by code.
    curated: HashMap<ConditionCode, ConditionRule>,
    /// Custom rules indexed by owner, then code.
    custom: HashMap<UserId, HashMap<ConditionCode, ConditionRule>>,
    /// Release date of the loaded seed data.
    release_date: Option<String>,
}

impl std::fmt::Debug for RuleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleStore")
            .field("curated", &self.curated.len())
            .field("custom_owners", &self.custom.len())
            .field("release_date", &self.release_date)
            .finish()
    }
}

impl RuleStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discovers the seed files in `path` and loads them into a new store.
    pub fn from_dir<P: AsRef<Path>>(path: P, config: &LoaderConfig) -> LoadResult<Self> {
        let files = discover_rule_files(path)?;
        let mut store = Self::new();
        store.load_all(&files, config)?;
        Ok(store)
    }

    /// Loads curated rules from discovered seed files.
    ///
    /// Replaces the curated rule set wholesale. Nothing is replaced if any
    /// file fails to parse or any rule fails validation.
    pub fn load_all(&mut self, files: &RuleFiles, config: &LoaderConfig) -> LoadResult<LoadStats> {
        let start = Instant::now();

        let conditions = parse_required::<ConditionRow>(files.condition_file.as_deref())?;
        let bounds = parse_required::<BoundRow>(files.bound_file.as_deref())?;
        let foods = parse_optional::<FoodRow>(files.food_file.as_deref())?;
        let guidance = parse_optional::<GuidanceRow>(files.guidance_file.as_deref())?;

        let (rules, mut stats) = assemble(conditions, bounds, foods, guidance, config)?;
        stats.load_time_ms = start.elapsed().as_millis() as u64;

        self.replace_curated(rules, files.release_date.clone());
        log_stats(&stats);
        Ok(stats)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PARALLEL LOADING (requires "parallel" feature)
    // ═══════════════════════════════════════════════════════════════════════════

    /// Loads curated rules, parsing the four seed files concurrently.
    ///
    /// Produces the same store as [`RuleStore::load_all`].
    #[cfg(feature = "parallel")]
    pub fn load_all_parallel(
        &mut self,
        files: &RuleFiles,
        config: &LoaderConfig,
    ) -> LoadResult<LoadStats> {
        let start = Instant::now();

        // Parse all files in parallel using nested rayon::join
        let ((conditions, bounds), (foods, guidance)) = rayon::join(
            || {
                rayon::join(
                    || parse_required::<ConditionRow>(files.condition_file.as_deref()),
                    || parse_required::<BoundRow>(files.bound_file.as_deref()),
                )
            },
            || {
                rayon::join(
                    || parse_optional::<FoodRow>(files.food_file.as_deref()),
                    || parse_optional::<GuidanceRow>(files.guidance_file.as_deref()),
                )
            },
        );

        let (rules, mut stats) = assemble(conditions?, bounds?, foods?, guidance?, config)?;
        stats.load_time_ms = start.elapsed().as_millis() as u64;

        self.replace_curated(rules, files.release_date.clone());
        log_stats(&stats);
        Ok(stats)
    }

    /// Inserts or replaces a curated rule, returning the previous one.
    pub fn insert_curated(&mut self, rule: ConditionRule) -> Option<ConditionRule> {
        self.curated.insert(rule.code().clone(), rule)
    }

    /// Parses a JSON array of custom rules and upserts them for `owner`.
    ///
    /// Returns the number of rules stored. Nothing is stored if any rule is
    /// invalid or uses a curated code.
    pub fn load_custom_rules<R: Read>(&mut self, reader: R, owner: &UserId) -> LoadResult<usize> {
        let rules = parse_custom_rules(reader, owner)?;

        if let Some(taken) = rules.iter().find(|r| self.curated.contains_key(r.code())) {
            return Err(LoadError::ReservedCode {
                code: taken.code().to_string(),
            });
        }

        let count = rules.len();
        for rule in rules {
            self.upsert_custom_rule(rule, owner)?;
        }
        Ok(count)
    }

    /// Removes a user's custom rule.
    pub fn remove_custom_rule(
        &mut self,
        code: &ConditionCode,
        owner: &UserId,
    ) -> LoadResult<ConditionRule> {
        self.custom
            .get_mut(owner)
            .and_then(|rules| rules.remove(code))
            .ok_or_else(|| LoadError::RuleNotFound {
                code: code.to_string(),
            })
    }

    /// Returns the number of curated rules.
    pub fn curated_count(&self) -> usize {
        self.curated.len()
    }

    /// Returns the number of custom rules owned by `user`.
    pub fn custom_count(&self, user: &UserId) -> usize {
        self.custom.get(user).map_or(0, HashMap::len)
    }

    /// Returns the release date of the loaded seed data.
    pub fn release_date(&self) -> Option<&str> {
        self.release_date.as_deref()
    }

    fn replace_curated(&mut self, rules: Vec<ConditionRule>, release_date: Option<String>) {
        self.curated = rules
            .into_iter()
            .map(|rule| (rule.code().clone(), rule))
            .collect();
        self.release_date = release_date;
    }
}

impl ConditionRuleStore for RuleStore {
    fn get_rule(&self, code: &ConditionCode) -> LoadResult<&ConditionRule> {
        self.curated.get(code).ok_or_else(|| LoadError::RuleNotFound {
            code: code.to_string(),
        })
    }

    fn get_rule_for_user(&self, code: &ConditionCode, user: &UserId) -> LoadResult<&ConditionRule> {
        self.curated
            .get(code)
            .or_else(|| self.custom.get(user).and_then(|rules| rules.get(code)))
            .ok_or_else(|| LoadError::RuleNotFound {
                code: code.to_string(),
            })
    }

    fn list_rules(&self) -> Vec<&ConditionRule> {
        let mut rules: Vec<_> = self.curated.values().collect();
        rules.sort_by(|a, b| a.code().cmp(b.code()));
        rules
    }

    fn list_rules_for_user(&self, user: &UserId) -> Vec<&ConditionRule> {
        let mut rules: Vec<_> = self
            .curated
            .values()
            .chain(self.custom.get(user).into_iter().flat_map(HashMap::values))
            .collect();
        rules.sort_by(|a, b| a.code().cmp(b.code()));
        rules
    }

    fn upsert_custom_rule(
        &mut self,
        rule: ConditionRule,
        owner: &UserId,
    ) -> LoadResult<Option<ConditionRule>> {
        if self.curated.contains_key(rule.code()) {
            return Err(LoadError::ReservedCode {
                code: rule.code().to_string(),
            });
        }

        let rule = rule.into_custom(owner.clone());
        tracing::debug!(code = %rule.code(), owner = %owner, "upserting custom rule");

        Ok(self
            .custom
            .entry(owner.clone())
            .or_default()
            .insert(rule.code().clone(), rule))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// RULE ASSEMBLY
// ═══════════════════════════════════════════════════════════════════════════

fn parse_required<T: SeedRecord>(path: Option<&Path>) -> LoadResult<Vec<T>> {
    match path {
        Some(path) => SeedParser::<_, T>::from_path(path)?.parse_all(),
        None => Err(LoadError::RequiredFileMissing {
            file_type: T::FILE_TYPE.to_string(),
            directory: String::new(),
        }),
    }
}

fn parse_optional<T: SeedRecord>(path: Option<&Path>) -> LoadResult<Vec<T>> {
    match path {
        Some(path) => SeedParser::<_, T>::from_path(path)?.parse_all(),
        None => Ok(Vec::new()),
    }
}

/// Groups parsed rows into validated rules.
///
/// Every row must reference a condition present in the condition file.
/// Rows of conditions excluded by `config` are counted as skipped.
fn assemble(
    conditions: Vec<ConditionRow>,
    bounds: Vec<BoundRow>,
    foods: Vec<FoodRow>,
    guidance: Vec<GuidanceRow>,
    config: &LoaderConfig,
) -> LoadResult<(Vec<ConditionRule>, LoadStats)> {
    let mut stats = LoadStats::default();
    let mut known = HashSet::with_capacity(conditions.len());
    let mut drafts: BTreeMap<String, ConditionRuleDraft> = BTreeMap::new();

    for row in conditions {
        if !known.insert(row.code.clone()) {
            return Err(LoadError::DuplicateCondition { code: row.code });
        }
        if !row.passes_filter(config) {
            stats.skipped_rows += 1;
            continue;
        }
        drafts.insert(
            row.code.clone(),
            ConditionRuleDraft {
                code: row.code,
                name: row.name,
                priority: row.priority,
                ..Default::default()
            },
        );
    }

    for row in bounds {
        let Some(draft) = route(&row, &known, &mut drafts, &mut stats)? else {
            continue;
        };
        let key = row.nutrient.as_str().to_string();
        if draft.bounds.contains_key(&key) {
            return Err(LoadError::DuplicateBound {
                code: row.condition_code,
                nutrient: key,
            });
        }
        draft.bounds.insert(key, row.limits);
        stats.bounds += 1;
    }

    for row in foods {
        let Some(draft) = route(&row, &known, &mut drafts, &mut stats)? else {
            continue;
        };
        match row.list {
            FoodList::Avoid => draft.avoid.push(row.food),
            FoodList::Recommend => draft.recommend.push(row.food),
            FoodList::AvoidCategory => draft.avoid_categories.push(row.food),
            FoodList::RecommendCategory => draft.recommend_categories.push(row.food),
        }
        stats.foods += 1;
    }

    for row in guidance {
        let Some(draft) = route(&row, &known, &mut drafts, &mut stats)? else {
            continue;
        };
        draft.notes.push(row.note);
        stats.guidance += 1;
    }

    let rules = drafts
        .into_iter()
        .map(|(code, draft)| {
            ConditionRule::try_from(draft).map_err(|source| LoadError::InvalidRule { code, source })
        })
        .collect::<LoadResult<Vec<_>>>()?;

    stats.conditions = rules.len();
    Ok((rules, stats))
}

/// Finds the draft a row belongs to, or `None` if its condition was filtered out.
fn route<'a, T: SeedRecord>(
    row: &T,
    known: &HashSet<String>,
    drafts: &'a mut BTreeMap<String, ConditionRuleDraft>,
    stats: &mut LoadStats,
) -> LoadResult<Option<&'a mut ConditionRuleDraft>> {
    let code = row.condition_code();
    if !known.contains(code) {
        return Err(LoadError::UnknownCondition {
            file: T::FILE_TYPE.to_string(),
            code: code.to_string(),
        });
    }
    let draft = drafts.get_mut(code);
    if draft.is_none() {
        stats.skipped_rows += 1;
    }
    Ok(draft)
}

fn log_stats(stats: &LoadStats) {
    tracing::info!(
        conditions = stats.conditions,
        bounds = stats.bounds,
        foods = stats.foods,
        guidance = stats.guidance,
        skipped = stats.skipped_rows,
        elapsed_ms = stats.load_time_ms,
        "loaded condition rules"
    );
}
