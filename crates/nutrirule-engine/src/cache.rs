//! Effective constraint set cache.
//!
//! Merged sets are keyed by a [`RuleSetKey`]: the merged rules' codes
//! together with a digest of each rule's content. Editing a rule therefore
//! changes the key, and [`ConstraintCache::invalidate_condition`] drops the
//! stale entries eagerly. Lookups compare the full key, never just its hash.
//!
//! # Thread Safety
//!
//! The cache uses `RwLock` internally and is safe to share across threads.
//! It is non-critical: if the lock is poisoned, lookups miss and writes
//! are skipped.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use nutrirule_types::{ConditionCode, ConditionRule, EffectiveConstraintSet};

use crate::merger::RuleMerger;

/// Default maximum number of cached sets.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Identity of a set of rules: each rule's code and content digest, sorted
/// and deduplicated so input order does not matter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleSetKey {
    parts: Vec<(ConditionCode, u64)>,
}

impl RuleSetKey {
    /// Builds the key of a rule set.
    pub fn new<'a, I>(rules: I) -> Self
    where
        I: IntoIterator<Item = &'a ConditionRule>,
    {
        let mut parts: Vec<(ConditionCode, u64)> = rules
            .into_iter()
            .map(|rule| (rule.code().clone(), rule.content_digest()))
            .collect();
        parts.sort();
        parts.dedup();
        Self { parts }
    }

    /// Returns true if the set includes a rule with `code`.
    pub fn includes(&self, code: &ConditionCode) -> bool {
        self.parts.iter().any(|(c, _)| c == code)
    }

    /// Returns a 64-bit summary of the key, for logs.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.parts.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Debug)]
struct CacheEntry {
    set: Arc<EffectiveConstraintSet>,
    inserted: u64,
}

/// Bounded cache of merged constraint sets.
#[derive(Debug)]
pub struct ConstraintCache {
    capacity: usize,
    entries: RwLock<HashMap<RuleSetKey, CacheEntry>>,
    sequence: AtomicU64,
}

impl Default for ConstraintCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl ConstraintCache {
    /// Creates a cache holding at most `capacity` sets. Zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(HashMap::new()),
            sequence: AtomicU64::new(0),
        }
    }

    /// Returns the cached set for `rules`, merging and caching it on a miss.
    pub fn get_or_merge(
        &self,
        rules: &[&ConditionRule],
        merger: &RuleMerger,
    ) -> Arc<EffectiveConstraintSet> {
        let key = RuleSetKey::new(rules.iter().copied());

        if let Some(set) = self.get(&key) {
            tracing::trace!(fingerprint = key.fingerprint(), "constraint cache hit");
            return set;
        }

        tracing::trace!(fingerprint = key.fingerprint(), "constraint cache miss");
        self.insert(key, merger.merge(rules.iter().copied()))
    }

    /// Returns the set cached under `key`.
    pub fn get(&self, key: &RuleSetKey) -> Option<Arc<EffectiveConstraintSet>> {
        let entries = self.entries.read().ok()?;
        entries.get(key).map(|entry| Arc::clone(&entry.set))
    }

    /// Caches a set under `key`, evicting the oldest entry when full.
    pub fn insert(&self, key: RuleSetKey, set: EffectiveConstraintSet) -> Arc<EffectiveConstraintSet> {
        let set = Arc::new(set);
        if self.capacity == 0 {
            return set;
        }

        let Ok(mut entries) = self.entries.write() else {
            // Lock poisoned - skip insertion
            return set;
        };

        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                set: Arc::clone(&set),
                inserted: self.sequence.fetch_add(1, Ordering::Relaxed),
            },
        );
        set
    }

    /// Drops every cached set that includes `code`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate_condition(&self, code: &ConditionCode) -> usize {
        let Ok(mut entries) = self.entries.write() else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|key, _| !key.includes(code));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(code = %code, removed, "invalidated cached constraint sets");
        }
        removed
    }

    /// Clears the entire cache.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    /// Returns the number of cached sets.
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len())
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of cached sets.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
