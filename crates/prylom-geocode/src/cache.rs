//! Session-scoped geocode cache.
//!
//! One [`GeocodeCache`] is created per application session and handed to the
//! [`crate::ClusterBuilder`]. Entries are append-only: never evicted, never
//! invalidated, never persisted. Failed lookups are remembered too, so a
//! place that could not be located stays off the map for the session. Cardinality is bounded by the number of
//! distinct place names in the catalog, so growth is not a concern.
//!
//! Clones share the same map.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use prylom_core::GeoPoint;
use regex::Regex;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// A remembered lookup outcome.
#[derive(Debug, Clone)]
pub enum CachedLookup {
    Located(GeoPoint),
    /// The service answered with zero results.
    NotFound,
    /// Network error, rate limiting or a malformed response.
    Failed { message: String },
}

#[derive(Debug, Clone, Default)]
pub struct GeocodeCache {
    entries: Arc<RwLock<HashMap<String, CachedLookup>>>,
}

impl GeocodeCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical cache key: trimmed, lowercased, inner whitespace collapsed.
    #[must_use]
    pub fn normalize_query(query: &str) -> String {
        WHITESPACE
            .replace_all(query.trim(), " ")
            .to_lowercase()
    }

    #[must_use]
    pub fn get(&self, query: &str) -> Option<CachedLookup> {
        let key = Self::normalize_query(query);
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    /// Records a lookup outcome. The first writer for a key wins; later
    /// writes for the same key are ignored and the stored value is returned.
    pub fn insert(&self, query: &str, lookup: CachedLookup) -> CachedLookup {
        let key = Self::normalize_query(query);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert(lookup)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
