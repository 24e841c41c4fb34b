//! Source-keyed advantage/resistance aggregator
//!
//! Each grant writes a set of affected identifiers under a unique source key
//! ("rage", "dangerSense", ...). A lookup is true iff the identifier appears
//! in the union across all present sources, so independent sources add and
//! remove their grants without clobbering each other.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Map from source identifier to the set of identifiers it grants
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrantMap<T: Ord> {
    sources: BTreeMap<String, BTreeSet<T>>,
}

impl<T: Ord> GrantMap<T> {
    pub fn new() -> Self {
        Self {
            sources: BTreeMap::new(),
        }
    }

    /// Grant a set of identifiers under a source key.
    ///
    /// Re-granting an existing source overwrites its previous set.
    pub fn grant(&mut self, source: &str, items: impl IntoIterator<Item = T>) {
        self.sources
            .insert(source.to_string(), items.into_iter().collect());
    }

    /// Remove exactly the grants of one source. Returns true if it was present.
    pub fn revoke(&mut self, source: &str) -> bool {
        self.sources.remove(source).is_some()
    }

    /// Whether any current source grants this identifier
    pub fn granted(&self, item: &T) -> bool {
        self.sources.values().any(|set| set.contains(item))
    }

    /// Whether a source key is currently present
    pub fn has_source(&self, source: &str) -> bool {
        self.sources.contains_key(source)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Current source keys
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }
}
