//! Thread-safe identity store for batch imports
//!
//! `SharedIdentityStore` is the in-process [`IdentityStore`]: it is seeded with
//! the identities of earlier runs and records new ones as statements are
//! imported. Both strategies share one instance, the async one across worker
//! threads.
//!
//! # Atomicity
//!
//! Identities are keyed by their semantic key and recorded through the
//! `DashMap` entry API, which holds the shard lock between the presence check
//! and the insert. Two workers importing the same statement therefore cannot
//! both record it. Byte-identical documents always share a semantic key, so
//! the checksum index only serves lookups.

use crate::core::{IdentityLookup, IdentityStore};
use crate::types::{IdentityKey, ImportError, ImportIdentity};
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};

#[derive(Debug, Clone)]
struct Recorded {
    identity: ImportIdentity,
    /// Recorded during this run rather than loaded from history
    fresh: bool,
}

/// Concurrent identity store backed by `DashMap`
#[derive(Debug, Default)]
pub struct SharedIdentityStore {
    by_semantic_key: DashMap<String, Recorded>,
    checksums: DashSet<String>,
}

impl SharedIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already knows `history`
    ///
    /// Seeded identities count as known but are not reported by
    /// [`fresh_identities`](Self::fresh_identities).
    pub fn with_history(history: impl IntoIterator<Item = ImportIdentity>) -> Self {
        let store = Self::new();
        for identity in history {
            store.checksums.insert(identity.content_checksum.clone());
            store
                .by_semantic_key
                .entry(identity.semantic_key.clone())
                .or_insert(Recorded {
                    identity,
                    fresh: false,
                });
        }
        store
    }

    /// Number of known statements
    pub fn len(&self) -> usize {
        self.by_semantic_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_semantic_key.is_empty()
    }

    /// Identities recorded since the store was created, ordered by semantic key
    pub fn fresh_identities(&self) -> Vec<ImportIdentity> {
        let mut fresh: Vec<ImportIdentity> = self
            .by_semantic_key
            .iter()
            .filter(|entry| entry.value().fresh)
            .map(|entry| entry.value().identity.clone())
            .collect();
        fresh.sort_by(|a, b| a.semantic_key.cmp(&b.semantic_key));
        fresh
    }
}

impl IdentityLookup for SharedIdentityStore {
    fn contains(&self, key: &IdentityKey) -> bool {
        match key {
            IdentityKey::Checksum(checksum) => self.checksums.contains(checksum),
            IdentityKey::Semantic(semantic) => self.by_semantic_key.contains_key(semantic),
        }
    }
}

impl IdentityStore for SharedIdentityStore {
    fn record_if_absent(&self, identity: &ImportIdentity) -> Result<bool, ImportError> {
        if self.checksums.contains(&identity.content_checksum) {
            return Ok(false);
        }

        match self.by_semantic_key.entry(identity.semantic_key.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(vacant) => {
                self.checksums.insert(identity.content_checksum.clone());
                vacant.insert(Recorded {
                    identity: identity.clone(),
                    fresh: true,
                });
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn identity(checksum: &str, semantic: &str) -> ImportIdentity {
        ImportIdentity {
            content_checksum: checksum.to_string(),
            semantic_key: semantic.to_string(),
            statement_id: format!("id-{}", semantic),
        }
    }

    #[test]
    fn test_records_once() {
        let store = SharedIdentityStore::new();
        let id = identity("c1", "BG01|2024-01-01|2024-01-31");

        assert!(store.record_if_absent(&id).unwrap());
        assert!(!store.record_if_absent(&id).unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_same_semantic_key_other_checksum_is_rejected() {
        let store = SharedIdentityStore::new();
        store
            .record_if_absent(&identity("c1", "BG01|2024-01-01|2024-01-31"))
            .unwrap();

        let re_encoded = identity("c2", "BG01|2024-01-01|2024-01-31");

        assert!(!store.record_if_absent(&re_encoded).unwrap());
        assert!(!store.contains(&re_encoded.checksum_key()));
    }

    #[test]
    fn test_lookup_by_either_key() {
        let store = SharedIdentityStore::new();
        let id = identity("c1", "BG01|2024-01-01|2024-01-31");
        store.record_if_absent(&id).unwrap();

        assert!(store.contains(&id.checksum_key()));
        assert!(store.contains(&id.semantic_key()));
        assert!(!store.contains(&IdentityKey::Checksum("c9".to_string())));
    }

    #[test]
    fn test_history_is_known_but_not_fresh() {
        let old = identity("c1", "BG01|2024-01-01|2024-01-31");
        let store = SharedIdentityStore::with_history(vec![old.clone()]);
        let new = identity("c2", "BG01|2024-02-01|2024-02-29");

        assert!(!store.record_if_absent(&old).unwrap());
        assert!(store.record_if_absent(&new).unwrap());
        assert_eq!(store.fresh_identities(), vec![new]);
    }

    #[test]
    fn test_concurrent_records_have_one_winner() {
        let store = Arc::new(SharedIdentityStore::new());
        let id = identity("c1", "BG01|2024-01-01|2024-01-31");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let id = id.clone();
                thread::spawn(move || store.record_if_absent(&id).unwrap())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|recorded| *recorded)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(store.fresh_identities().len(), 1);
    }

    #[test]
    fn test_store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedIdentityStore>();
    }
}
