//! Core traits for the collaborators the pipeline depends on
//!
//! The pipeline never performs I/O itself. Text extraction and identity
//! storage are reached through these narrow traits so hosts can plug in a PDF
//! engine, a database, or in-memory fakes for tests.

use crate::types::{IdentityKey, ImportError, ImportIdentity};
use std::collections::{BTreeSet, HashSet};

/// Turns document bytes into plain text
///
/// Implementations report failures as [`ImportError::ExtractionFailed`],
/// flagging transient ones (engine busy, resource exhaustion) as retryable.
pub trait TextExtractor: Send + Sync {
    /// Extract the text of a document
    fn extract_text(&self, document: &[u8]) -> Result<String, ImportError>;
}

/// Read-only view of previously recorded identities
///
/// The pipeline only asks whether a key is known; recording happens at the
/// storage boundary through [`IdentityStore`].
pub trait IdentityLookup {
    /// Whether an identity with this key was recorded before
    fn contains(&self, key: &IdentityKey) -> bool;
}

/// Durable identity storage owned by the host
///
/// `record_if_absent` must be atomic: of two concurrent imports of the same
/// statement, exactly one may observe `true`.
pub trait IdentityStore: IdentityLookup + Send + Sync {
    /// Record an identity unless any of its keys is already known
    ///
    /// Returns `true` when the identity was newly recorded.
    fn record_if_absent(&self, identity: &ImportIdentity) -> Result<bool, ImportError>;
}

impl IdentityLookup for HashSet<IdentityKey> {
    fn contains(&self, key: &IdentityKey) -> bool {
        HashSet::contains(self, key)
    }
}

impl IdentityLookup for BTreeSet<IdentityKey> {
    fn contains(&self, key: &IdentityKey) -> bool {
        BTreeSet::contains(self, key)
    }
}

impl IdentityLookup for [ImportIdentity] {
    fn contains(&self, key: &IdentityKey) -> bool {
        self.iter().any(|identity| identity.keys().contains(key))
    }
}

impl IdentityLookup for Vec<ImportIdentity> {
    fn contains(&self, key: &IdentityKey) -> bool {
        IdentityLookup::contains(self.as_slice(), key)
    }
}
