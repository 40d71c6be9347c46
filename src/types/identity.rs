//! Import identity types
//!
//! An [`ImportIdentity`] is computed once per parsed statement and compared
//! against identities recorded by earlier imports. It exposes two lookup keys:
//! the document checksum (re-delivery of the same attachment) and the semantic
//! key (IBAN + period, for re-encoded copies of the same statement).

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the keys an identity can be looked up by
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum IdentityKey {
    /// SHA-256 of the canonical document bytes
    Checksum(String),
    /// `IBAN|period_start|period_end`
    Semantic(String),
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKey::Checksum(value) => write!(f, "checksum:{}", value),
            IdentityKey::Semantic(value) => write!(f, "semantic:{}", value),
        }
    }
}

/// Deterministic identity of an imported statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportIdentity {
    /// Hex SHA-256 of the document bytes
    pub content_checksum: String,
    /// IBAN plus period bounds
    pub semantic_key: String,
    /// Stable row id for durable storage
    pub statement_id: String,
}

impl ImportIdentity {
    pub fn checksum_key(&self) -> IdentityKey {
        IdentityKey::Checksum(self.content_checksum.clone())
    }

    pub fn semantic_key(&self) -> IdentityKey {
        IdentityKey::Semantic(self.semantic_key.clone())
    }

    /// Both lookup keys, checksum first
    pub fn keys(&self) -> [IdentityKey; 2] {
        [self.checksum_key(), self.semantic_key()]
    }
}
