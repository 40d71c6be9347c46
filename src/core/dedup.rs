//! Deduplication engine
//!
//! Derives the identity of an import and checks it against identities the
//! caller already knows about. Nothing here touches storage: recording an
//! identity is the job of an [`IdentityStore`](crate::core::traits::IdentityStore)
//! at the storage boundary.

use crate::core::traits::IdentityLookup;
use crate::types::{ImportError, ImportIdentity, ParsedStatement, Transaction};
use sha2::{Digest, Sha256};

/// Length of the hex ids derived for statements and transactions
const ID_LENGTH: usize = 32;

/// Hex SHA-256 of `input`
fn sha256_hex(input: &[u8]) -> String {
    hex::encode(Sha256::digest(input))
}

/// Compute the identity of a statement parsed from `source`
///
/// `source` is the decompressed document, so re-encrypting or re-zipping the
/// same document keeps the checksum.
///
/// # Errors
///
/// Returns `MissingIdentityField` when the IBAN is empty.
pub fn identify(statement: &ParsedStatement, source: &[u8]) -> Result<ImportIdentity, ImportError> {
    let header = &statement.header;
    if header.iban.trim().is_empty() {
        return Err(ImportError::missing_identity_field("iban"));
    }

    let semantic_key = format!(
        "{}|{}|{}",
        header.iban, header.period.start, header.period.end
    );
    let statement_seed = format!(
        "{}|{}|{}|{}",
        header.iban, header.statement_date, header.statement_number, header.opening_balance.eur
    );

    Ok(ImportIdentity {
        content_checksum: sha256_hex(source),
        semantic_key,
        statement_id: sha256_hex(statement_seed.as_bytes())[..ID_LENGTH].to_string(),
    })
}

/// Whether any key of `identity` is already known
pub fn is_duplicate(identity: &ImportIdentity, known: &dyn IdentityLookup) -> bool {
    identity.keys().iter().any(|key| known.contains(key))
}

/// Stable id of a transaction within its statement
///
/// The position is part of the seed so two identical card payments on the
/// same day stay distinct.
pub fn transaction_id(statement_id: &str, tx: &Transaction, index: usize) -> String {
    let seed = format!(
        "{}|{}|{}|{}|{}|{}",
        statement_id,
        tx.reference,
        tx.posting_date,
        tx.amount.eur.abs(),
        tx.is_debit(),
        index
    );
    sha256_hex(seed.as_bytes())[..ID_LENGTH].to_string()
}
