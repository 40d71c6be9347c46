//! Types module
//!
//! Contains core data structures used throughout the pipeline.
//! This module organizes types into logical submodules:
//! - `money`: Paired EUR/BGN amounts
//! - `transaction`: Transactions, their classification and counterparties
//! - `statement`: Statement header, parsed statement, extracted documents
//! - `validation`: Balance validation results
//! - `identity`: Import identities used for deduplication
//! - `result`: Caller-facing pipeline results
//! - `error`: Error types and classification

pub mod error;
pub mod identity;
pub mod money;
pub mod result;
pub mod statement;
pub mod transaction;
pub mod validation;

pub use error::{ErrorKind, ImportError, Stage};
pub use identity::{IdentityKey, ImportIdentity};
pub use money::Money;
pub use result::{ImportOutcome, PipelineFailure, PipelineResult};
pub use statement::{
    AccountHolder, DocumentMeta, ExtractedDocument, ParsedStatement, Period, ReviewFlag,
    StatementHeader, Turnover,
};
pub use transaction::{Counterparty, Direction, Transaction, TransactionType};
pub use validation::{Check, Discrepancy, TransactionTotals, ValidationResult};
