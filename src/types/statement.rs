//! Statement-level types
//!
//! A [`ParsedStatement`] is produced by exactly one parse operation and never
//! mutated afterwards; correcting a statement means parsing its text again.

use super::money::Money;
use super::transaction::{Transaction, TransactionType};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Account holder as printed in the statement header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountHolder {
    /// Customer code assigned by the bank
    pub code: String,
    pub name: String,
    /// Postal address with whitespace collapsed; empty when not printed
    pub address: String,
}

/// Inclusive statement period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Debit and credit turnover as reported in the statement footer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Turnover {
    pub debit: Money,
    pub credit: Money,
}

impl Turnover {
    pub fn is_zero(&self) -> bool {
        self.debit.is_zero() && self.credit.is_zero()
    }
}

/// Header and footer fields of a statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementHeader {
    pub account_holder: AccountHolder,
    pub iban: String,
    pub currency: String,
    pub period: Period,
    /// Sequence number of the statement within the year
    pub statement_number: u32,
    pub statement_date: NaiveDate,
    pub opening_balance: Money,
    pub closing_balance: Money,
    /// Turnover for this statement, when the footer prints it
    pub turnover: Option<Turnover>,
    /// Turnover accumulated since the start of the year, when printed
    pub accumulated_turnover: Option<Turnover>,
}

/// Conditions that do not fail a parse but deserve a human look
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "flag", rename_all = "snake_case")]
pub enum ReviewFlag {
    /// The statement lists no transactions
    NoTransactions,
    /// Some transactions matched no classification rule
    UnclassifiedTransactions { count: usize },
}

/// A fully parsed statement: header plus transactions in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedStatement {
    pub header: StatementHeader,
    pub transactions: Vec<Transaction>,
    pub review_flags: Vec<ReviewFlag>,
}

impl ParsedStatement {
    /// Assemble a statement, deriving its review flags from the transactions
    pub fn new(header: StatementHeader, transactions: Vec<Transaction>) -> Self {
        let mut review_flags = Vec::new();
        if transactions.is_empty() {
            review_flags.push(ReviewFlag::NoTransactions);
        }
        let unclassified = transactions
            .iter()
            .filter(|tx| tx.tx_type == TransactionType::Unclassified)
            .count();
        if unclassified > 0 {
            review_flags.push(ReviewFlag::UnclassifiedTransactions {
                count: unclassified,
            });
        }

        ParsedStatement {
            header,
            transactions,
            review_flags,
        }
    }

    pub fn needs_review(&self) -> bool {
        !self.review_flags.is_empty()
    }
}

/// Source metadata of a decompressed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Sanitized file name; never used as a filesystem path by the core
    pub file_name: String,
    pub byte_size: u64,
    pub extracted_at: DateTime<Utc>,
}

/// Plain text of a document plus where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub text: String,
    pub meta: DocumentMeta,
}
