//! Balance validation results
//!
//! Validation never fails a pipeline run; discrepancies are data the caller
//! acts on (reject, flag for review, or accept with a warning).

use super::money::Money;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// The consistency checks the validator evaluates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    EurBalance,
    BgnBalance,
    TransactionCount,
    DebitTurnoverEur,
    CreditTurnoverEur,
    DebitTurnoverBgn,
    CreditTurnoverBgn,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Check::EurBalance => "EUR balance",
            Check::BgnBalance => "BGN balance",
            Check::TransactionCount => "transaction count",
            Check::DebitTurnoverEur => "EUR debit turnover",
            Check::CreditTurnoverEur => "EUR credit turnover",
            Check::DebitTurnoverBgn => "BGN debit turnover",
            Check::CreditTurnoverBgn => "BGN credit turnover",
        };
        f.write_str(name)
    }
}

/// One failed check: what was computed, what the document states, and by how much they differ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub check: Check,
    /// Value derived from the transactions
    pub expected: Decimal,
    /// Value printed in the statement
    pub actual: Decimal,
    /// Absolute difference between the two
    pub deviation: Decimal,
}

impl Discrepancy {
    pub fn new(check: Check, expected: Decimal, actual: Decimal) -> Self {
        Discrepancy {
            check,
            expected,
            actual,
            deviation: (actual - expected).abs(),
        }
    }
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} mismatch: expected {:.2}, actual {:.2}, deviation {:.2}",
            self.check, self.expected, self.actual, self.deviation
        )
    }
}

/// Sums of the transaction amounts by direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TransactionTotals {
    pub debit: Money,
    pub credit: Money,
}

/// Outcome of validating a parsed statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// True when `discrepancies` is empty
    pub valid: bool,
    pub discrepancies: Vec<Discrepancy>,
    /// Reported-turnover mismatches; informative only
    pub warnings: Vec<Discrepancy>,
    pub totals: TransactionTotals,
    /// Opening balance plus net turnover
    pub calculated_closing: Money,
}
