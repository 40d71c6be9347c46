//! Balance validator
//!
//! Checks the arithmetic of a parsed statement: opening balance plus net
//! turnover must equal the closing balance in each currency, within a
//! tolerance expressed in minor units. All checks run; none short-circuits.
//!
//! Discrepancies make the result invalid. Warnings compare the transaction
//! sums with the turnover the statement itself reports and never affect
//! validity.

use crate::types::{
    Check, Discrepancy, Money, ParsedStatement, TransactionTotals, ValidationResult,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Allowed rounding difference per currency, in minor units (cents / stotinki)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tolerance {
    pub eur_minor_units: u32,
    pub bgn_minor_units: u32,
}

impl Default for Tolerance {
    fn default() -> Self {
        // BGN figures are converted from EUR and pick up extra rounding
        Tolerance {
            eur_minor_units: 2,
            bgn_minor_units: 10,
        }
    }
}

impl Tolerance {
    pub fn eur(&self) -> Decimal {
        Decimal::new(i64::from(self.eur_minor_units), 2)
    }

    pub fn bgn(&self) -> Decimal {
        Decimal::new(i64::from(self.bgn_minor_units), 2)
    }
}

/// Validates parsed statements against a fixed tolerance
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceValidator {
    tolerance: Tolerance,
}

impl BalanceValidator {
    pub fn new(tolerance: Tolerance) -> Self {
        BalanceValidator { tolerance }
    }

    /// Validate a statement
    ///
    /// # Returns
    ///
    /// A [`ValidationResult`] listing every failed check. The statement is
    /// never rejected here; the caller decides what an invalid result means.
    pub fn validate(&self, statement: &ParsedStatement) -> ValidationResult {
        let header = &statement.header;
        let totals = transaction_totals(statement);
        let net_turnover = totals.credit - totals.debit;
        let calculated_closing = header.opening_balance + net_turnover;

        let mut discrepancies = Vec::new();
        self.compare(
            &mut discrepancies,
            Check::EurBalance,
            calculated_closing.eur,
            header.closing_balance.eur,
            self.tolerance.eur(),
        );
        self.compare(
            &mut discrepancies,
            Check::BgnBalance,
            calculated_closing.bgn,
            header.closing_balance.bgn,
            self.tolerance.bgn(),
        );

        // Reported turnover without a single parsed transaction means blocks were lost
        if statement.transactions.is_empty() {
            if let Some(turnover) = header.turnover.filter(|turnover| !turnover.is_zero()) {
                let reported = turnover.debit.eur + turnover.credit.eur;
                discrepancies.push(Discrepancy::new(
                    Check::TransactionCount,
                    Decimal::ZERO,
                    reported,
                ));
            }
        }

        let mut warnings = Vec::new();
        if let Some(turnover) = header.turnover {
            self.compare_pair(
                &mut warnings,
                (Check::DebitTurnoverEur, Check::DebitTurnoverBgn),
                totals.debit,
                turnover.debit,
            );
            self.compare_pair(
                &mut warnings,
                (Check::CreditTurnoverEur, Check::CreditTurnoverBgn),
                totals.credit,
                turnover.credit,
            );
        }

        ValidationResult {
            valid: discrepancies.is_empty(),
            discrepancies,
            warnings,
            totals,
            calculated_closing,
        }
    }

    fn compare(
        &self,
        out: &mut Vec<Discrepancy>,
        check: Check,
        expected: Decimal,
        actual: Decimal,
        tolerance: Decimal,
    ) {
        if (actual - expected).abs() > tolerance {
            out.push(Discrepancy::new(check, expected, actual));
        }
    }

    fn compare_pair(
        &self,
        out: &mut Vec<Discrepancy>,
        (eur_check, bgn_check): (Check, Check),
        expected: Money,
        actual: Money,
    ) {
        self.compare(out, eur_check, expected.eur, actual.eur, self.tolerance.eur());
        self.compare(out, bgn_check, expected.bgn, actual.bgn, self.tolerance.bgn());
    }
}

/// Sum debit and credit magnitudes separately
fn transaction_totals(statement: &ParsedStatement) -> TransactionTotals {
    statement
        .transactions
        .iter()
        .fold(TransactionTotals::default(), |mut totals, tx| {
            if tx.is_debit() {
                totals.debit = totals.debit + tx.amount.abs();
            } else {
                totals.credit = totals.credit + tx.amount.abs();
            }
            totals
        })
}
