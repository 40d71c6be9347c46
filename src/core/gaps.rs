//! Gap detection across imported statements
//!
//! Statements are issued per banking day. Between two consecutive statements
//! of an account, missing days are a gap unless the earlier closing balance
//! equals the later opening balance, which means nothing was booked (weekends,
//! holidays).

use crate::types::ParsedStatement;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The fields of a statement gap detection needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementSummary {
    pub iban: String,
    pub account_holder_name: String,
    pub statement_date: NaiveDate,
    pub opening_balance_eur: Decimal,
    pub closing_balance_eur: Decimal,
}

impl From<&ParsedStatement> for StatementSummary {
    fn from(statement: &ParsedStatement) -> Self {
        let header = &statement.header;
        StatementSummary {
            iban: header.iban.clone(),
            account_holder_name: header.account_holder.name.clone(),
            statement_date: header.statement_date,
            opening_balance_eur: header.opening_balance.eur,
            closing_balance_eur: header.closing_balance.eur,
        }
    }
}

/// A run of days without a statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gap {
    pub iban: String,
    pub account_holder_name: String,
    /// First missing day
    pub gap_start: NaiveDate,
    /// Last missing day
    pub gap_end: NaiveDate,
    pub missing_days: i64,
}

impl Gap {
    /// `2024-01-05` for a single day, `2024-01-05 - 2024-01-09` otherwise
    pub fn range(&self) -> String {
        if self.missing_days == 1 {
            self.gap_start.to_string()
        } else {
            format!("{} - {}", self.gap_start, self.gap_end)
        }
    }
}

/// Find gaps per IBAN, ordered by IBAN then gap start
pub fn detect_gaps(summaries: &[StatementSummary]) -> Vec<Gap> {
    let mut by_iban: BTreeMap<&str, Vec<&StatementSummary>> = BTreeMap::new();
    for summary in summaries {
        by_iban.entry(summary.iban.as_str()).or_default().push(summary);
    }

    let mut gaps = Vec::new();
    for statements in by_iban.values_mut() {
        statements.sort_by_key(|summary| summary.statement_date);

        for pair in statements.windows(2) {
            let (previous, next) = (pair[0], pair[1]);
            let missing_days = (next.statement_date - previous.statement_date).num_days() - 1;
            if missing_days < 1 || previous.closing_balance_eur == next.opening_balance_eur {
                continue;
            }
            gaps.push(Gap {
                iban: next.iban.clone(),
                account_holder_name: next.account_holder_name.clone(),
                gap_start: previous.statement_date + chrono::Days::new(1),
                gap_end: next.statement_date - chrono::Days::new(1),
                missing_days,
            });
        }
    }

    gaps
}
