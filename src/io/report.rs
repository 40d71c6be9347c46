//! Report writers
//!
//! A batch run produces one [`ReportEntry`] per input. The JSON report carries
//! every entry verbatim plus the gaps found between the imported statements;
//! the CSV export flattens the transactions of successful imports into one
//! row each.

use crate::core::{detect_gaps, transaction_id, Gap, StatementSummary};
use crate::types::{
    Direction, ImportError, PipelineResult, TransactionType,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// Result of importing one input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    /// Input as named on the command line
    pub input: String,
    pub result: PipelineResult,
}

impl ReportEntry {
    pub fn new(input: impl Into<String>, result: PipelineResult) -> Self {
        ReportEntry {
            input: input.into(),
            result,
        }
    }
}

/// Counts over a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub imported: usize,
    pub duplicates: usize,
    /// Imported but failed balance validation
    pub invalid: usize,
    pub failed: usize,
}

/// Everything a batch run reports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub entries: Vec<ReportEntry>,
    pub gaps: Vec<Gap>,
}

impl BatchReport {
    /// Build the report, detecting gaps across the non-duplicate imports
    pub fn new(entries: Vec<ReportEntry>) -> Self {
        let mut summary = BatchSummary {
            total: entries.len(),
            ..BatchSummary::default()
        };
        let mut statements = Vec::new();

        for entry in &entries {
            match &entry.result {
                PipelineResult::Success(outcome) => {
                    if outcome.is_duplicate {
                        summary.duplicates += 1;
                    } else {
                        summary.imported += 1;
                        statements.push(StatementSummary::from(&outcome.statement));
                    }
                    if !outcome.validation.valid {
                        summary.invalid += 1;
                    }
                }
                PipelineResult::Failure(_) => summary.failed += 1,
            }
        }

        BatchReport {
            summary,
            gaps: detect_gaps(&statements),
            entries,
        }
    }

    /// Whether any input failed or produced an unbalanced statement
    pub fn has_problems(&self) -> bool {
        self.summary.failed > 0 || self.summary.invalid > 0
    }
}

/// Write the report as pretty-printed JSON followed by a newline
pub fn write_json_report(report: &BatchReport, output: &mut dyn Write) -> Result<(), ImportError> {
    serde_json::to_writer_pretty(&mut *output, report).map_err(|e| ImportError::Io {
        message: format!("Failed to write JSON report: {}", e),
    })?;
    output.write_all(b"\n")?;
    Ok(())
}

/// One CSV row per transaction
#[derive(Debug, Serialize)]
struct TransactionRow<'a> {
    statement_id: &'a str,
    transaction_id: String,
    iban: &'a str,
    posting_date: NaiveDate,
    value_date: NaiveDate,
    reference: &'a str,
    #[serde(rename = "type")]
    tx_type: TransactionType,
    direction: Direction,
    amount_eur: Decimal,
    amount_bgn: Decimal,
    description: &'a str,
    counterparty_name: Option<&'a str>,
    counterparty_iban: Option<&'a str>,
    duplicate: bool,
}

/// Write the transactions of every successful import as CSV
///
/// Failed inputs contribute no rows. Duplicates are included and flagged so
/// the consumer decides whether to skip them.
///
/// # Errors
///
/// Returns `Io` if serializing or flushing a row fails.
pub fn write_transactions_csv(
    entries: &[ReportEntry],
    output: &mut dyn Write,
) -> Result<(), ImportError> {
    let mut wtr = csv::Writer::from_writer(output);

    for outcome in entries.iter().filter_map(|entry| entry.result.outcome()) {
        let statement_id = outcome.identity.statement_id.as_str();
        let iban = outcome.statement.header.iban.as_str();

        for (index, tx) in outcome.statement.transactions.iter().enumerate() {
            let counterparty = tx.counterparty.as_ref();
            wtr.serialize(TransactionRow {
                statement_id,
                transaction_id: transaction_id(statement_id, tx, index),
                iban,
                posting_date: tx.posting_date,
                value_date: tx.value_date,
                reference: &tx.reference,
                tx_type: tx.tx_type,
                direction: tx.direction,
                amount_eur: tx.amount.eur,
                amount_bgn: tx.amount.bgn,
                description: &tx.description,
                counterparty_name: counterparty.and_then(|c| c.name.as_deref()),
                counterparty_iban: counterparty.and_then(|c| c.iban.as_deref()),
                duplicate: outcome.is_duplicate,
            })
            .map_err(|e| ImportError::Io {
                message: format!("Failed to write CSV row: {}", e),
            })?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ImportPipeline, PipelineConfig};
    use crate::io::PlainTextExtractor;
    use crate::types::{IdentityKey, Stage};
    use std::collections::HashSet;

    const STATEMENT: &str = include_str!("../../tests/fixtures/statement_jan_2024.txt");

    fn imported(text: &str) -> PipelineResult {
        ImportPipeline::new(PipelineConfig::default(), Box::new(PlainTextExtractor)).run_document(
            "statement.pdf",
            text.as_bytes(),
            &HashSet::<IdentityKey>::new(),
        )
    }

    fn failed() -> PipelineResult {
        PipelineResult::failure(Stage::Archive, &ImportError::invalid_password("statement.pdf"))
    }

    #[test]
    fn test_summary_counts() {
        let unbalanced = STATEMENT.replace("Крайно салдо: 800.00", "Крайно салдо: 850.00");
        let report = BatchReport::new(vec![
            ReportEntry::new("a.zip", imported(STATEMENT)),
            ReportEntry::new("b.zip", imported(&unbalanced)),
            ReportEntry::new("c.zip", failed()),
        ]);

        assert_eq!(
            report.summary,
            BatchSummary {
                total: 3,
                imported: 2,
                duplicates: 0,
                invalid: 1,
                failed: 1,
            }
        );
        assert!(report.has_problems());
    }

    #[test]
    fn test_clean_batch_has_no_problems() {
        let report = BatchReport::new(vec![ReportEntry::new("a.zip", imported(STATEMENT))]);
        assert!(!report.has_problems());
        assert!(report.gaps.is_empty());
    }

    #[test]
    fn test_json_report_shape() {
        let report = BatchReport::new(vec![
            ReportEntry::new("a.zip", imported(STATEMENT)),
            ReportEntry::new("c.zip", failed()),
        ]);
        let mut output = Vec::new();

        write_json_report(&report, &mut output).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(json["summary"]["total"], 2);
        assert_eq!(json["entries"][0]["input"], "a.zip");
        assert_eq!(json["entries"][0]["result"]["status"], "success");
        assert_eq!(
            json["entries"][0]["result"]["statement"]["header"]["iban"],
            "BG00UBBS00001234567890"
        );
        assert_eq!(json["entries"][1]["result"]["status"], "failure");
        assert_eq!(json["entries"][1]["result"]["stage"], "archive");
        assert_eq!(json["entries"][1]["result"]["kind"], "InvalidPassword");
    }

    #[test]
    fn test_csv_has_one_row_per_transaction() {
        let entries = vec![
            ReportEntry::new("a.zip", imported(STATEMENT)),
            ReportEntry::new("c.zip", failed()),
        ];
        let mut output = Vec::new();

        write_transactions_csv(&entries, &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output_str.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("statement_id,transaction_id,iban,posting_date"));
        assert!(lines[1].contains("SEPA_INCOMING"));
        assert!(lines[1].contains(",credit,300.00,586.75,"));
        assert!(lines[2].contains(",debit,-500.00,-977.92,"));
    }

    #[test]
    fn test_csv_without_transactions_is_empty() {
        let mut output = Vec::new();
        write_transactions_csv(&[ReportEntry::new("c.zip", failed())], &mut output).unwrap();
        assert!(output.is_empty());
    }
}
