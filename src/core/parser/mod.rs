//! Statement parser
//!
//! Turns the extracted text of a statement into a [`ParsedStatement`]:
//! header fields through independent extraction rules, transactions through
//! date-led block segmentation. Parsing is a pure function of the text, so
//! the same text always yields an equal statement.
//!
//! Submodules:
//! - `header`: header and footer field rules
//! - `transactions`: block segmentation and per-block parsing
//! - `counterparty`: counterparty details from continuation lines
//! - `classify`: ordered transaction type rules
//! - `numeric`: locale-tolerant amount parsing
//! - `dates`: Bulgarian date formats

pub mod classify;
pub mod counterparty;
pub mod dates;
pub mod header;
pub mod numeric;
pub mod transactions;

use crate::types::{ImportError, ParsedStatement};

pub use classify::classify;
pub use header::extract_header;
pub use numeric::parse_amount;
pub use transactions::extract_transactions;

/// Parse statement text into a structured statement
///
/// # Arguments
///
/// * `text` - Plain text as returned by a text extractor
///
/// # Returns
///
/// The header plus all transactions in document order. A statement without
/// transactions is returned with a review flag rather than an error.
///
/// # Errors
///
/// Returns the first header, numeric, date or block error encountered.
pub fn parse(text: &str) -> Result<ParsedStatement, ImportError> {
    let text = text.replace("\r\n", "\n");
    let header = extract_header(&text)?;
    let transactions = extract_transactions(&text)?;
    Ok(ParsedStatement::new(header, transactions))
}
