//! Transaction block segmentation and parsing
//!
//! A transaction starts at a line led by `DD/MM/YY DD/MM` and runs until the
//! next such line or the statement footer. Page furniture repeated on every
//! page is dropped. The first line carrying `<eur> EUR / <bgn> BGN` at its end
//! holds the amount; every other line is description.

use super::classify::classify;
use super::counterparty::extract_counterparty;
use super::dates::{parse_posting_date, resolve_value_date};
use super::numeric::{parse_money, AMOUNT_TOKEN};
use crate::types::{ImportError, Money, Transaction};
use regex::Regex;
use std::sync::OnceLock;

const FOOTER_MARKERS: [&str; 3] = ["Обороти:", "Натрупани обороти", "Крайно салдо:"];

fn date_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{2}/\d{2}/\d{2})\s+(\d{2}/\d{2})\s+").expect("invalid date line regex")
    })
}

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"({0})\s*EUR\s*/\s*({0})\s*BGN\s*$", AMOUNT_TOKEN))
            .expect("invalid amount regex")
    })
}

/// Lines of one transaction, borrowed from the statement text
#[derive(Debug)]
struct Block<'t> {
    /// 1-based line number of the date line
    line_number: usize,
    first_line: &'t str,
    posting_date: &'t str,
    value_date: &'t str,
    /// Remainder of the date line, then the continuation lines
    lines: Vec<&'t str>,
}

fn is_footer(line: &str) -> bool {
    FOOTER_MARKERS.iter().any(|marker| line.starts_with(marker))
}

fn is_page_furniture(line: &str) -> bool {
    line.starts_with("Междинно салдо")
        || line.starts_with("Страница")
        || line.starts_with("Счет. Дата")
        || line.contains("ОББ Извлечение")
}

fn segment(text: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut current: Option<Block<'_>> = None;

    for (index, line) in text.lines().enumerate() {
        if let Some(caps) = date_line_re().captures(line) {
            blocks.extend(current.take());
            let (Some(posting), Some(value)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            current = Some(Block {
                line_number: index + 1,
                first_line: line,
                posting_date: posting.as_str(),
                value_date: value.as_str(),
                lines: vec![&line[caps[0].len()..]],
            });
            continue;
        }

        let Some(block) = current.as_mut() else {
            continue;
        };
        let trimmed = line.trim();
        if is_footer(trimmed) {
            blocks.extend(current.take());
        } else if !trimmed.is_empty() && !is_page_furniture(trimmed) {
            block.lines.push(trimmed);
        }
    }

    blocks.extend(current);
    blocks
}

fn parse_block(block: &Block<'_>) -> Result<Transaction, ImportError> {
    let posting_date = parse_posting_date(block.posting_date)?;
    let value_date = resolve_value_date(block.value_date, posting_date)?;

    let mut amount: Option<Money> = None;
    let mut description_lines: Vec<&str> = Vec::with_capacity(block.lines.len());
    for (index, line) in block.lines.iter().enumerate() {
        let text = match amount_re().captures(line) {
            Some(caps) if amount.is_none() => {
                amount = Some(parse_money("transaction amount", &caps[1], &caps[2])?);
                let start = caps.get(0).map_or(line.len(), |m| m.start());
                line[..start].trim()
            }
            _ => line.trim(),
        };
        // The first line is always kept so continuation lines stay at index 1..
        if index == 0 || !text.is_empty() {
            description_lines.push(text);
        }
    }

    let amount =
        amount.ok_or_else(|| ImportError::unrecognized_block(block.line_number, block.first_line))?;

    let (reference, description) = match description_lines[0].split_once(char::is_whitespace) {
        Some((reference, rest)) => (reference.to_string(), rest.trim().to_string()),
        None => (description_lines[0].to_string(), String::new()),
    };
    let raw_description = description_lines
        .iter()
        .filter(|line| !line.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let tx_type = classify(&raw_description);
    let counterparty = extract_counterparty(&description_lines[1..], tx_type);

    Ok(Transaction::new(
        posting_date,
        value_date,
        reference,
        tx_type,
        amount,
        description,
        raw_description,
        counterparty,
    ))
}

/// Extract every transaction in document order
///
/// # Errors
///
/// Fails on the first block without an amount (`UnrecognizedTransactionBlock`)
/// or with an unreadable date or amount.
pub fn extract_transactions(text: &str) -> Result<Vec<Transaction>, ImportError> {
    segment(text).iter().map(parse_block).collect()
}
