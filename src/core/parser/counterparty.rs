//! Counterparty extraction from the continuation lines of a transaction
//!
//! Continuation lines mix the counterparty name, its bank and IBAN, payment
//! references and card-terminal noise in no fixed order. Each line is claimed
//! by the first category it fits.

use crate::types::{Counterparty, TransactionType};
use regex::Regex;
use std::sync::OnceLock;

fn bank_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)ОТ БАНКА\s*[:\s]+(.+)").expect("invalid bank regex"))
}

fn iban_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(BG\d{2}[A-Z]{4}\d{10,16})").expect("invalid counterparty iban regex"))
}

/// Lines that are never a counterparty: POS codes, terminal ids, card references
fn noise_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"^(?:КАРТОВА ТРАНЗАКЦИЯ",
            r"|(?:PO|SI|VI|R1)\d{6}",
            r"|\d{8}-\d+-\d+",
            r"|\d{8}-[A-Z]\d+-\d+",
            r"|\d{4}X\d{4}-\d+-\d+",
            r"|ПРЕВОД)$",
        ))
        .expect("invalid noise regex")
    })
}

fn long_reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{7,}$").expect("invalid reference regex"))
}

fn card_merchant_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Z0-9\s\-]+-[A-Z\s\.]+-(?:BG|RO|GR|TR)$").expect("invalid merchant regex")
    })
}

fn numeric_only_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\d\-/\.\s]+$").expect("invalid numeric line regex"))
}

fn invoice_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)[ФF][\.\s]").expect("invalid invoice regex"))
}

/// Extract counterparty details from the lines following a transaction's first line
///
/// Returns `None` when no line yields any detail.
pub fn extract_counterparty(lines: &[&str], tx_type: TransactionType) -> Option<Counterparty> {
    let mut counterparty = Counterparty::default();

    for line in lines.iter().map(|line| line.trim()).filter(|line| !line.is_empty()) {
        if line.to_uppercase().contains("ОТ БАНКА") {
            if let Some(caps) = bank_re().captures(line) {
                counterparty.bank = Some(caps[1].trim().to_string());
            }
            continue;
        }

        // May follow a SWIFT code on the same line
        if let Some(caps) = iban_re().captures(line) {
            counterparty.iban = Some(caps[1].to_string());
            continue;
        }

        if noise_re().is_match(line) {
            continue;
        }

        if long_reference_re().is_match(line) {
            counterparty.reference.get_or_insert_with(|| line.to_string());
            continue;
        }

        if tx_type == TransactionType::CardTransaction && card_merchant_re().is_match(line) {
            counterparty.name.get_or_insert_with(|| line.to_string());
            continue;
        }

        if counterparty.name.is_none() && line.chars().count() > 2 && !numeric_only_re().is_match(line) {
            counterparty.name = Some(line.to_string());
            continue;
        }

        if counterparty.reference.is_none()
            && counterparty.name.is_some()
            && (invoice_re().is_match(line) || line.chars().all(|c| c.is_ascii_digit()))
        {
            counterparty.reference = Some(line.to_string());
        }
    }

    (!counterparty.is_empty()).then_some(counterparty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sepa_counterparty() {
        let lines = [
            "ACME LTD",
            "UBBSBGSF BG41UBBS80021012345678",
            "2400003707",
        ];

        let counterparty = extract_counterparty(&lines, TransactionType::SepaIncoming).unwrap();

        assert_eq!(counterparty.name.as_deref(), Some("ACME LTD"));
        assert_eq!(counterparty.iban.as_deref(), Some("BG41UBBS80021012345678"));
        assert_eq!(counterparty.reference.as_deref(), Some("2400003707"));
        assert_eq!(counterparty.bank, None);
    }

    #[test]
    fn test_bank_line() {
        let lines = ["ОТ БАНКА : ОБЕДИНЕНА БЪЛГАРСКА БАНКА", "ИВАН ИВАНОВ"];

        let counterparty = extract_counterparty(&lines, TransactionType::SepaIncoming).unwrap();

        assert_eq!(counterparty.bank.as_deref(), Some("ОБЕДИНЕНА БЪЛГАРСКА БАНКА"));
        assert_eq!(counterparty.name.as_deref(), Some("ИВАН ИВАНОВ"));
    }

    #[test]
    fn test_card_merchant_skips_terminal_noise() {
        let lines = [
            "PO123456",
            "10077271-556010-20260105",
            "5574X4418-600500556010-000671255870",
            "LIDL SOFIA-SOFIA-BG",
        ];

        let counterparty =
            extract_counterparty(&lines, TransactionType::CardTransaction).unwrap();

        assert_eq!(counterparty.name.as_deref(), Some("LIDL SOFIA-SOFIA-BG"));
        assert_eq!(counterparty.reference, None);
    }

    #[test]
    fn test_invoice_reference_after_name() {
        let lines = ["ДОСТАВЧИК ООД", "F. 2400003707 19.12.2025"];

        let counterparty = extract_counterparty(&lines, TransactionType::SepaOutgoing).unwrap();

        assert_eq!(counterparty.name.as_deref(), Some("ДОСТАВЧИК ООД"));
        assert_eq!(
            counterparty.reference.as_deref(),
            Some("F. 2400003707 19.12.2025")
        );
    }

    #[test]
    fn test_numeric_lines_are_not_names() {
        let lines = ["12/01/2024", "ПРЕВОД"];
        assert_eq!(
            extract_counterparty(&lines, TransactionType::InternalTransfer),
            None
        );
    }
}
