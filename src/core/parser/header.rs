//! Statement header extraction
//!
//! Every header field has an ordered list of extraction rules. A rule is a
//! pure function from the full statement text to an optional value; the first
//! rule that finds its field wins. A rule that finds its field but cannot read
//! it (bad number, unknown month) fails the parse instead of letting a later
//! rule guess.

use super::dates::{parse_long_date, parse_numeric_date};
use super::numeric::{parse_money, AMOUNT_TOKEN};
use crate::types::{AccountHolder, ImportError, Money, Period, StatementHeader, Turnover};
use chrono::NaiveDate;
use regex::{Captures, Regex};
use std::sync::OnceLock;

type Rule<T> = fn(&str) -> Result<Option<T>, ImportError>;

/// A named header field and the rules that can extract it
struct FieldExtractor<T: 'static> {
    field: &'static str,
    rules: &'static [Rule<T>],
}

impl<T> FieldExtractor<T> {
    fn optional(&self, text: &str) -> Result<Option<T>, ImportError> {
        for rule in self.rules {
            if let Some(value) = rule(text)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn required(&self, text: &str) -> Result<T, ImportError> {
        self.optional(text)?
            .ok_or_else(|| ImportError::header_field_missing(self.field))
    }
}

const ACCOUNT_HOLDER: FieldExtractor<(String, String)> = FieldExtractor {
    field: "account_holder",
    rules: &[holder_with_suffix, holder_to_line_end],
};

const ADDRESS: FieldExtractor<String> = FieldExtractor {
    field: "address",
    rules: &[address_before_iban],
};

const IBAN: FieldExtractor<String> = FieldExtractor {
    field: "iban",
    rules: &[iban_labelled, iban_unlabelled],
};

const CURRENCY: FieldExtractor<String> = FieldExtractor {
    field: "currency",
    rules: &[currency_labelled],
};

const PERIOD: FieldExtractor<Period> = FieldExtractor {
    field: "period",
    rules: &[period_long_form, period_numeric_form],
};

const STATEMENT_NUMBER: FieldExtractor<(u32, NaiveDate)> = FieldExtractor {
    field: "statement_number",
    rules: &[statement_number_and_date],
};

const OPENING_BALANCE: FieldExtractor<Money> = FieldExtractor {
    field: "opening_balance",
    rules: &[opening_balance],
};

const CLOSING_BALANCE: FieldExtractor<Money> = FieldExtractor {
    field: "closing_balance",
    rules: &[last_closing_balance],
};

const TURNOVER: FieldExtractor<Turnover> = FieldExtractor {
    field: "turnover",
    rules: &[period_turnover],
};

const ACCUMULATED_TURNOVER: FieldExtractor<Turnover> = FieldExtractor {
    field: "accumulated_turnover",
    rules: &[accumulated_turnover],
};

/// Extract and check every header and footer field
///
/// # Errors
///
/// - `HeaderFieldMissing` when a required field matches none of its rules
/// - `MalformedNumericValue` / `MalformedDate` for unreadable values
/// - `InvalidIban` when the IBAN does not have the expected structure
/// - `InvalidPeriod` when the period ends before it starts
pub fn extract_header(text: &str) -> Result<StatementHeader, ImportError> {
    let (code, name) = ACCOUNT_HOLDER.required(text)?;
    let address = ADDRESS.optional(text)?.unwrap_or_default();
    let iban = IBAN.required(text)?;
    let currency = CURRENCY
        .optional(text)?
        .unwrap_or_else(|| "EUR".to_string());
    let period = PERIOD.required(text)?;
    let (statement_number, statement_date) = STATEMENT_NUMBER.required(text)?;
    let opening_balance = OPENING_BALANCE.required(text)?;
    let closing_balance = CLOSING_BALANCE.required(text)?;
    let turnover = TURNOVER.optional(text)?;
    let accumulated_turnover = ACCUMULATED_TURNOVER.optional(text)?;

    if !iban_structure_re().is_match(&iban) {
        return Err(ImportError::InvalidIban { value: iban });
    }
    if period.start > period.end {
        return Err(ImportError::InvalidPeriod {
            start: period.start.to_string(),
            end: period.end.to_string(),
        });
    }

    Ok(StatementHeader {
        account_holder: AccountHolder {
            code,
            name,
            address,
        },
        iban,
        currency,
        period,
        statement_number,
        statement_date,
        opening_balance,
        closing_balance,
        turnover,
        accumulated_turnover,
    })
}

fn iban_structure_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{2}\d{2}[A-Z0-9]{11,30}$").expect("invalid iban regex"))
}

// Account holder

fn holder_with_suffix(text: &str) -> Result<Option<(String, String)>, ImportError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"Титуляр на сметката\s+(\d+)\s+(.+?)(?:\s+\d{4}|\s+ДАО)")
            .expect("invalid holder regex")
    });
    Ok(re
        .captures(text)
        .map(|caps| (caps[1].to_string(), caps[2].trim().to_string())))
}

fn holder_to_line_end(text: &str) -> Result<Option<(String, String)>, ImportError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?m)Титуляр на сметката\s+(\d+)[ \t]+(\S.*?)[ \t]*$")
            .expect("invalid holder line regex")
    });
    Ok(re
        .captures(text)
        .map(|caps| (caps[1].to_string(), caps[2].to_string())))
}

// Address

fn address_before_iban(text: &str) -> Result<Option<String>, ImportError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?s)Адрес\s+(.+?)\s*IBAN:").expect("invalid address regex"));
    Ok(re
        .captures(text)
        .map(|caps| caps[1].split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|address| !address.is_empty()))
}

// IBAN

fn iban_labelled(text: &str) -> Result<Option<String>, ImportError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"IBAN:\s*([A-Z]{2}\w+)").expect("invalid iban label regex"));
    Ok(re.captures(text).map(|caps| caps[1].to_string()))
}

fn iban_unlabelled(text: &str) -> Result<Option<String>, ImportError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"IBAN\s+([A-Z]{2}\d{2}[A-Z0-9]{11,30})\b").expect("invalid iban regex")
    });
    Ok(re.captures(text).map(|caps| caps[1].to_string()))
}

// Currency

fn currency_labelled(text: &str) -> Result<Option<String>, ImportError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"Валута\s+([A-Z]{3})").expect("invalid currency regex"));
    Ok(re.captures(text).map(|caps| caps[1].to_string()))
}

// Period

fn period_long_form(text: &str) -> Result<Option<Period>, ImportError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r"Период на извлечението:\s*ОТ\s+(\d{2})\s+(\w+)\s+(\d{4})\s+ДО\s+(\d{2})\s+(\w+)\s+(\d{4})",
        )
        .expect("invalid period regex")
    });
    let Some(caps) = re.captures(text) else {
        return Ok(None);
    };
    Ok(Some(Period {
        start: parse_long_date("period start", &caps[1], &caps[2], &caps[3])?,
        end: parse_long_date("period end", &caps[4], &caps[5], &caps[6])?,
    }))
}

fn period_numeric_form(text: &str) -> Result<Option<Period>, ImportError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r"Период на извлечението:\s*ОТ\s+(\d{2})\.(\d{2})\.(\d{4})\s+ДО\s+(\d{2})\.(\d{2})\.(\d{4})",
        )
        .expect("invalid numeric period regex")
    });
    let Some(caps) = re.captures(text) else {
        return Ok(None);
    };
    Ok(Some(Period {
        start: parse_numeric_date("period start", &caps[1], &caps[2], &caps[3])?,
        end: parse_numeric_date("period end", &caps[4], &caps[5], &caps[6])?,
    }))
}

// Statement number and date

fn statement_number_and_date(text: &str) -> Result<Option<(u32, NaiveDate)>, ImportError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"Пореден номер / Дата:\s*(\d+)\s*/\s*(\d{2})\s+(\w+)\s+(\d{4})")
            .expect("invalid statement number regex")
    });
    let Some(caps) = re.captures(text) else {
        return Ok(None);
    };
    let number = caps[1]
        .parse()
        .map_err(|_| ImportError::malformed_number("statement number", &caps[1]))?;
    let date = parse_long_date("statement date", &caps[2], &caps[3], &caps[4])?;
    Ok(Some((number, date)))
}

// Balances

fn money_from(caps: &Captures<'_>, field: &str, eur: usize, bgn: usize) -> Result<Money, ImportError> {
    parse_money(field, &caps[eur], &caps[bgn])
}

fn opening_balance(text: &str) -> Result<Option<Money>, ImportError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(&format!(
            r"Начално салдо:\s*({0})\s*EUR\s*/\s*({0})\s*BGN",
            AMOUNT_TOKEN
        ))
            .expect("invalid opening balance regex")
    });
    re.captures(text)
        .map(|caps| money_from(&caps, "opening balance", 1, 2))
        .transpose()
}

/// Notice pages may follow the balance page, so the last occurrence counts
fn last_closing_balance(text: &str) -> Result<Option<Money>, ImportError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(&format!(
            r"Крайно салдо:\s*({0})\s*EUR\s*/\s*({0})\s*BGN",
            AMOUNT_TOKEN
        ))
            .expect("invalid closing balance regex")
    });
    re.captures_iter(text)
        .last()
        .map(|caps| money_from(&caps, "closing balance", 1, 2))
        .transpose()
}

// Footer turnover
//
// Обороти: Натрупани обороти:
// Дебит: 500.00 EUR / 977.92 BGN Дебит: 1,570.94 EUR / 3,072.49 BGN
// Кредит: 300.00 EUR / 586.75 BGN Кредит: 144,280.68 EUR / 282,188.48 BGN

fn debit_turnover_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"(?m)^Дебит:\s*({0})\s*EUR\s*/\s*({0})\s*BGN(?:\s+Дебит:\s*({0})\s*EUR\s*/\s*({0})\s*BGN)?",
            AMOUNT_TOKEN
        ))
        .expect("invalid debit turnover regex")
    })
}

fn credit_turnover_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"(?m)^Кредит:\s*({0})\s*EUR\s*/\s*({0})\s*BGN(?:\s+Кредит:\s*({0})\s*EUR\s*/\s*({0})\s*BGN)?",
            AMOUNT_TOKEN
        ))
        .expect("invalid credit turnover regex")
    })
}

/// EUR/BGN token pairs of the last footer line matched by `re`, one per column
fn turnover_columns<'t>(re: &Regex, text: &'t str) -> Vec<(&'t str, &'t str)> {
    let Some(caps) = re.captures_iter(text).last() else {
        return Vec::new();
    };
    [(1, 2), (3, 4)]
        .into_iter()
        .filter_map(|(eur, bgn)| Some((caps.get(eur)?.as_str(), caps.get(bgn)?.as_str())))
        .collect()
}

fn turnover_at(text: &str, column: usize, field: &str) -> Result<Option<Turnover>, ImportError> {
    let debits = turnover_columns(debit_turnover_re(), text);
    let credits = turnover_columns(credit_turnover_re(), text);
    let (Some((debit_eur, debit_bgn)), Some((credit_eur, credit_bgn))) =
        (debits.get(column), credits.get(column))
    else {
        return Ok(None);
    };
    Ok(Some(Turnover {
        debit: parse_money(&format!("{} debit", field), debit_eur, debit_bgn)?,
        credit: parse_money(&format!("{} credit", field), credit_eur, credit_bgn)?,
    }))
}

fn period_turnover(text: &str) -> Result<Option<Turnover>, ImportError> {
    turnover_at(text, 0, "turnover")
}

fn accumulated_turnover(text: &str) -> Result<Option<Turnover>, ImportError> {
    turnover_at(text, 1, "accumulated turnover")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;
    use rust_decimal::Decimal;

    const HEADER: &str = "\
ОББ Извлечение по сметка
Титуляр на сметката 1234567 ИВАН ПЕТРОВ ИВАНОВ ДАО 123
Адрес ГР. СОФИЯ
УЛ. ВИТОША 1
IBAN: BG00UBBS00001234567890
Валута EUR
Период на извлечението: ОТ 01 ЯНУ 2024 ДО 31 ЯНУ 2024
Пореден номер / Дата: 1 / 31 ЯНУ 2024
Начално салдо: 1,000.00 EUR / 1,955.83 BGN
Обороти: Натрупани обороти:
Дебит: 500.00 EUR / 977.92 BGN Дебит: 1,570.94 EUR / 3,072.49 BGN
Кредит: 300.00 EUR / 586.75 BGN Кредит: 144,280.68 EUR / 282,188.48 BGN
Крайно салдо: 800.00 EUR / 1,564.66 BGN
";

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn money(eur: i64, bgn: i64) -> Money {
        Money::new(Decimal::new(eur, 2), Decimal::new(bgn, 2))
    }

    #[test]
    fn test_extract_header_fields() {
        let header = extract_header(HEADER).unwrap();

        assert_eq!(header.account_holder.code, "1234567");
        assert_eq!(header.account_holder.name, "ИВАН ПЕТРОВ ИВАНОВ");
        assert_eq!(header.account_holder.address, "ГР. СОФИЯ УЛ. ВИТОША 1");
        assert_eq!(header.iban, "BG00UBBS00001234567890");
        assert_eq!(header.currency, "EUR");
        assert_eq!(header.period.start, ymd(2024, 1, 1));
        assert_eq!(header.period.end, ymd(2024, 1, 31));
        assert_eq!(header.statement_number, 1);
        assert_eq!(header.statement_date, ymd(2024, 1, 31));
        assert_eq!(header.opening_balance, money(100000, 195583));
        assert_eq!(header.closing_balance, money(80000, 156466));
    }

    #[test]
    fn test_footer_turnover_columns() {
        let header = extract_header(HEADER).unwrap();

        assert_eq!(
            header.turnover,
            Some(Turnover {
                debit: money(50000, 97792),
                credit: money(30000, 58675),
            })
        );
        assert_eq!(
            header.accumulated_turnover,
            Some(Turnover {
                debit: money(157094, 307249),
                credit: money(14428068, 28218848),
            })
        );
    }

    #[test]
    fn test_optional_fields_default() {
        let text = HEADER
            .replace("Валута EUR\n", "")
            .replace("Адрес ГР. СОФИЯ\nУЛ. ВИТОША 1\n", "");
        let text: String = text
            .lines()
            .filter(|line| !line.starts_with("Дебит:") && !line.starts_with("Кредит:"))
            .map(|line| format!("{}\n", line))
            .collect();

        let header = extract_header(&text).unwrap();

        assert_eq!(header.currency, "EUR");
        assert_eq!(header.account_holder.address, "");
        assert_eq!(header.turnover, None);
        assert_eq!(header.accumulated_turnover, None);
    }

    #[test]
    fn test_closing_balance_uses_last_occurrence() {
        let text = HEADER.replace(
            "Крайно салдо: 800.00",
            "Крайно салдо: 10.00 EUR / 19.56 BGN\nКрайно салдо: 800.00",
        );
        let header = extract_header(&text).unwrap();
        assert_eq!(header.closing_balance, money(80000, 156466));
    }

    #[test]
    fn test_holder_without_suffix_uses_line_end() {
        let text = HEADER.replace(" ДАО 123", "");
        let header = extract_header(&text).unwrap();
        assert_eq!(header.account_holder.name, "ИВАН ПЕТРОВ ИВАНОВ");
    }

    #[test]
    fn test_numeric_period_rule() {
        let text = HEADER.replace(
            "ОТ 01 ЯНУ 2024 ДО 31 ЯНУ 2024",
            "ОТ 01.02.2024 ДО 29.02.2024",
        );
        let header = extract_header(&text).unwrap();
        assert_eq!(header.period.start, ymd(2024, 2, 1));
        assert_eq!(header.period.end, ymd(2024, 2, 29));
    }

    #[test]
    fn test_missing_required_fields() {
        for (needle, field) in [
            ("IBAN: BG00UBBS00001234567890\n", "iban"),
            ("Начално салдо", "opening_balance"),
            ("Крайно салдо", "closing_balance"),
            ("Период на извлечението", "period"),
            ("Пореден номер", "statement_number"),
            ("Титуляр на сметката", "account_holder"),
        ] {
            let text = HEADER.replace(needle, "");
            let err = extract_header(&text).unwrap_err();
            assert_eq!(err, ImportError::header_field_missing(field), "removing {}", needle);
        }
    }

    #[test]
    fn test_invalid_iban_structure() {
        let text = HEADER.replace("BG00UBBS00001234567890", "BG00UBBS");
        let err = extract_header(&text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIban);
    }

    #[test]
    fn test_period_end_before_start() {
        let text = HEADER.replace("ДО 31 ЯНУ 2024", "ДО 31 ДЕК 2023");
        let err = extract_header(&text).unwrap_err();
        assert_eq!(
            err,
            ImportError::InvalidPeriod {
                start: "2024-01-01".to_string(),
                end: "2023-12-31".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_month_is_malformed_date() {
        let text = HEADER.replace("ОТ 01 ЯНУ", "ОТ 01 XYZ");
        let err = extract_header(&text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDate);
    }

    #[test]
    fn test_ambiguous_balance_is_rejected() {
        let text = HEADER.replace("1,000.00 EUR", "1,000 EUR");
        let err = extract_header(&text).unwrap_err();
        assert_eq!(
            err,
            ImportError::malformed_number("opening balance (EUR)", "1,000")
        );
    }

    #[test]
    fn test_space_grouped_balances() {
        let text = HEADER
            .replace(
                "Начално салдо: 1,000.00 EUR / 1,955.83 BGN",
                "Начално салдо: 1 000,00 EUR / 1\u{a0}955,83 BGN",
            )
            .replace(
                "Кредит: 144,280.68 EUR / 282,188.48 BGN",
                "Кредит: 144 280.68 EUR / 282 188.48 BGN",
            );

        let header = extract_header(&text).unwrap();

        assert_eq!(header.opening_balance, money(100000, 195583));
        assert_eq!(
            header.accumulated_turnover.unwrap().credit,
            money(14428068, 28218848)
        );
    }

    #[test]
    fn test_ambiguous_space_grouped_balance_is_malformed() {
        let text = HEADER.replace("1,000.00 EUR", "1 000,000 EUR");
        let err = extract_header(&text).unwrap_err();
        assert_eq!(
            err,
            ImportError::malformed_number("opening balance (EUR)", "1 000,000")
        );
    }
}
