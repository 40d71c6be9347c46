//! Amount parsing for statement figures
//!
//! Figures appear as `1,234.56`, `1 234,56`, `300.00` or `-12.5`. A token is
//! accepted only when its separators can be read one way:
//!
//! - with both `,` and `.` present, the last one is the decimal separator and
//!   the other must group the integer part in threes
//! - a single separator followed by exactly three digits (`1,000`) could be
//!   either; such tokens are rejected
//! - a separator repeated (`1,000,000`) can only be a thousands separator
//!
//! Spaces (including no-break spaces) are accepted as thousands separators.

use crate::types::{ImportError, Money};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Regex fragment matching one amount token as it appears in statement text
///
/// Space-grouped figures (`1 000,00`) are only taken in groups of three so a
/// reference number left of an amount is not swallowed into it.
pub const AMOUNT_TOKEN: &str =
    r"-?(?:\d{1,3}(?:[ \x{A0}\x{202F}]\d{3})+(?:[,\.]\d+)?|\d[\d,\.]*)";

/// Parse a signed decimal amount
///
/// # Errors
///
/// Returns `MalformedNumericValue` naming `field` for any token that is not
/// an unambiguous number.
pub fn parse_amount(field: &str, token: &str) -> Result<Decimal, ImportError> {
    let trimmed = token.trim();
    let malformed = || ImportError::malformed_number(field, trimmed);

    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let body: String = unsigned.chars().filter(|c| !is_group_space(*c)).collect();

    let known_chars = body
        .chars()
        .all(|c| c.is_ascii_digit() || c == ',' || c == '.');
    let digit_bounded = body.starts_with(|c: char| c.is_ascii_digit())
        && body.ends_with(|c: char| c.is_ascii_digit());
    if !known_chars || !digit_bounded {
        return Err(malformed());
    }

    let (integer, fraction) = split_decimal(&body).ok_or_else(malformed)?;
    let digits: String = integer.chars().filter(|c| c.is_ascii_digit()).collect();
    let canonical = if fraction.is_empty() {
        digits
    } else {
        format!("{}.{}", digits, fraction)
    };

    let value = Decimal::from_str(&canonical).map_err(|_| malformed())?;
    Ok(if negative { -value } else { value })
}

/// Parse an `<eur> EUR / <bgn> BGN` pair whose tokens were already isolated
pub fn parse_money(field: &str, eur: &str, bgn: &str) -> Result<Money, ImportError> {
    Ok(Money::new(
        parse_amount(&format!("{} (EUR)", field), eur)?,
        parse_amount(&format!("{} (BGN)", field), bgn)?,
    ))
}

fn is_group_space(c: char) -> bool {
    matches!(c, ' ' | '\u{a0}' | '\u{202f}')
}

/// Split into integer and fraction parts, or `None` when the separators are ambiguous
fn split_decimal(body: &str) -> Option<(&str, &str)> {
    let last_comma = body.rfind(',');
    let last_dot = body.rfind('.');

    match (last_comma, last_dot) {
        (None, None) => Some((body, "")),
        (Some(comma), Some(dot)) => {
            let (decimal_at, decimal_sep, group_sep) = if comma > dot {
                (comma, ',', '.')
            } else {
                (dot, '.', ',')
            };
            let integer = &body[..decimal_at];
            if integer.contains(decimal_sep) || !valid_groups(integer, group_sep) {
                return None;
            }
            Some((integer, &body[decimal_at + 1..]))
        }
        (Some(at), None) | (None, Some(at)) => {
            let separator = if last_comma.is_some() { ',' } else { '.' };
            if body.matches(separator).count() > 1 {
                return valid_groups(body, separator).then_some((body, ""));
            }
            let fraction = &body[at + 1..];
            if fraction.len() == 3 {
                return None;
            }
            Some((&body[..at], fraction))
        }
    }
}

fn valid_groups(integer: &str, separator: char) -> bool {
    let mut groups = integer.split(separator);
    let leading = groups
        .next()
        .is_some_and(|group| (1..=3).contains(&group.len()));
    leading && groups.all(|group| group.len() == 3)
}
