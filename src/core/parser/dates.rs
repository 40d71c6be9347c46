//! Date formats used by the statements
//!
//! Headers spell dates as `01 ЯНУ 2024`. Transaction rows carry the posting
//! date as `DD/MM/YY` and the value date as `DD/MM` without a year.

use crate::types::ImportError;
use chrono::{Datelike, NaiveDate};

const MONTHS: [&str; 12] = [
    "ЯНУ", "ФЕВ", "МАР", "АПР", "МАЙ", "ЮНИ", "ЮЛИ", "АВГ", "СЕП", "ОКТ", "НОЕ", "ДЕК",
];

/// Month number (1-12) of a Bulgarian month abbreviation
pub fn month_number(abbreviation: &str) -> Option<u32> {
    let upper = abbreviation.to_uppercase();
    MONTHS
        .iter()
        .position(|month| *month == upper)
        .map(|index| index as u32 + 1)
}

/// Parse a `DD MMM YYYY` date split into its three tokens
pub fn parse_long_date(
    field: &str,
    day: &str,
    month: &str,
    year: &str,
) -> Result<NaiveDate, ImportError> {
    let malformed = || ImportError::malformed_date(field, &format!("{} {} {}", day, month, year));

    let month = month_number(month).ok_or_else(malformed)?;
    let day: u32 = day.parse().map_err(|_| malformed())?;
    let year: i32 = year.parse().map_err(|_| malformed())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(malformed)
}

/// Parse a `DD.MM.YYYY` date split into its three tokens
pub fn parse_numeric_date(
    field: &str,
    day: &str,
    month: &str,
    year: &str,
) -> Result<NaiveDate, ImportError> {
    let malformed = || ImportError::malformed_date(field, &format!("{}.{}.{}", day, month, year));

    let day: u32 = day.parse().map_err(|_| malformed())?;
    let month: u32 = month.parse().map_err(|_| malformed())?;
    let year: i32 = year.parse().map_err(|_| malformed())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(malformed)
}

/// Parse a `DD/MM/YY` posting date (years 2000-2099)
pub fn parse_posting_date(token: &str) -> Result<NaiveDate, ImportError> {
    let malformed = || ImportError::malformed_date("posting date", token);

    let mut parts = token.split('/');
    let (Some(day), Some(month), Some(year), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };

    let day: u32 = day.parse().map_err(|_| malformed())?;
    let month: u32 = month.parse().map_err(|_| malformed())?;
    let year: i32 = year.parse().map_err(|_| malformed())?;

    NaiveDate::from_ymd_opt(2000 + year, month, day).ok_or_else(malformed)
}

/// Resolve a `DD/MM` value date to the year that puts it closest to `posting`
///
/// A value date of `31/12` on a `02/01/25` posting lands in 2024.
pub fn resolve_value_date(token: &str, posting: NaiveDate) -> Result<NaiveDate, ImportError> {
    let malformed = || ImportError::malformed_date("value date", token);

    let (day, month) = token.split_once('/').ok_or_else(malformed)?;
    let day: u32 = day.parse().map_err(|_| malformed())?;
    let month: u32 = month.parse().map_err(|_| malformed())?;

    let year = posting.year();
    [year, year - 1, year + 1]
        .into_iter()
        .filter_map(|candidate| NaiveDate::from_ymd_opt(candidate, month, day))
        .min_by_key(|date| (*date - posting).num_days().abs())
        .ok_or_else(malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[rstest]
    #[case("ЯНУ", 1)]
    #[case("МАЙ", 5)]
    #[case("дек", 12)]
    fn test_month_number(#[case] abbreviation: &str, #[case] expected: u32) {
        assert_eq!(month_number(abbreviation), Some(expected));
    }

    #[test]
    fn test_long_date() {
        assert_eq!(
            parse_long_date("period start", "01", "ЯНУ", "2024").unwrap(),
            ymd(2024, 1, 1)
        );
    }

    #[rstest]
    #[case::unknown_month("01", "JAN", "2024")]
    #[case::impossible_day("30", "ФЕВ", "2024")]
    fn test_long_date_rejects(#[case] day: &str, #[case] month: &str, #[case] year: &str) {
        let err = parse_long_date("period start", day, month, year).unwrap_err();
        assert_eq!(
            err,
            ImportError::malformed_date("period start", &format!("{} {} {}", day, month, year))
        );
    }

    #[test]
    fn test_numeric_date() {
        assert_eq!(
            parse_numeric_date("period end", "31", "01", "2024").unwrap(),
            ymd(2024, 1, 31)
        );
        assert!(parse_numeric_date("period end", "31", "13", "2024").is_err());
    }

    #[test]
    fn test_posting_date() {
        assert_eq!(parse_posting_date("05/01/24").unwrap(), ymd(2024, 1, 5));
        assert!(parse_posting_date("32/01/24").is_err());
        assert!(parse_posting_date("05/01").is_err());
    }

    #[rstest]
    #[case::same_year("05/01", ymd(2024, 1, 5), ymd(2024, 1, 5))]
    #[case::previous_year("31/12", ymd(2025, 1, 2), ymd(2024, 12, 31))]
    #[case::next_year("02/01", ymd(2024, 12, 30), ymd(2025, 1, 2))]
    #[case::leap_day("29/02", ymd(2024, 3, 1), ymd(2024, 2, 29))]
    fn test_value_date_resolution(
        #[case] token: &str,
        #[case] posting: NaiveDate,
        #[case] expected: NaiveDate,
    ) {
        assert_eq!(resolve_value_date(token, posting).unwrap(), expected);
    }

    #[test]
    fn test_value_date_rejects_impossible_dates() {
        let err = resolve_value_date("31/04", ymd(2024, 4, 30)).unwrap_err();
        assert_eq!(err, ImportError::malformed_date("value date", "31/04"));
    }
}
