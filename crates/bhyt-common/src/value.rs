//! Polars `AnyValue` extraction and settlement-extract text parsing.
//!
//! The warehouse frame holds only text, Int and Float columns, but source
//! extracts carry dates as integer `YYYYMMDD` and timestamps as compact
//! digit runs (`202601020735`), sometimes guarded with a leading apostrophe
//! by the spreadsheet export. The helpers here normalize both.

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::AnyValue;

/// Converts a Polars `AnyValue` to its display `String`.
///
/// Null becomes the empty string; floats drop a trailing `.0` so identifier
/// codes survive a numeric detour (`1234.0` -> `"1234"`).
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Like [`any_to_string`], but empty/whitespace-only results become `None`.
pub fn any_to_string_non_empty(value: AnyValue<'_>) -> Option<String> {
    let s = any_to_string(value);
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Formats a float without an unnecessary fractional part.
pub fn format_numeric(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Converts an `AnyValue` to `f64`; null, non-numeric and unparsable text
/// give `None`.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    }
}

/// Converts an `AnyValue` to `i64`; floats truncate, text parses leniently.
pub fn any_to_i64(value: AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(i64::from(v)),
        AnyValue::Int16(v) => Some(i64::from(v)),
        AnyValue::Int32(v) => Some(i64::from(v)),
        AnyValue::Int64(v) => Some(v),
        AnyValue::UInt8(v) => Some(i64::from(v)),
        AnyValue::UInt16(v) => Some(i64::from(v)),
        AnyValue::UInt32(v) => Some(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v).ok(),
        AnyValue::Float32(v) => Some(v as i64),
        AnyValue::Float64(v) => Some(v as i64),
        AnyValue::String(s) => parse_i64(s),
        AnyValue::StringOwned(s) => parse_i64(&s),
        _ => None,
    }
}

/// Parses text as `f64`; empty or invalid input gives `None`.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Parses text as `i64`, accepting a float rendering of a whole number
/// (`"3.0"` -> 3); fractional or invalid input gives `None`.
pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    let float = trimmed.parse::<f64>().ok()?;
    if float.fract() == 0.0 {
        Some(float as i64)
    } else {
        None
    }
}

/// Parses an integer-coded `YYYYMMDD` date, tolerating a float rendering.
pub fn parse_date_int(value: &str) -> Option<NaiveDate> {
    let digits = parse_i64(value)?;
    let year = i32::try_from(digits / 10_000).ok()?;
    let month = u32::try_from((digits / 100) % 100).ok()?;
    let day = u32::try_from(digits % 100).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parses a compact digit timestamp: 12 digits `YYYYMMDDHHMM`, 14 digits
/// `YYYYMMDDHHMMSS`, or 8 digits `YYYYMMDD` (midnight). A leading
/// apostrophe from the spreadsheet export is stripped first.
pub fn parse_datetime_compact(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim().trim_start_matches('\'').trim();
    // A whole-number float rendering ("202601020735.0") also appears.
    let normalized = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    if !normalized.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match normalized.len() {
        12 => NaiveDateTime::parse_from_str(normalized, "%Y%m%d%H%M").ok(),
        14 => NaiveDateTime::parse_from_str(normalized, "%Y%m%d%H%M%S").ok(),
        8 => parse_date_int(normalized).and_then(|d| d.and_hms_opt(0, 0, 0)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_becomes_empty_string() {
        assert_eq!(any_to_string(AnyValue::Null), "");
        assert_eq!(any_to_string_non_empty(AnyValue::Null), None);
        assert_eq!(any_to_string_non_empty(AnyValue::String("  ")), None);
    }

    #[test]
    fn float_codes_lose_trailing_zero() {
        assert_eq!(any_to_string(AnyValue::Float64(1234.0)), "1234");
        assert_eq!(any_to_string(AnyValue::Float64(12.5)), "12.5");
    }

    #[test]
    fn numeric_extraction_handles_text() {
        assert_eq!(any_to_f64(AnyValue::String("2.5")), Some(2.5));
        assert_eq!(any_to_f64(AnyValue::String("bad")), None);
        assert_eq!(any_to_i64(AnyValue::String("7")), Some(7));
        assert_eq!(any_to_i64(AnyValue::String("7.0")), Some(7));
        assert_eq!(any_to_i64(AnyValue::String("7.5")), None);
        assert_eq!(any_to_i64(AnyValue::Float64(3.9)), Some(3));
    }

    #[test]
    fn date_int_parses_and_validates() {
        assert_eq!(
            parse_date_int("20260105"),
            NaiveDate::from_ymd_opt(2026, 1, 5)
        );
        assert_eq!(
            parse_date_int("20260105.0"),
            NaiveDate::from_ymd_opt(2026, 1, 5)
        );
        assert_eq!(parse_date_int("20261301"), None);
        assert_eq!(parse_date_int(""), None);
    }

    #[test]
    fn compact_timestamps_parse_in_all_three_widths() {
        let expected = NaiveDate::from_ymd_opt(2026, 1, 2)
            .unwrap()
            .and_hms_opt(7, 35, 0)
            .unwrap();
        assert_eq!(parse_datetime_compact("202601020735"), Some(expected));
        assert_eq!(parse_datetime_compact("'202601020735"), Some(expected));
        assert_eq!(
            parse_datetime_compact("20260102073500"),
            NaiveDate::from_ymd_opt(2026, 1, 2)
                .unwrap()
                .and_hms_opt(7, 35, 0)
        );
        assert_eq!(
            parse_datetime_compact("20260102"),
            NaiveDate::from_ymd_opt(2026, 1, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_datetime_compact("2026-01-02"), None);
    }
}
