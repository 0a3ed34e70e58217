//! Number formatting for report cells.
//!
//! Conventions shared by every report: thousands grouping with commas,
//! blank (or a dash) instead of zero for plain values, an explicit `+` on
//! positive comparison values, and a neutral dash for a zero difference.

use crate::table::{Cell, Tone};

/// Groups an integer with commas: `1234567` -> `"1,234,567"`.
pub fn group_thousands(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    let offset = digits.len() % 3;
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (idx + 3 - offset) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Rounds to a whole number and groups it, keeping the sign.
pub fn group_rounded(value: f64) -> String {
    group_thousands(value.round() as i64)
}

/// Count cell: blank for zero.
pub fn fmt_count(value: u64) -> String {
    if value == 0 {
        String::new()
    } else {
        group_thousands(value as i64)
    }
}

/// Amount cell: blank for zero/absent, otherwise grouped whole number.
pub fn fmt_amount(value: f64) -> String {
    if value == 0.0 {
        String::new()
    } else {
        group_rounded(value)
    }
}

/// Hospital-matrix cell: a dash for zero/absent.
pub fn fmt_amount_dash(value: f64) -> String {
    if value == 0.0 {
        "-".to_string()
    } else {
        group_rounded(value)
    }
}

pub fn fmt_count_dash(value: f64) -> String {
    if value == 0.0 {
        "-".to_string()
    } else {
        group_rounded(value)
    }
}

/// Two-decimal cell with a dash for zero (`Ngày ĐT TB`).
pub fn fmt_decimal_dash(value: f64) -> String {
    if value == 0.0 {
        "-".to_string()
    } else {
        format!("{value:.2}")
    }
}

/// Diagnosis-report count/amount cell: always shows the number.
pub fn fmt_grouped(value: f64) -> String {
    group_rounded(value)
}

/// Diagnosis-report two-decimal cell.
pub fn fmt_decimal2(value: f64) -> String {
    format!("{value:.2}")
}

/// Diagnosis-report percentage cell (`12.34%`).
pub fn fmt_pct2(value: f64) -> String {
    format!("{value:.2}%")
}

fn tone_of(value: f64) -> Tone {
    if value > 0.0 {
        Tone::Favorable
    } else if value < 0.0 {
        Tone::Unfavorable
    } else {
        Tone::Neutral
    }
}

/// Difference cell: `last - first`, with a neutral dash for zero.
///
/// Counts (and other integral metrics) always render as grouped whole
/// numbers; fractional metrics use two decimals below magnitude 100 and a
/// grouped whole number above.
pub fn diff_cell(first: f64, last: f64, integral: bool) -> Cell {
    let diff = last - first;
    if diff == 0.0 {
        return Cell::toned("-", Tone::Neutral);
    }
    let sign = if diff > 0.0 { "+" } else { "" };
    let text = if integral {
        format!("{sign}{}", group_rounded(diff))
    } else if diff.abs() < 100.0 {
        format!("{sign}{diff:.2}")
    } else {
        format!("{sign}{}", group_rounded(diff))
    };
    Cell::toned(text, tone_of(diff))
}

/// Percent-change cell: `(last/first - 1) * 100`, one decimal with sign.
///
/// Blank when either endpoint is zero/absent — never a division by zero,
/// never `NaN`. An exact zero change renders `0.0%`, not blank.
pub fn pct_change_cell(first: f64, last: f64) -> Cell {
    if first == 0.0 || last == 0.0 {
        return Cell::blank();
    }
    let pct = (last / first - 1.0) * 100.0;
    let sign = if pct > 0.0 { "+" } else { "" };
    Cell::toned(format!("{sign}{pct:.1}%"), tone_of(pct))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping_handles_signs_and_sizes() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(16_000_000), "16,000,000");
        assert_eq!(group_thousands(-1_234_567), "-1,234,567");
    }

    #[test]
    fn zero_amounts_are_blank_or_dash() {
        assert_eq!(fmt_amount(0.0), "");
        assert_eq!(fmt_amount(1234.6), "1,235");
        assert_eq!(fmt_amount_dash(0.0), "-");
        assert_eq!(fmt_count(0), "");
        assert_eq!(fmt_count(12_345), "12,345");
    }

    #[test]
    fn diff_cell_follows_magnitude_and_kind() {
        assert_eq!(diff_cell(100.0, 120.0, true).text, "+20");
        assert_eq!(diff_cell(100.0, 100.0, true).text, "-");
        assert_eq!(diff_cell(100.0, 100.0, true).tone, Tone::Neutral);
        assert_eq!(diff_cell(1.0, 3.5, false).text, "+2.50");
        assert_eq!(diff_cell(3.5, 1.0, false).text, "-2.50");
        assert_eq!(diff_cell(0.0, 16_000_000.0, false).text, "+16,000,000");
        assert_eq!(diff_cell(16_000_000.0, 0.0, false).text, "-16,000,000");
        assert_eq!(diff_cell(0.0, 150.0, false).tone, Tone::Favorable);
        assert_eq!(diff_cell(150.0, 0.0, false).tone, Tone::Unfavorable);
    }

    #[test]
    fn pct_change_guards_zero_and_keeps_neutral_zero() {
        assert_eq!(pct_change_cell(100.0, 150.0).text, "+50.0%");
        assert_eq!(pct_change_cell(0.0, 150.0).text, "");
        assert_eq!(pct_change_cell(150.0, 0.0).text, "");
        let flat = pct_change_cell(100.0, 100.0);
        assert_eq!(flat.text, "0.0%");
        assert_eq!(flat.tone, Tone::Neutral);
        assert_eq!(pct_change_cell(100.0, 80.0).text, "-20.0%");
    }
}
