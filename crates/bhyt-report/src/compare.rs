//! Derived column values for the department comparison.
//!
//! Two views of every column: the *display* value (formatted text with the
//! blank-on-zero conventions) and the *raw* value used by the difference and
//! percent-change columns. The raw view treats an absent group as zero so a
//! department present in only one period still compares.

use bhyt_model::metric::{ColumnKind, ColumnSpec, Denominator, RatioFormat, ValueField};
use bhyt_model::query::Totals;

use crate::format::{fmt_amount, fmt_count, group_rounded};
use crate::table::Cell;

/// Per-visit average: blank when there were no visits or no spend, so "no
/// activity" stays distinguishable from "zero cost".
pub fn per_visit_average(amount: f64, visits: u64) -> Option<f64> {
    if visits == 0 || amount == 0.0 {
        return None;
    }
    Some(amount / visits as f64)
}

/// Ratio of two sums with the same zero guards.
pub fn ratio_value(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 || numerator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}

fn denominator_value(denominator: Denominator, totals: &Totals) -> f64 {
    match denominator {
        Denominator::Visits => totals.count() as f64,
        Denominator::Field(field) => totals.get(field),
    }
}

/// The number behind a column for comparison purposes. Absent groups and
/// guarded divisions both collapse to zero here; the display layer is the
/// one that distinguishes blank from zero.
pub fn column_raw_value(spec: &ColumnSpec, totals: Option<&Totals>) -> f64 {
    let Some(totals) = totals else {
        return 0.0;
    };
    match spec.kind {
        ColumnKind::Count => totals.count() as f64,
        ColumnKind::Sum(field) => totals.get(field),
        ColumnKind::PerVisit(field) => {
            if totals.count() == 0 {
                0.0
            } else {
                totals.get(field) / totals.count() as f64
            }
        }
        ColumnKind::Ratio {
            numerator,
            denominator,
            ..
        } => {
            let den = denominator_value(denominator, totals);
            if den == 0.0 {
                0.0
            } else {
                totals.get(numerator) / den
            }
        }
    }
}

/// The formatted cell for a column of one group in one period.
pub fn column_cell(spec: &ColumnSpec, totals: Option<&Totals>) -> Cell {
    let Some(totals) = totals else {
        return Cell::blank();
    };
    let text = match spec.kind {
        ColumnKind::Count => fmt_count(totals.count()),
        ColumnKind::Sum(field) => fmt_amount(totals.get(field)),
        ColumnKind::PerVisit(field) => match per_visit_average(totals.get(field), totals.count()) {
            Some(average) => group_rounded(average),
            None => String::new(),
        },
        ColumnKind::Ratio {
            numerator,
            denominator,
            format,
        } => {
            let den = denominator_value(denominator, totals);
            match ratio_value(totals.get(numerator), den) {
                Some(value) => match format {
                    RatioFormat::Percent => format!("{:.1}%", value * 100.0),
                    RatioFormat::Decimal => format!("{value:.1}"),
                },
                None => String::new(),
            }
        }
    };
    Cell::text(text)
}

/// Whether a column's values are whole numbers, which changes how its
/// difference column renders.
pub fn column_is_integral(spec: &ColumnSpec) -> bool {
    matches!(spec.kind, ColumnKind::Count)
        || matches!(spec.kind, ColumnKind::Sum(ValueField::SoNgayDtri))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bhyt_model::metric::column_for_key;

    fn totals(visits: u64, tongchi: f64) -> Totals {
        let mut out = Totals::default();
        for i in 0..visits {
            let mut values = [None; ValueField::ALL.len()];
            // Put the whole amount on the first record.
            if i == 0 {
                values[ValueField::TongChi.index()] = Some(tongchi);
            }
            out.add_record(values);
        }
        out
    }

    #[test]
    fn average_guards_both_zero_sides() {
        assert_eq!(per_visit_average(0.0, 5), None);
        assert_eq!(per_visit_average(500.0, 0), None);
        assert_eq!(per_visit_average(1000.0, 4), Some(250.0));
    }

    #[test]
    fn ratio_guards_zero_numerator_and_denominator() {
        assert_eq!(ratio_value(0.0, 10.0), None);
        assert_eq!(ratio_value(10.0, 0.0), None);
        assert_eq!(ratio_value(1.0, 4.0), Some(0.25));
    }

    #[test]
    fn average_column_formats_rounded_grouped() {
        let spec = column_for_key("bq_t_tongchi").unwrap();
        let cell = column_cell(&spec, Some(&totals(100, 50_000_000.0)));
        assert_eq!(cell.text, "500,000");
        assert!(column_cell(&spec, Some(&totals(5, 0.0))).is_blank());
        assert!(column_cell(&spec, None).is_blank());
    }

    #[test]
    fn raw_value_treats_absent_group_as_zero() {
        let spec = column_for_key("so_luot").unwrap();
        assert_eq!(column_raw_value(&spec, None), 0.0);
        assert_eq!(column_raw_value(&spec, Some(&totals(7, 0.0))), 7.0);
    }

    #[test]
    fn raw_average_skips_display_zero_guard() {
        // The raw view of an average with zero spend is 0, not blank.
        let spec = column_for_key("bq_t_tongchi").unwrap();
        assert_eq!(column_raw_value(&spec, Some(&totals(5, 0.0))), 0.0);
        assert_eq!(
            column_raw_value(&spec, Some(&totals(4, 1000.0))),
            250.0
        );
    }

    #[test]
    fn integral_columns_are_count_and_treatment_days() {
        assert!(column_is_integral(&column_for_key("so_luot").unwrap()));
        assert!(column_is_integral(&column_for_key("so_ngay_dtri").unwrap()));
        assert!(!column_is_integral(&column_for_key("t_tongchi").unwrap()));
        assert!(!column_is_integral(&column_for_key("bq_t_tongchi").unwrap()));
    }
}
