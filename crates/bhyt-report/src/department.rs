//! Department comparison table.
//!
//! Rows are departments grouped into the outpatient and inpatient sections,
//! columns are the active metric set crossed with the selected periods, plus
//! optional difference and percent-change columns comparing the first
//! selected period against the last. A `III. TỔNG` section carries the two
//! section subtotals and the grand total, all computed as sums of the
//! already-summed detail rows.

use std::collections::BTreeMap;

use bhyt_model::metric::ColumnSpec;
use bhyt_model::query::Totals;
use bhyt_model::{ML2_INPATIENT, ML2_OUTPATIENT};

use crate::compare::{column_cell, column_is_integral, column_raw_value};
use crate::format::{diff_cell, pct_change_cell};
use crate::order::department_sort_key;
use crate::table::{Cell, PeriodSeries, ReportRow, ReportTable, RowKind};

const SECTIONS: [(&str, &str); 2] = [
    (ML2_OUTPATIENT, "I. Ngoại trú"),
    (ML2_INPATIENT, "II. Nội trú"),
];

/// Table layout options.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepartmentOptions {
    pub show_diff: bool,
    pub show_pct_change: bool,
}

/// Builds the department comparison for 1..N periods sharing the department
/// grouping.
pub fn department_table(
    periods: &[PeriodSeries],
    columns: &[ColumnSpec],
    order: &BTreeMap<String, i64>,
    options: DepartmentOptions,
) -> ReportTable {
    let n = periods.len();
    let show_diff = options.show_diff && n >= 2;
    let show_pct = options.show_pct_change && n >= 2;

    let mut table = ReportTable::new(
        "Chi phí theo khoa",
        header(periods, columns, show_diff, show_pct),
    );

    // khoa -> one optional Totals per period, per section.
    let mut sections: BTreeMap<&str, BTreeMap<String, Vec<Option<Totals>>>> = BTreeMap::new();
    for (section, _) in SECTIONS {
        sections.insert(section, BTreeMap::new());
    }
    for (pi, series) in periods.iter().enumerate() {
        for row in &series.rows {
            let (Some(ml2), Some(khoa)) = (row.key.ml2.as_deref(), row.key.khoa.as_deref()) else {
                continue;
            };
            let Some(section) = sections.get_mut(ml2) else {
                continue; // unknown category
            };
            section
                .entry(khoa.to_string())
                .or_insert_with(|| vec![None; n])[pi] = Some(row.totals);
        }
    }

    let mut subtotals: BTreeMap<&str, Vec<Totals>> = BTreeMap::new();
    for (ml2, title) in SECTIONS {
        let departments = &sections[ml2];
        let mut section_totals = vec![Totals::default(); n];
        if !departments.is_empty() {
            table.section(1, title);
            let mut labels: Vec<&String> = departments.keys().collect();
            labels.sort_by(|a, b| {
                department_sort_key(order, a).cmp(&department_sort_key(order, b))
            });
            for (idx, label) in labels.iter().enumerate() {
                let per_period = &departments[label.as_str()];
                for (slot, totals) in section_totals.iter_mut().zip(per_period) {
                    if let Some(totals) = totals {
                        slot.merge(totals);
                    }
                }
                let views: Vec<Option<&Totals>> =
                    per_period.iter().map(Option::as_ref).collect();
                let mut cells = vec![
                    Cell::text((idx + 1).to_string()),
                    Cell::text(label.as_str()),
                ];
                push_metric_cells(&mut cells, columns, &views, show_diff, show_pct);
                table.push(ReportRow::new(RowKind::Detail, cells));
            }
        }
        subtotals.insert(ml2, section_totals);
    }

    table.section(1, "III. TỔNG");
    for (idx, (ml2, _)) in SECTIONS.iter().enumerate() {
        let per_period = &subtotals[ml2];
        let views: Vec<Option<&Totals>> = per_period.iter().map(Some).collect();
        let mut cells = vec![Cell::text((idx + 1).to_string()), Cell::text(*ml2)];
        push_metric_cells(&mut cells, columns, &views, show_diff, show_pct);
        table.push(ReportRow::new(RowKind::Subtotal, cells));
    }

    // Grand total = outpatient subtotal + inpatient subtotal, per period.
    let mut combined = vec![Totals::default(); n];
    for (ml2, _) in SECTIONS {
        for (slot, totals) in combined.iter_mut().zip(&subtotals[ml2]) {
            slot.merge(totals);
        }
    }
    let views: Vec<Option<&Totals>> = combined.iter().map(Some).collect();
    let mut cells = vec![Cell::blank(), Cell::text("Tổng cộng")];
    push_metric_cells(&mut cells, columns, &views, show_diff, show_pct);
    table.push(ReportRow::new(RowKind::Total, cells));

    table
}

fn header(
    periods: &[PeriodSeries],
    columns: &[ColumnSpec],
    show_diff: bool,
    show_pct: bool,
) -> Vec<String> {
    let mut header = vec!["TT".to_string(), "Khoa".to_string()];
    for spec in columns {
        let label = if spec.inpatient_only {
            format!("{} (NT)", spec.label)
        } else {
            spec.label.clone()
        };
        for series in periods {
            header.push(format!("{label} {}", series.label()));
        }
        if show_diff {
            header.push(format!("{label} · Chênh lệch"));
        }
        if show_pct {
            header.push(format!("{label} · Tỷ lệ%"));
        }
    }
    header
}

/// Appends, per metric column: one cell per period, then the optional
/// first-vs-last difference and percent-change cells.
fn push_metric_cells(
    cells: &mut Vec<Cell>,
    columns: &[ColumnSpec],
    per_period: &[Option<&Totals>],
    show_diff: bool,
    show_pct: bool,
) {
    for spec in columns {
        for totals in per_period {
            cells.push(column_cell(spec, *totals));
        }
        if show_diff || show_pct {
            let first = column_raw_value(spec, per_period.first().copied().flatten());
            let last = column_raw_value(spec, per_period.last().copied().flatten());
            if show_diff {
                cells.push(diff_cell(first, last, column_is_integral(spec)));
            }
            if show_pct {
                cells.push(pct_change_cell(first, last));
            }
        }
    }
}
