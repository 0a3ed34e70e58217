//! Hospital-wide comparison matrix.
//!
//! Column groups `Nội trú` / `Ngoại trú` / `Tổng`, one column per period
//! inside each group plus optional difference and percent-change columns.
//! Row sections: `Chung` (visits, treatment days, average stay), `Số tiền`
//! (the cost fields) and `Bình quân` (cost per visit). Treatment days only
//! exist for inpatient stays, so the outpatient column stays empty and the
//! `Tổng` column repeats the inpatient figure.

use bhyt_model::metric::ValueField;
use bhyt_model::query::Totals;
use bhyt_model::{ML2_INPATIENT, ML2_OUTPATIENT};

use crate::format::{diff_cell, fmt_amount_dash, fmt_count_dash, fmt_decimal_dash, pct_change_cell};
use crate::table::{Cell, PeriodSeries, ReportRow, ReportTable, RowKind};

const GROUPS: [&str; 3] = [ML2_INPATIENT, ML2_OUTPATIENT, "Tổng"];

/// Cost rows of the money and per-visit sections, in display order.
const COST_ROWS: [(&str, ValueField); 11] = [
    ("Thuốc", ValueField::Thuoc),
    ("Xét nghiệm", ValueField::XetNghiem),
    ("CĐHA", ValueField::Cdha),
    ("Máu", ValueField::Mau),
    ("PTTT", ValueField::Pttt),
    ("VTYT", ValueField::Vtyt),
    ("Tiền khám", ValueField::TienKham),
    ("Tiền giường", ValueField::TienGiuong),
    ("Tổng chi", ValueField::TongChi),
    ("BHTT", ValueField::Bhtt),
    ("BNTT", ValueField::Bntt),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct HospitalOptions {
    pub show_diff: bool,
    pub show_pct_change: bool,
}

/// How a matrix row renders its raw values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowFormat {
    Count,
    Amount,
    Decimal,
}

/// Per-period category sums: inpatient, outpatient.
struct PeriodData {
    inpatient: Totals,
    outpatient: Totals,
}

impl PeriodData {
    fn from_series(series: &PeriodSeries) -> Self {
        let mut inpatient = Totals::default();
        let mut outpatient = Totals::default();
        for row in &series.rows {
            match row.key.ml2.as_deref() {
                Some(ML2_INPATIENT) => inpatient.merge(&row.totals),
                Some(ML2_OUTPATIENT) => outpatient.merge(&row.totals),
                _ => {}
            }
        }
        Self {
            inpatient,
            outpatient,
        }
    }

    fn count(&self, group: &str) -> f64 {
        match group {
            g if g == ML2_INPATIENT => self.inpatient.count() as f64,
            g if g == ML2_OUTPATIENT => self.outpatient.count() as f64,
            _ => (self.inpatient.count() + self.outpatient.count()) as f64,
        }
    }

    fn sum(&self, group: &str, field: ValueField) -> f64 {
        match group {
            g if g == ML2_INPATIENT => self.inpatient.get(field),
            g if g == ML2_OUTPATIENT => self.outpatient.get(field),
            _ => self.inpatient.get(field) + self.outpatient.get(field),
        }
    }
}

fn per_visit(amount: f64, visits: f64) -> f64 {
    if visits == 0.0 || amount == 0.0 {
        0.0
    } else {
        amount / visits
    }
}

/// Builds the whole-hospital matrix for 1..N periods aggregated by
/// visit-type category.
pub fn hospital_table(periods: &[PeriodSeries], options: HospitalOptions) -> ReportTable {
    let n = periods.len();
    let show_diff = options.show_diff && n >= 2;
    let show_pct = options.show_pct_change && n >= 2;
    let data: Vec<PeriodData> = periods.iter().map(PeriodData::from_series).collect();

    let mut header = vec!["Toàn BV".to_string()];
    for group in GROUPS {
        for series in periods {
            header.push(format!("{group} {}", series.label()));
        }
        if show_diff {
            header.push(format!("{group} · Chênh lệch"));
        }
        if show_pct {
            header.push(format!("{group} · Tỷ lệ %"));
        }
    }
    let mut table = ReportTable::new("Số liệu toàn viện", header);

    let push_row =
        |table: &mut ReportTable, label: &str, format: RowFormat, total_style: bool, value: &dyn Fn(usize, &str) -> f64| {
            let mut cells = vec![Cell::text(label)];
            for group in GROUPS {
                let values: Vec<f64> = (0..n).map(|pi| value(pi, group)).collect();
                for v in &values {
                    let text = match format {
                        RowFormat::Count => fmt_count_dash(*v),
                        RowFormat::Amount => fmt_amount_dash(*v),
                        RowFormat::Decimal => fmt_decimal_dash(*v),
                    };
                    cells.push(Cell::text(text));
                }
                if show_diff {
                    let integral = format == RowFormat::Count;
                    cells.push(diff_cell(values[0], values[n - 1], integral));
                }
                if show_pct {
                    cells.push(pct_change_cell(values[0], values[n - 1]));
                }
            }
            table.push(ReportRow::new(
                if total_style { RowKind::Total } else { RowKind::Detail },
                cells,
            ));
        };

    // ── Chung ──
    table.section(0, "Chung");
    push_row(&mut table, "Số lượt", RowFormat::Count, false, &|pi, group| {
        data[pi].count(group)
    });
    push_row(
        &mut table,
        "Số ngày ĐT",
        RowFormat::Count,
        false,
        &|pi, group| {
            if group == ML2_OUTPATIENT {
                0.0
            } else {
                data[pi].sum(ML2_INPATIENT, ValueField::SoNgayDtri)
            }
        },
    );
    push_row(
        &mut table,
        "Ngày ĐT TB",
        RowFormat::Decimal,
        false,
        &|pi, group| {
            if group == ML2_OUTPATIENT {
                0.0
            } else {
                per_visit(
                    data[pi].sum(ML2_INPATIENT, ValueField::SoNgayDtri),
                    data[pi].count(ML2_INPATIENT),
                )
            }
        },
    );

    // ── Số tiền ──
    table.section(0, "Số tiền");
    for (label, field) in COST_ROWS {
        push_row(
            &mut table,
            label,
            RowFormat::Amount,
            field == ValueField::TongChi,
            &|pi, group| data[pi].sum(group, field),
        );
    }

    // ── Bình quân ──
    table.section(0, "Bình quân");
    for (label, field) in COST_ROWS {
        push_row(
            &mut table,
            label,
            RowFormat::Amount,
            field == ValueField::TongChi,
            &|pi, group| per_visit(data[pi].sum(group, field), data[pi].count(group)),
        );
    }

    table
}
