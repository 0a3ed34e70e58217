//! Yearly overview pivot.
//!
//! Months 1–12 as rows; one column per facility inside the outpatient and
//! inpatient groups, each group closed by a `Tổng` column, then a grand
//! `TỔNG CỘNG` column; a final `TỔNG NĂM` row sums the year.

use std::collections::BTreeMap;

use bhyt_model::metric::ValueField;
use bhyt_model::query::GroupRow;
use bhyt_model::{ML2_INPATIENT, ML2_OUTPATIENT};

use crate::format::fmt_amount;
use crate::table::{Cell, ReportRow, ReportTable, RowKind};

/// The figure shown in every pivot cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverviewMetric {
    Visits,
    TotalCost,
}

impl OverviewMetric {
    pub fn label(self) -> &'static str {
        match self {
            Self::Visits => "Số lượt KCB",
            Self::TotalCost => "Tổng chi phí (VNĐ)",
        }
    }

    fn value(self, row: &GroupRow) -> f64 {
        match self {
            Self::Visits => row.totals.count() as f64,
            Self::TotalCost => row.totals.get(ValueField::TongChi),
        }
    }
}

/// A facility column: code for identity, display name when known.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Facility {
    code: String,
    name: Option<String>,
}

impl Facility {
    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.code)
    }
}

fn facilities_of(rows: &[GroupRow], ml2: &str) -> Vec<Facility> {
    let mut facilities: Vec<Facility> = rows
        .iter()
        .filter(|row| row.key.ml2.as_deref() == Some(ml2))
        .map(|row| Facility {
            code: row.key.ma_cskcb.clone().unwrap_or_default(),
            name: row.key.ten_cskcb.clone(),
        })
        .collect();
    facilities.sort();
    facilities.dedup();
    facilities
}

/// Builds the overview pivot from one year's facility-month aggregation.
pub fn overview_table(year: i32, rows: &[GroupRow], metric: OverviewMetric) -> ReportTable {
    let outpatient = facilities_of(rows, ML2_OUTPATIENT);
    let inpatient = facilities_of(rows, ML2_INPATIENT);

    let mut header = vec!["Tháng".to_string()];
    for facility in &outpatient {
        header.push(format!("Ngoại trú · {}", facility.label()));
    }
    header.push("Ngoại trú · Tổng".to_string());
    for facility in &inpatient {
        header.push(format!("Nội trú · {}", facility.label()));
    }
    header.push("Nội trú · Tổng".to_string());
    header.push("TỔNG CỘNG".to_string());

    let mut table = ReportTable::new(format!("Tổng quan {year}"), header);

    // (month, ml2, facility code) -> metric value.
    let mut values: BTreeMap<(u32, &str, &str), f64> = BTreeMap::new();
    for row in rows {
        let (Some(month), Some(ml2)) = (row.key.month, row.key.ml2.as_deref()) else {
            continue;
        };
        let code = row.key.ma_cskcb.as_deref().unwrap_or_default();
        *values.entry((month, ml2, code)).or_insert(0.0) += metric.value(row);
    }

    let mut column_sums = vec![0.0; outpatient.len() + inpatient.len() + 3];
    for month in 1..=12u32 {
        let mut cells = vec![Cell::text(format!("T{month:02}"))];
        let mut numbers = Vec::new();
        let mut outpatient_total = 0.0;
        for facility in &outpatient {
            let value = values
                .get(&(month, ML2_OUTPATIENT, facility.code.as_str()))
                .copied()
                .unwrap_or(0.0);
            outpatient_total += value;
            numbers.push(value);
        }
        numbers.push(outpatient_total);
        let mut inpatient_total = 0.0;
        for facility in &inpatient {
            let value = values
                .get(&(month, ML2_INPATIENT, facility.code.as_str()))
                .copied()
                .unwrap_or(0.0);
            inpatient_total += value;
            numbers.push(value);
        }
        numbers.push(inpatient_total);
        numbers.push(outpatient_total + inpatient_total);

        for (slot, value) in column_sums.iter_mut().zip(&numbers) {
            *slot += value;
        }
        cells.extend(numbers.iter().map(|v| Cell::text(fmt_amount(*v))));
        table.push(ReportRow::new(RowKind::Detail, cells));
    }

    let mut cells = vec![Cell::text("TỔNG NĂM")];
    cells.extend(column_sums.iter().map(|v| Cell::text(fmt_amount(*v))));
    table.push(ReportRow::new(RowKind::Total, cells));

    table
}
