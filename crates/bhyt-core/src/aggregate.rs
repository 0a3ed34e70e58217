//! Period aggregation over the fact frame.
//!
//! One pass per request: filter rows to the inclusive settlement-month
//! range, enrich each surviving row, apply the grouping restriction and
//! optional filters, and accumulate counts and null-as-zero sums per group
//! key. Accumulation goes through a `BTreeMap`, so the output order is
//! deterministic regardless of row order.

use std::collections::BTreeMap;

use polars::prelude::{AnyValue, Column, DataFrame};
use tracing::debug;

use bhyt_common::{any_to_f64, any_to_i64, any_to_string_non_empty};
use bhyt_model::error::{BhytError, Result};
use bhyt_model::lookup::LookupSet;
use bhyt_model::metric::ValueField;
use bhyt_model::period::{Period, YearMonth};
use bhyt_model::query::{AggregateRequest, GroupKey, GroupRow, Grouping, Totals};
use bhyt_model::visit::col;

use crate::enrich::{Enrichment, VisitFacts, enrich};

fn frame_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| BhytError::Message(format!("fact table is missing column '{name}'")))
}

fn cell<'a>(column: &'a Column, idx: usize) -> AnyValue<'a> {
    column.get(idx).unwrap_or(AnyValue::Null)
}

struct FactColumns<'a> {
    nam_qt: &'a Column,
    thang_qt: &'a Column,
    ma_loaikcb: &'a Column,
    ma_cskcb: &'a Column,
    ma_khoa: &'a Column,
    ma_benh: &'a Column,
    values: Vec<&'a Column>,
}

impl<'a> FactColumns<'a> {
    fn bind(df: &'a DataFrame) -> Result<Self> {
        let values = ValueField::ALL
            .iter()
            .map(|field| frame_column(df, field.column()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            nam_qt: frame_column(df, col::NAM_QT)?,
            thang_qt: frame_column(df, col::THANG_QT)?,
            ma_loaikcb: frame_column(df, col::MA_LOAIKCB)?,
            ma_cskcb: frame_column(df, col::MA_CSKCB)?,
            ma_khoa: frame_column(df, col::MA_KHOA)?,
            ma_benh: frame_column(df, col::MA_BENH)?,
            values,
        })
    }

    fn month(&self, idx: usize) -> Option<YearMonth> {
        let year = any_to_i64(cell(self.nam_qt, idx))?;
        let month = any_to_i64(cell(self.thang_qt, idx))?;
        Some(YearMonth::new(
            i32::try_from(year).ok()?,
            u32::try_from(month).ok()?,
        ))
    }

    fn facts(&self, idx: usize) -> VisitFacts {
        VisitFacts {
            ma_loaikcb: any_to_i64(cell(self.ma_loaikcb, idx)),
            ma_cskcb: any_to_string_non_empty(cell(self.ma_cskcb, idx)),
            ma_khoa: any_to_string_non_empty(cell(self.ma_khoa, idx)),
            ma_benh: any_to_string_non_empty(cell(self.ma_benh, idx)),
        }
    }

    fn values(&self, idx: usize) -> [Option<f64>; ValueField::ALL.len()] {
        let mut out = [None; ValueField::ALL.len()];
        for (slot, column) in out.iter_mut().zip(&self.values) {
            *slot = any_to_f64(cell(column, idx));
        }
        out
    }
}

/// Builds the group key for a row, or `None` when the row falls outside the
/// grouping's restriction or an active filter.
fn group_key(
    request: &AggregateRequest,
    month: YearMonth,
    facts: &VisitFacts,
    enriched: &Enrichment,
) -> Option<GroupKey> {
    if let Some(ml2) = &request.ml2 {
        if enriched.ml2.as_deref() != Some(ml2.as_str()) {
            return None;
        }
    }
    if let Some(khoa) = &request.khoa {
        if enriched.khoa.as_deref() != Some(khoa.as_str()) {
            return None;
        }
    }
    match request.grouping {
        Grouping::Department => {
            let khoa = enriched.khoa.clone()?;
            Some(GroupKey {
                ml2: enriched.ml2.clone(),
                khoa: Some(khoa),
                ..GroupKey::default()
            })
        }
        Grouping::VisitType => {
            enriched.khoa.as_ref()?;
            Some(GroupKey {
                ml2: enriched.ml2.clone(),
                ..GroupKey::default()
            })
        }
        Grouping::DiagnosisPrefix => {
            let icd = enriched.ma_benh_chinh.clone()?;
            Some(GroupKey {
                icd: Some(icd),
                ..GroupKey::default()
            })
        }
        Grouping::FacilityMonth => Some(GroupKey {
            month: Some(month.month),
            ml2: enriched.ml2.clone(),
            ma_cskcb: facts.ma_cskcb.clone(),
            ten_cskcb: enriched.ten_cskcb.clone(),
            ..GroupKey::default()
        }),
    }
}

/// Runs one aggregation over the fact frame. An empty result means "no data
/// for this period" — it is not an error.
pub fn aggregate_frame(
    df: &DataFrame,
    lookups: &LookupSet,
    request: &AggregateRequest,
) -> Result<Vec<GroupRow>> {
    request.period.validate()?;
    let columns = FactColumns::bind(df)?;
    let mut groups: BTreeMap<GroupKey, Totals> = BTreeMap::new();
    let mut matched = 0usize;
    for idx in 0..df.height() {
        let Some(month) = columns.month(idx) else {
            continue;
        };
        if !request.period.contains(month) {
            continue;
        }
        let facts = columns.facts(idx);
        let enriched = enrich(&facts, month, lookups);
        let Some(key) = group_key(request, month, &facts, &enriched) else {
            continue;
        };
        matched += 1;
        groups.entry(key).or_default().add_record(columns.values(idx));
    }
    debug!(
        period = %request.period,
        grouping = ?request.grouping,
        rows = matched,
        groups = groups.len(),
        "aggregated period"
    );
    Ok(groups
        .into_iter()
        .map(|(key, totals)| GroupRow { key, totals })
        .collect())
}

/// Distinct settlement (year, month) pairs present in the frame, ascending.
pub fn distinct_year_months(df: &DataFrame) -> Result<Vec<YearMonth>> {
    let nam_qt = frame_column(df, col::NAM_QT)?;
    let thang_qt = frame_column(df, col::THANG_QT)?;
    let mut months: Vec<YearMonth> = Vec::new();
    for idx in 0..df.height() {
        let (Some(year), Some(month)) = (
            any_to_i64(cell(nam_qt, idx)),
            any_to_i64(cell(thang_qt, idx)),
        ) else {
            continue;
        };
        let (Ok(year), Ok(month)) = (i32::try_from(year), u32::try_from(month)) else {
            continue;
        };
        months.push(YearMonth::new(year, month));
    }
    months.sort();
    months.dedup();
    Ok(months)
}

/// Distinct derived department labels with data inside any of the given
/// ranges, optionally restricted to one visit-type category. Sorted.
pub fn distinct_departments(
    df: &DataFrame,
    lookups: &LookupSet,
    periods: &[Period],
    ml2: Option<&str>,
) -> Result<Vec<String>> {
    let columns = FactColumns::bind(df)?;
    let mut labels: Vec<String> = Vec::new();
    for idx in 0..df.height() {
        let Some(month) = columns.month(idx) else {
            continue;
        };
        if !periods.iter().any(|period| period.contains(month)) {
            continue;
        }
        let facts = columns.facts(idx);
        let enriched = enrich(&facts, month, lookups);
        if let Some(wanted) = ml2 {
            if enriched.ml2.as_deref() != Some(wanted) {
                continue;
            }
        }
        if let Some(khoa) = enriched.khoa {
            labels.push(khoa);
        }
    }
    labels.sort();
    labels.dedup();
    Ok(labels)
}
