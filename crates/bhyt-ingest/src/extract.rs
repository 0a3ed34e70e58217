//! Settlement-extract parsing.
//!
//! Monthly extracts arrive as CSV exports of the insurer spreadsheet:
//! headers in arbitrary case, dates as integer `YYYYMMDD`, timestamps as
//! compact digit runs, numbers that sometimes read "nan". Parsing
//! normalizes all of that into typed [`VisitRecord`]s with canonical text
//! dates, and stamps each row with the upload time and source file name.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, warn};

use bhyt_common::{parse_date_int, parse_datetime_compact, parse_f64, parse_i64};
use bhyt_model::record::{CellValue, VisitRecord};
use bhyt_model::visit::{ColumnType, VISIT_COLUMNS, col};

/// Canonical text forms used in the warehouse.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_lowercase()
}

fn is_missing(raw: &str) -> bool {
    raw.is_empty() || raw.eq_ignore_ascii_case("nan")
}

/// Facility codes reach us as spreadsheet numerics (`96023.0`); keep the
/// canonical digit form so they join the lookup tables.
fn canonical_code(raw: &str) -> String {
    match parse_i64(raw) {
        Some(code) => code.to_string(),
        None => raw.to_string(),
    }
}

fn parse_cell(ty: ColumnType, name: &str, raw: &str) -> CellValue {
    match ty {
        ColumnType::Int => parse_i64(raw).map_or(CellValue::Null, CellValue::Int),
        ColumnType::Float => parse_f64(raw).map_or(CellValue::Null, CellValue::Float),
        ColumnType::Date => parse_date_int(raw)
            .map(|date| CellValue::Text(date.format(DATE_FORMAT).to_string()))
            .unwrap_or(CellValue::Null),
        ColumnType::DateTime => parse_datetime_compact(raw)
            .map(|dt| CellValue::Text(dt.format(DATETIME_FORMAT).to_string()))
            .unwrap_or(CellValue::Null),
        ColumnType::Str => {
            if name == col::MA_CSKCB {
                CellValue::Text(canonical_code(raw))
            } else {
                CellValue::Text(raw.to_string())
            }
        }
    }
}

/// Reads one extract file into normalized rows.
pub fn read_extract(path: &Path) -> Result<Vec<VisitRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("open extract {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .context("read extract header")?
        .iter()
        .map(normalize_header)
        .collect();
    let index: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();
    for header in &headers {
        if !VISIT_COLUMNS.iter().any(|def| def.name == header) {
            warn!(column = %header, "extract column has no warehouse counterpart, ignored");
        }
    }

    let source_file = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("extract.csv")
        .to_string();
    let upload_timestamp = Utc::now().format(DATETIME_FORMAT).to_string();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.context("read extract row")?;
        let mut record = VisitRecord::new();
        for def in VISIT_COLUMNS {
            let Some(raw) = index.get(def.name).and_then(|idx| row.get(*idx)) else {
                continue;
            };
            let raw = raw.trim();
            if is_missing(raw) {
                continue;
            }
            record.set(def.name, parse_cell(def.ty, def.name, raw));
        }
        record.set(
            col::UPLOAD_TIMESTAMP,
            CellValue::Text(upload_timestamp.clone()),
        );
        record.set(col::SOURCE_FILE, CellValue::Text(source_file.clone()));
        records.push(record);
    }
    debug!(rows = records.len(), file = %source_file, "extract parsed");
    Ok(records)
}

/// One (settlement month, facility) slice of an import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportGroup {
    pub nam_qt: Option<i64>,
    pub thang_qt: Option<i64>,
    pub ma_cskcb: Option<String>,
    pub rows: usize,
    pub tongchi: f64,
}

/// Summarizes parsed rows per (month, facility), in key order.
pub fn summarize(records: &[VisitRecord]) -> Vec<ImportGroup> {
    let mut groups: std::collections::BTreeMap<
        (Option<i64>, Option<i64>, Option<String>),
        (usize, f64),
    > = std::collections::BTreeMap::new();
    for record in records {
        let key = (
            record.int(col::NAM_QT),
            record.int(col::THANG_QT),
            record.text(col::MA_CSKCB).map(str::to_string),
        );
        let entry = groups.entry(key).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += record.float(col::T_TONGCHI).unwrap_or(0.0);
    }
    groups
        .into_iter()
        .map(|((nam_qt, thang_qt, ma_cskcb), (rows, tongchi))| ImportGroup {
            nam_qt,
            thang_qt,
            ma_cskcb,
            rows,
            tongchi,
        })
        .collect()
}
