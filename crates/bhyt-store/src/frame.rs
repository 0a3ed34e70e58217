//! Fact-frame construction and CSV persistence.
//!
//! The fact table lives in memory as a polars `DataFrame` with the full
//! warehouse column set and on disk as `visits.csv`. Date-like columns are
//! canonical text; empty CSV cells are nulls. A file written by an older
//! build may miss trailing columns — those load as all-null.

use std::collections::HashMap;
use std::path::Path;

use polars::prelude::{AnyValue, Column, DataFrame};

use bhyt_common::{any_to_i64, any_to_string, any_to_string_non_empty, format_numeric, parse_f64, parse_i64};
use bhyt_model::error::{BhytError, Result};
use bhyt_model::record::VisitRecord;
use bhyt_model::visit::{ColumnType, VISIT_COLUMNS, VisitKey, col};

fn unavailable(what: &str, error: impl std::fmt::Display) -> BhytError {
    BhytError::StoreUnavailable(format!("{what}: {error}"))
}

/// An empty frame with the full warehouse schema.
pub fn empty_frame() -> Result<DataFrame> {
    records_to_frame(&[])
}

/// Builds a frame from normalized rows, one column per schema entry.
pub fn records_to_frame(records: &[VisitRecord]) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(VISIT_COLUMNS.len());
    for def in VISIT_COLUMNS {
        let column = match def.ty {
            ColumnType::Int => {
                let values: Vec<Option<i64>> =
                    records.iter().map(|r| r.int(def.name)).collect();
                Column::new(def.name.into(), values)
            }
            ColumnType::Float => {
                let values: Vec<Option<f64>> =
                    records.iter().map(|r| r.float(def.name)).collect();
                Column::new(def.name.into(), values)
            }
            ColumnType::Str | ColumnType::Date | ColumnType::DateTime => {
                let values: Vec<Option<&str>> =
                    records.iter().map(|r| r.text(def.name)).collect();
                Column::new(def.name.into(), values)
            }
        };
        columns.push(column);
    }
    DataFrame::new(columns).map_err(|error| unavailable("build fact frame", error))
}

/// Loads `visits.csv`; a missing file is an empty warehouse, not an error.
pub fn load_frame(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return empty_frame();
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|error| unavailable("open fact table", error))?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|error| unavailable("read fact header", error))?
        .iter()
        .map(|h| h.trim().trim_matches('\u{feff}').to_string())
        .collect();
    let index: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();

    let mut rows: Vec<csv::StringRecord> = Vec::new();
    for record in reader.records() {
        rows.push(record.map_err(|error| unavailable("read fact row", error))?);
    }

    let mut columns = Vec::with_capacity(VISIT_COLUMNS.len());
    for def in VISIT_COLUMNS {
        let position = index.get(def.name).copied();
        let cell = |row: &csv::StringRecord| -> Option<String> {
            let raw = position.and_then(|idx| row.get(idx))?.trim();
            if raw.is_empty() {
                None
            } else {
                Some(raw.to_string())
            }
        };
        let column = match def.ty {
            ColumnType::Int => {
                let values: Vec<Option<i64>> = rows
                    .iter()
                    .map(|row| cell(row).as_deref().and_then(parse_i64))
                    .collect();
                Column::new(def.name.into(), values)
            }
            ColumnType::Float => {
                let values: Vec<Option<f64>> = rows
                    .iter()
                    .map(|row| cell(row).as_deref().and_then(parse_f64))
                    .collect();
                Column::new(def.name.into(), values)
            }
            ColumnType::Str | ColumnType::Date | ColumnType::DateTime => {
                let values: Vec<Option<String>> = rows.iter().map(&cell).collect();
                Column::new(def.name.into(), values)
            }
        };
        columns.push(column);
    }
    DataFrame::new(columns).map_err(|error| unavailable("build fact frame", error))
}

/// Writes the frame back to `visits.csv`, full-file replacement.
pub fn save_frame(df: &DataFrame, path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).map_err(|error| unavailable("write fact table", error))?;
    writer
        .write_record(VISIT_COLUMNS.iter().map(|def| def.name))
        .map_err(|error| unavailable("write fact header", error))?;
    let columns: Vec<&Column> = VISIT_COLUMNS
        .iter()
        .map(|def| frame_column(df, def.name))
        .collect::<Result<Vec<_>>>()?;
    for idx in 0..df.height() {
        let mut record = Vec::with_capacity(columns.len());
        for column in &columns {
            let value = column.get(idx).unwrap_or(AnyValue::Null);
            let text = match value {
                AnyValue::Float64(v) => format_numeric(v),
                AnyValue::Float32(v) => format_numeric(f64::from(v)),
                other => any_to_string(other),
            };
            record.push(text);
        }
        writer
            .write_record(&record)
            .map_err(|error| unavailable("write fact row", error))?;
    }
    writer
        .flush()
        .map_err(|error| unavailable("flush fact table", error))?;
    Ok(())
}

pub fn frame_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| BhytError::StoreUnavailable(format!("fact table is missing column '{name}'")))
}

/// The composite key of one frame row.
pub fn key_at(df: &DataFrame, idx: usize) -> Result<VisitKey> {
    let get = |name: &str| -> Result<AnyValue<'_>> {
        Ok(frame_column(df, name)?.get(idx).unwrap_or(AnyValue::Null))
    };
    Ok(VisitKey {
        ma_cskcb: any_to_string_non_empty(get(col::MA_CSKCB)?),
        ma_bn: any_to_string_non_empty(get(col::MA_BN)?),
        ma_loaikcb: any_to_i64(get(col::MA_LOAIKCB)?),
        ngay_vao: any_to_string_non_empty(get(col::NGAY_VAO)?),
        ngay_ra: any_to_string_non_empty(get(col::NGAY_RA)?),
    })
}

/// (year, month, facility) of one frame row, for purge filtering.
pub fn month_facility_at(df: &DataFrame, idx: usize) -> Result<(Option<i64>, Option<i64>, Option<String>)> {
    let get = |name: &str| -> Result<AnyValue<'_>> {
        Ok(frame_column(df, name)?.get(idx).unwrap_or(AnyValue::Null))
    };
    Ok((
        any_to_i64(get(col::NAM_QT)?),
        any_to_i64(get(col::THANG_QT)?),
        any_to_string_non_empty(get(col::MA_CSKCB)?),
    ))
}
