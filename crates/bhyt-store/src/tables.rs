//! Lookup-table and profile persistence.
//!
//! The three reference tables are small CSV files in the data directory;
//! profiles live in one JSON file. Saves replace the whole file — the
//! warehouse never holds partial lookup or profile state.

use std::path::Path;

use bhyt_common::parse_i64;
use bhyt_model::error::{BhytError, Result};
use bhyt_model::lookup::{DepartmentRow, FacilityRow, LookupSet, Validity, VisitTypeRow};
use bhyt_model::profile::ProfileRow;

pub const LOAIKCB_FILE: &str = "lookup_loaikcb.csv";
pub const CSKCB_FILE: &str = "lookup_cskcb.csv";
pub const KHOA_FILE: &str = "lookup_khoa.csv";
pub const PROFILES_FILE: &str = "profiles.json";

fn unavailable(what: &str, error: impl std::fmt::Display) -> BhytError {
    BhytError::StoreUnavailable(format!("{what}: {error}"))
}

/// A loaded CSV with header-keyed access, BOM-safe.
struct CsvTable {
    headers: Vec<String>,
    rows: Vec<csv::StringRecord>,
}

impl CsvTable {
    fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                headers: Vec::new(),
                rows: Vec::new(),
            });
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|error| unavailable("open lookup table", error))?;
        let headers = reader
            .headers()
            .map_err(|error| unavailable("read lookup header", error))?
            .iter()
            .map(|h| h.trim().trim_matches('\u{feff}').to_lowercase())
            .collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record.map_err(|error| unavailable("read lookup row", error))?);
        }
        Ok(Self { headers, rows })
    }

    fn field<'a>(&self, row: &'a csv::StringRecord, name: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h == name)?;
        let value = row.get(idx)?.trim();
        if value.is_empty() { None } else { Some(value) }
    }

    fn int_field(&self, row: &csv::StringRecord, name: &str) -> Option<i64> {
        self.field(row, name).and_then(parse_i64)
    }

    /// Facility codes come through spreadsheets as floats (`1234.0`); keep
    /// the canonical digit form so they join against the fact table.
    fn code_field(&self, row: &csv::StringRecord, name: &str) -> Option<String> {
        let raw = self.field(row, name)?;
        match parse_i64(raw) {
            Some(code) => Some(code.to_string()),
            None => Some(raw.to_string()),
        }
    }

    fn validity(&self, row: &csv::StringRecord) -> Validity {
        Validity::new(
            self.int_field(row, "valid_from"),
            self.int_field(row, "valid_to"),
        )
    }
}

/// Parses a visit-type classification CSV from any path.
pub fn load_visit_type_table(path: &Path) -> Result<Vec<VisitTypeRow>> {
    let table = CsvTable::load(path)?;
    Ok(table
        .rows
        .iter()
        .map(|row| VisitTypeRow {
            ma_loaikcb: table.int_field(row, "ma_loaikcb"),
            ml2: table.field(row, "ml2").map(str::to_string),
            ml4: table.field(row, "ml4").map(str::to_string),
            validity: table.validity(row),
        })
        .collect())
}

/// Parses a facility registry CSV from any path.
pub fn load_facility_table(path: &Path) -> Result<Vec<FacilityRow>> {
    let table = CsvTable::load(path)?;
    Ok(table
        .rows
        .iter()
        .map(|row| FacilityRow {
            ma_cskcb: table.code_field(row, "ma_cskcb"),
            ten_cskcb: table.field(row, "ten_cskcb").map(str::to_string),
            validity: table.validity(row),
        })
        .collect())
}

/// Parses a department registry CSV from any path.
pub fn load_department_table(path: &Path) -> Result<Vec<DepartmentRow>> {
    let table = CsvTable::load(path)?;
    Ok(table
        .rows
        .iter()
        .map(|row| DepartmentRow {
            ma_cskcb: table.code_field(row, "ma_cskcb"),
            makhoa_xml: table.field(row, "makhoa_xml").map(str::to_string),
            ma_gop: table.field(row, "ma_gop").map(str::to_string),
            full_name: table.field(row, "full_name").map(str::to_string),
            short_name: table.field(row, "short_name").map(str::to_string),
            thu_tu: table.int_field(row, "thu_tu"),
            validity: table.validity(row),
        })
        .collect())
}

/// Loads the three lookup tables; missing files are empty tables.
pub fn load_lookups(root: &Path) -> Result<LookupSet> {
    Ok(LookupSet {
        visit_types: load_visit_type_table(&root.join(LOAIKCB_FILE))?,
        facilities: load_facility_table(&root.join(CSKCB_FILE))?,
        departments: load_department_table(&root.join(KHOA_FILE))?,
    })
}

fn opt_int(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn opt_str(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

/// Writes all three lookup tables, replacing the previous files.
pub fn save_lookups(root: &Path, lookups: &LookupSet) -> Result<()> {
    let mut writer = csv::Writer::from_path(root.join(LOAIKCB_FILE))
        .map_err(|error| unavailable("write lookup table", error))?;
    writer
        .write_record(["ma_loaikcb", "ml2", "ml4", "valid_from", "valid_to"])
        .map_err(|error| unavailable("write lookup header", error))?;
    for row in &lookups.visit_types {
        writer
            .write_record([
                opt_int(row.ma_loaikcb),
                opt_str(row.ml2.as_deref()),
                opt_str(row.ml4.as_deref()),
                opt_int(row.validity.valid_from),
                opt_int(row.validity.valid_to),
            ])
            .map_err(|error| unavailable("write lookup row", error))?;
    }
    writer
        .flush()
        .map_err(|error| unavailable("flush lookup table", error))?;

    let mut writer = csv::Writer::from_path(root.join(CSKCB_FILE))
        .map_err(|error| unavailable("write lookup table", error))?;
    writer
        .write_record(["ma_cskcb", "ten_cskcb", "valid_from", "valid_to"])
        .map_err(|error| unavailable("write lookup header", error))?;
    for row in &lookups.facilities {
        writer
            .write_record([
                opt_str(row.ma_cskcb.as_deref()),
                opt_str(row.ten_cskcb.as_deref()),
                opt_int(row.validity.valid_from),
                opt_int(row.validity.valid_to),
            ])
            .map_err(|error| unavailable("write lookup row", error))?;
    }
    writer
        .flush()
        .map_err(|error| unavailable("flush lookup table", error))?;

    let mut writer = csv::Writer::from_path(root.join(KHOA_FILE))
        .map_err(|error| unavailable("write lookup table", error))?;
    writer
        .write_record([
            "ma_cskcb",
            "makhoa_xml",
            "ma_gop",
            "full_name",
            "short_name",
            "thu_tu",
            "valid_from",
            "valid_to",
        ])
        .map_err(|error| unavailable("write lookup header", error))?;
    for row in &lookups.departments {
        writer
            .write_record([
                opt_str(row.ma_cskcb.as_deref()),
                opt_str(row.makhoa_xml.as_deref()),
                opt_str(row.ma_gop.as_deref()),
                opt_str(row.full_name.as_deref()),
                opt_str(row.short_name.as_deref()),
                opt_int(row.thu_tu),
                opt_int(row.validity.valid_from),
                opt_int(row.validity.valid_to),
            ])
            .map_err(|error| unavailable("write lookup row", error))?;
    }
    writer
        .flush()
        .map_err(|error| unavailable("flush lookup table", error))?;
    Ok(())
}

/// Loads the profile rows; a missing file is an empty configuration.
pub fn load_profiles(root: &Path) -> Result<Vec<ProfileRow>> {
    let path = root.join(PROFILES_FILE);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text =
        std::fs::read_to_string(&path).map_err(|error| unavailable("read profiles", error))?;
    serde_json::from_str(&text).map_err(|error| unavailable("parse profiles", error))
}

/// Replaces the profile configuration file.
pub fn save_profiles(root: &Path, rows: &[ProfileRow]) -> Result<()> {
    let text = serde_json::to_string_pretty(rows)
        .map_err(|error| unavailable("encode profiles", error))?;
    std::fs::write(root.join(PROFILES_FILE), text)
        .map_err(|error| unavailable("write profiles", error))
}
