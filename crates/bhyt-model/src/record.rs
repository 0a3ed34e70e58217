//! Typed row carrier between the import pipeline and the warehouse.
//!
//! A normalized visit row is a sparse map from fact-table column names to
//! typed cells; the warehouse turns batches of them into frame columns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::visit::{VisitKey, col};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// One normalized fact row. Absent columns read as null.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisitRecord {
    cells: BTreeMap<String, CellValue>,
}

impl VisitRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: &str, value: CellValue) {
        if value.is_null() {
            self.cells.remove(column);
        } else {
            self.cells.insert(column.to_string(), value);
        }
    }

    pub fn get(&self, column: &str) -> &CellValue {
        static NULL: CellValue = CellValue::Null;
        self.cells.get(column).unwrap_or(&NULL)
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).as_text()
    }

    pub fn int(&self, column: &str) -> Option<i64> {
        self.get(column).as_i64()
    }

    pub fn float(&self, column: &str) -> Option<f64> {
        self.get(column).as_f64()
    }

    /// The composite uniqueness key of this row.
    pub fn key(&self) -> VisitKey {
        VisitKey {
            ma_cskcb: self.text(col::MA_CSKCB).map(str::to_string),
            ma_bn: self.text(col::MA_BN).map(str::to_string),
            ma_loaikcb: self.int(col::MA_LOAIKCB),
            ngay_vao: self.text(col::NGAY_VAO).map(str::to_string),
            ngay_ra: self.text(col::NGAY_RA).map(str::to_string),
        }
    }
}
