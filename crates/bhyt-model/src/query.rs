//! Aggregation requests and results.
//!
//! The warehouse answers one query shape: "sum the value fields, grouped by
//! this dimension, filtered to this settlement-month range and optional
//! category/department filter". These are the types on both sides of that
//! call.

use serde::{Deserialize, Serialize};

use crate::metric::ValueField;
use crate::period::Period;

/// Grouping dimension of an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grouping {
    /// (`ml2`, derived department), restricted to rows with a department
    /// label.
    Department,
    /// Derived `ml2` alone, restricted to rows with a department label.
    VisitType,
    /// Three-character primary-diagnosis prefix, restricted to rows with a
    /// diagnosis code.
    DiagnosisPrefix,
    /// (settlement month, `ml2`, facility) — the overview pivot.
    FacilityMonth,
}

/// One aggregation call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregateRequest {
    pub period: Period,
    pub grouping: Grouping,
    /// Restrict to one visit-type category (`Nội trú` / `Ngoại trú`).
    pub ml2: Option<String>,
    /// Restrict to one derived department label.
    pub khoa: Option<String>,
}

impl AggregateRequest {
    pub fn new(period: Period, grouping: Grouping) -> Self {
        Self {
            period,
            grouping,
            ml2: None,
            khoa: None,
        }
    }

    pub fn with_ml2(mut self, ml2: Option<String>) -> Self {
        self.ml2 = ml2;
        self
    }

    pub fn with_khoa(mut self, khoa: Option<String>) -> Self {
        self.khoa = khoa;
        self
    }
}

/// Distinct values of the grouping dimension. Only the fields of the chosen
/// grouping are populated; the derived `Ord` gives results a deterministic
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub month: Option<u32>,
    pub ml2: Option<String>,
    pub khoa: Option<String>,
    pub ma_cskcb: Option<String>,
    pub ten_cskcb: Option<String>,
    pub icd: Option<String>,
}

/// Per-group sums. Null field values count as zero, so a group whose rows
/// carry only nulls sums to 0, never null.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    so_luot: u64,
    sums: [f64; ValueField::ALL.len()],
}

impl Totals {
    /// Matching-record count (`so_luot`).
    pub fn count(&self) -> u64 {
        self.so_luot
    }

    pub fn get(&self, field: ValueField) -> f64 {
        self.sums[field.index()]
    }

    /// Counts one record with its field values; `None` adds nothing.
    pub fn add_record(&mut self, values: [Option<f64>; ValueField::ALL.len()]) {
        self.so_luot += 1;
        for (slot, value) in self.sums.iter_mut().zip(values) {
            *slot += value.unwrap_or(0.0);
        }
    }

    /// Sum-of-sums accumulation used by subtotal and grand-total rows, so
    /// totals stay bit-consistent with the detail rows they summarize.
    pub fn merge(&mut self, other: &Totals) {
        self.so_luot += other.so_luot;
        for (slot, value) in self.sums.iter_mut().zip(other.sums) {
            *slot += value;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub key: GroupKey,
    pub totals: Totals,
}
