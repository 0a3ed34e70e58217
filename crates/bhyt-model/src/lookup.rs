//! Reference tables with validity intervals.
//!
//! Each lookup row carries `[valid_from, valid_to]` as integer `YYYYMMDD`
//! bounds (`valid_to` null = open-ended). A row applies to a fact row when
//! its interval contains the first day of the fact's settlement month. At
//! most one row per key should be valid for any month; overlapping intervals
//! are a data-quality problem upstream and are not defended against here.

use serde::{Deserialize, Serialize};

use crate::period::YearMonth;

/// An integer-date validity interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validity {
    pub valid_from: Option<i64>,
    pub valid_to: Option<i64>,
}

impl Validity {
    pub fn new(valid_from: Option<i64>, valid_to: Option<i64>) -> Self {
        Self {
            valid_from,
            valid_to,
        }
    }

    /// Containment check for a `YYYYMMDD` key. A null `valid_from` never
    /// matches, mirroring the warehouse join condition.
    pub fn contains(&self, date_key: i64) -> bool {
        self.valid_from.is_some_and(|from| from <= date_key)
            && self.valid_to.is_none_or(|to| to >= date_key)
    }

    pub fn contains_month(&self, month: YearMonth) -> bool {
        self.contains(month.first_day_key())
    }
}

/// Visit-type classification row (`lookup_loaikcb`): numeric visit-type code
/// to the two-level category pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisitTypeRow {
    pub ma_loaikcb: Option<i64>,
    pub ml2: Option<String>,
    pub ml4: Option<String>,
    #[serde(flatten)]
    pub validity: Validity,
}

/// Facility registry row (`lookup_cskcb`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacilityRow {
    pub ma_cskcb: Option<String>,
    pub ten_cskcb: Option<String>,
    #[serde(flatten)]
    pub validity: Validity,
}

/// Department registry row (`lookup_khoa`), keyed by (facility, raw
/// department code). `thu_tu` is the display-order rank used by the
/// department report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepartmentRow {
    pub ma_cskcb: Option<String>,
    pub makhoa_xml: Option<String>,
    pub ma_gop: Option<String>,
    pub full_name: Option<String>,
    pub short_name: Option<String>,
    pub thu_tu: Option<i64>,
    #[serde(flatten)]
    pub validity: Validity,
}

/// The three reference tables, loaded whole (they are small).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupSet {
    pub visit_types: Vec<VisitTypeRow>,
    pub facilities: Vec<FacilityRow>,
    pub departments: Vec<DepartmentRow>,
}

impl LookupSet {
    pub fn visit_type_at(&self, code: i64, month: YearMonth) -> Option<&VisitTypeRow> {
        self.visit_types
            .iter()
            .find(|row| row.ma_loaikcb == Some(code) && row.validity.contains_month(month))
    }

    pub fn facility_at(&self, code: &str, month: YearMonth) -> Option<&FacilityRow> {
        self.facilities
            .iter()
            .find(|row| row.ma_cskcb.as_deref() == Some(code) && row.validity.contains_month(month))
    }

    pub fn department_at(
        &self,
        facility: &str,
        department: &str,
        month: YearMonth,
    ) -> Option<&DepartmentRow> {
        self.departments.iter().find(|row| {
            row.ma_cskcb.as_deref() == Some(facility)
                && row.makhoa_xml.as_deref() == Some(department)
                && row.validity.contains_month(month)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_bounds_are_inclusive() {
        let validity = Validity::new(Some(20_250_101), Some(20_251_231));
        assert!(validity.contains(20_250_101));
        assert!(validity.contains(20_251_231));
        assert!(!validity.contains(20_241_231));
        assert!(!validity.contains(20_260_101));
    }

    #[test]
    fn open_ended_validity_has_no_upper_bound() {
        let validity = Validity::new(Some(20_250_101), None);
        assert!(validity.contains(20_990_101));
    }

    #[test]
    fn null_valid_from_never_matches() {
        let validity = Validity::new(None, None);
        assert!(!validity.contains(20_250_101));
    }

    #[test]
    fn lookups_respect_validity_at_month() {
        let lookups = LookupSet {
            visit_types: vec![
                VisitTypeRow {
                    ma_loaikcb: Some(1),
                    ml2: Some("Ngoại trú".to_string()),
                    ml4: Some("Khám bệnh".to_string()),
                    validity: Validity::new(Some(20_250_101), Some(20_251_231)),
                },
                VisitTypeRow {
                    ma_loaikcb: Some(1),
                    ml2: Some("Nội trú".to_string()),
                    ml4: None,
                    validity: Validity::new(Some(20_260_101), None),
                },
            ],
            ..LookupSet::default()
        };
        let old = lookups.visit_type_at(1, YearMonth::new(2025, 6)).unwrap();
        assert_eq!(old.ml2.as_deref(), Some("Ngoại trú"));
        let new = lookups.visit_type_at(1, YearMonth::new(2026, 2)).unwrap();
        assert_eq!(new.ml2.as_deref(), Some("Nội trú"));
        assert!(lookups.visit_type_at(2, YearMonth::new(2026, 2)).is_none());
    }
}
