//! Record enrichment.
//!
//! The derived view over the fact table: per record and settlement month,
//! resolve the visit-type category pair, the facility display name, the
//! department label and the diagnosis prefix from the three lookup tables.
//! Pure and side-effect free; recomputed on every read, never persisted.

use bhyt_model::lookup::LookupSet;
use bhyt_model::period::YearMonth;
use bhyt_model::{K35_DEPARTMENT_CODE, KHAM_BENH_PREFIX, ML2_OUTPATIENT, ML4_OUTPATIENT_TREATMENT};

/// The raw fields the enrichment reads from a fact row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitFacts {
    pub ma_loaikcb: Option<i64>,
    pub ma_cskcb: Option<String>,
    pub ma_khoa: Option<String>,
    pub ma_benh: Option<String>,
}

/// The derived columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    pub ml2: Option<String>,
    pub ml4: Option<String>,
    pub ten_cskcb: Option<String>,
    pub khoa: Option<String>,
    pub ma_benh_chinh: Option<String>,
}

/// Derives the view columns for one record at its settlement month.
pub fn enrich(facts: &VisitFacts, month: YearMonth, lookups: &LookupSet) -> Enrichment {
    let visit_type = facts
        .ma_loaikcb
        .and_then(|code| lookups.visit_type_at(code, month));
    let ml2 = visit_type.and_then(|row| row.ml2.clone());
    let ml4 = visit_type.and_then(|row| row.ml4.clone());

    let ten_cskcb = facts
        .ma_cskcb
        .as_deref()
        .and_then(|code| lookups.facility_at(code, month))
        .and_then(|row| row.ten_cskcb.clone());

    let khoa = department_label(facts, month, lookups, ml2.as_deref(), ml4.as_deref(), ten_cskcb.as_deref());

    let ma_benh_chinh = facts.ma_benh.as_deref().map(diagnosis_prefix);

    Enrichment {
        ml2,
        ml4,
        ten_cskcb,
        khoa,
        ma_benh_chinh,
    }
}

/// First three characters of the primary diagnosis code.
pub fn diagnosis_prefix(code: &str) -> String {
    code.chars().take(3).collect()
}

/// The four-branch department rule. The branch order is load-bearing:
///
/// 1. outpatient + outpatient-treatment + department code `K35`
///    -> registry short name;
/// 2. outpatient + outpatient-treatment, any other department code
///    -> the literal `Điều trị ngoại trú`;
/// 3. outpatient, any other subcategory -> `Khám bệnh (<facility>)`, with a
///    missing facility name rendered as the empty string, never a null text;
/// 4. everything else (inpatient or unclassified) -> registry short name,
///    which may be absent.
fn department_label(
    facts: &VisitFacts,
    month: YearMonth,
    lookups: &LookupSet,
    ml2: Option<&str>,
    ml4: Option<&str>,
    ten_cskcb: Option<&str>,
) -> Option<String> {
    if ml2 == Some(ML2_OUTPATIENT) {
        if ml4 == Some(ML4_OUTPATIENT_TREATMENT) {
            if facts.ma_khoa.as_deref() == Some(K35_DEPARTMENT_CODE) {
                return department_short_name(facts, month, lookups);
            }
            return Some(ML4_OUTPATIENT_TREATMENT.to_string());
        }
        return Some(format!(
            "{KHAM_BENH_PREFIX} ({})",
            ten_cskcb.unwrap_or_default()
        ));
    }
    department_short_name(facts, month, lookups)
}

fn department_short_name(
    facts: &VisitFacts,
    month: YearMonth,
    lookups: &LookupSet,
) -> Option<String> {
    let facility = facts.ma_cskcb.as_deref()?;
    let department = facts.ma_khoa.as_deref()?;
    lookups
        .department_at(facility, department, month)
        .and_then(|row| row.short_name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bhyt_model::lookup::{DepartmentRow, FacilityRow, Validity, VisitTypeRow};

    const OPEN: Validity = Validity {
        valid_from: Some(20_250_101),
        valid_to: None,
    };

    fn lookups() -> LookupSet {
        LookupSet {
            visit_types: vec![
                VisitTypeRow {
                    ma_loaikcb: Some(1),
                    ml2: Some("Ngoại trú".to_string()),
                    ml4: Some("Khám bệnh".to_string()),
                    validity: OPEN,
                },
                VisitTypeRow {
                    ma_loaikcb: Some(2),
                    ml2: Some("Ngoại trú".to_string()),
                    ml4: Some("Điều trị ngoại trú".to_string()),
                    validity: OPEN,
                },
                VisitTypeRow {
                    ma_loaikcb: Some(3),
                    ml2: Some("Nội trú".to_string()),
                    ml4: None,
                    validity: OPEN,
                },
            ],
            facilities: vec![FacilityRow {
                ma_cskcb: Some("01234".to_string()),
                ten_cskcb: Some("TTYT Thủy Nguyên".to_string()),
                validity: OPEN,
            }],
            departments: vec![
                DepartmentRow {
                    ma_cskcb: Some("01234".to_string()),
                    makhoa_xml: Some("K35".to_string()),
                    short_name: Some("Thận nhân tạo".to_string()),
                    validity: OPEN,
                    ..DepartmentRow::default()
                },
                DepartmentRow {
                    ma_cskcb: Some("01234".to_string()),
                    makhoa_xml: Some("K02".to_string()),
                    short_name: Some("Nội tổng hợp".to_string()),
                    validity: OPEN,
                    ..DepartmentRow::default()
                },
            ],
        }
    }

    fn facts(ma_loaikcb: i64, ma_khoa: &str) -> VisitFacts {
        VisitFacts {
            ma_loaikcb: Some(ma_loaikcb),
            ma_cskcb: Some("01234".to_string()),
            ma_khoa: Some(ma_khoa.to_string()),
            ma_benh: Some("J18.9".to_string()),
        }
    }

    fn month() -> YearMonth {
        YearMonth::new(2026, 1)
    }

    #[test]
    fn outpatient_consultation_carries_facility_name() {
        let enriched = enrich(&facts(1, "K01"), month(), &lookups());
        assert_eq!(enriched.ml2.as_deref(), Some("Ngoại trú"));
        assert_eq!(
            enriched.khoa.as_deref(),
            Some("Khám bệnh (TTYT Thủy Nguyên)")
        );
    }

    #[test]
    fn consultation_with_missing_facility_keeps_empty_parentheses() {
        let mut facts = facts(1, "K01");
        facts.ma_cskcb = Some("99999".to_string());
        let enriched = enrich(&facts, month(), &lookups());
        assert_eq!(enriched.khoa.as_deref(), Some("Khám bệnh ()"));
    }

    #[test]
    fn outpatient_treatment_is_the_literal_label() {
        let enriched = enrich(&facts(2, "K02"), month(), &lookups());
        assert_eq!(enriched.khoa.as_deref(), Some("Điều trị ngoại trú"));
    }

    #[test]
    fn outpatient_treatment_k35_uses_the_registry() {
        let enriched = enrich(&facts(2, "K35"), month(), &lookups());
        assert_eq!(enriched.khoa.as_deref(), Some("Thận nhân tạo"));
    }

    #[test]
    fn inpatient_uses_the_registry() {
        let enriched = enrich(&facts(3, "K02"), month(), &lookups());
        assert_eq!(enriched.ml2.as_deref(), Some("Nội trú"));
        assert_eq!(enriched.khoa.as_deref(), Some("Nội tổng hợp"));
    }

    #[test]
    fn unclassified_visit_type_falls_through_to_the_registry() {
        let enriched = enrich(&facts(9, "K02"), month(), &lookups());
        assert_eq!(enriched.ml2, None);
        assert_eq!(enriched.khoa.as_deref(), Some("Nội tổng hợp"));
    }

    #[test]
    fn inpatient_without_registry_row_has_no_label() {
        let enriched = enrich(&facts(3, "K77"), month(), &lookups());
        assert_eq!(enriched.khoa, None);
    }

    #[test]
    fn diagnosis_prefix_is_three_characters_null_safe() {
        let enriched = enrich(&facts(3, "K02"), month(), &lookups());
        assert_eq!(enriched.ma_benh_chinh.as_deref(), Some("J18"));

        let mut no_diag = facts(3, "K02");
        no_diag.ma_benh = None;
        assert_eq!(enrich(&no_diag, month(), &lookups()).ma_benh_chinh, None);

        let mut short = facts(3, "K02");
        short.ma_benh = Some("A0".to_string());
        assert_eq!(
            enrich(&short, month(), &lookups()).ma_benh_chinh.as_deref(),
            Some("A0")
        );
    }

    #[test]
    fn lookup_respects_settlement_month_validity() {
        let mut lookups = lookups();
        lookups.visit_types[0].validity = Validity {
            valid_from: Some(20_260_201),
            valid_to: None,
        };
        let enriched = enrich(&facts(1, "K01"), YearMonth::new(2026, 1), &lookups);
        // Not yet valid in January: unclassified, so the registry applies.
        assert_eq!(enriched.ml2, None);
        assert_eq!(enriched.khoa, None);
    }
}
