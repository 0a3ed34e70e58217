//! Classification vocabulary shared by the enrichment rule and the reports.
//!
//! These strings come from the visit-type lookup table and are matched
//! literally; they are part of the derived view's contract.

/// Outpatient visit-type category.
pub const ML2_OUTPATIENT: &str = "Ngoại trú";

/// Inpatient visit-type category.
pub const ML2_INPATIENT: &str = "Nội trú";

/// Subcategory whose department label depends on the raw department code.
pub const ML4_OUTPATIENT_TREATMENT: &str = "Điều trị ngoại trú";

/// Raw department code routed to the department registry even for
/// outpatient-treatment rows.
pub const K35_DEPARTMENT_CODE: &str = "K35";

/// Prefix of the derived consultation department label
/// (`Khám bệnh (<facility name>)`).
pub const KHAM_BENH_PREFIX: &str = "Khám bệnh";
