pub mod classify;
pub mod error;
pub mod lookup;
pub mod metric;
pub mod period;
pub mod profile;
pub mod query;
pub mod record;
pub mod visit;

pub use classify::{K35_DEPARTMENT_CODE, KHAM_BENH_PREFIX, ML2_INPATIENT, ML2_OUTPATIENT, ML4_OUTPATIENT_TREATMENT};
pub use error::{BhytError, Result};
pub use lookup::{DepartmentRow, FacilityRow, LookupSet, Validity, VisitTypeRow};
pub use metric::{ColumnKind, ColumnSpec, Denominator, RatioFormat, ValueField, column_for_key, default_columns};
pub use period::{Period, YearMonth};
pub use profile::{ProfileRow, profile_names, resolve_columns};
pub use query::{AggregateRequest, GroupKey, GroupRow, Grouping, Totals};
pub use record::{CellValue, VisitRecord};
pub use visit::{ColumnDef, ColumnType, KEY_COLUMNS, VISIT_COLUMNS, VisitKey, col, column_def};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_rows_round_trip_as_json() {
        let rows = vec![ProfileRow {
            profile_name: "ban giám đốc".to_string(),
            metric_key: "t_tongchi".to_string(),
            thu_tu: 1,
            visible: true,
        }];
        let json = serde_json::to_string(&rows).expect("serialize profile rows");
        let round: Vec<ProfileRow> = serde_json::from_str(&json).expect("deserialize profile rows");
        assert_eq!(round, rows);
    }
}
