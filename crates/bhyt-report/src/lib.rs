pub mod compare;
pub mod department;
pub mod export;
pub mod format;
pub mod hospital;
pub mod icd;
pub mod order;
pub mod overview;
pub mod table;

pub use compare::{column_cell, column_is_integral, column_raw_value, per_visit_average, ratio_value};
pub use department::{DepartmentOptions, department_table};
pub use export::{export_csv, write_csv};
pub use format::{diff_cell, pct_change_cell};
pub use hospital::{HospitalOptions, hospital_table};
pub use icd::{
    CumulativeSelection, DiffDirection, IcdDiffMetric, IcdOptions, ShareMetric, cumulative_head,
    icd_table,
};
pub use order::{department_order, department_sort_key};
pub use overview::{OverviewMetric, overview_table};
pub use table::{Cell, PeriodSeries, ReportRow, ReportTable, RowKind, Tone};
