pub mod cache;
pub mod dir;
pub mod frame;
pub mod tables;
pub mod warehouse;

pub use cache::{AggregateCache, DEFAULT_TTL};
pub use dir::{DirWarehouse, FACTS_FILE};
pub use tables::{
    CSKCB_FILE, KHOA_FILE, LOAIKCB_FILE, PROFILES_FILE, load_department_table,
    load_facility_table, load_visit_type_table,
};
pub use warehouse::Warehouse;
