pub mod value;

pub use value::{
    any_to_f64, any_to_i64, any_to_string, any_to_string_non_empty, format_numeric,
    parse_date_int, parse_datetime_compact, parse_f64, parse_i64,
};
