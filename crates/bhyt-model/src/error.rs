use thiserror::Error;

use crate::period::YearMonth;

#[derive(Debug, Error)]
pub enum BhytError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The warehouse could not be reached or a query against it failed.
    /// Blocks only the report section that needed it.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    /// A period whose start is chronologically after its end. Caught before
    /// any query runs; other periods in the same comparison stay usable.
    #[error("invalid period: 'from' {from} is after 'to' {to}")]
    InvalidPeriod { from: YearMonth, to: YearMonth },
    #[error("unknown metric key '{0}'")]
    UnknownMetric(String),
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, BhytError>;
