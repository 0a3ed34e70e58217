//! The warehouse boundary.
//!
//! Everything the reporting layers may ask of the tabular store, kept
//! narrow on purpose: aggregate queries, period discovery, the
//! composite-key operations the import pipeline needs, and the two small
//! configuration tables with full-replace save semantics.

use bhyt_model::error::Result;
use bhyt_model::lookup::LookupSet;
use bhyt_model::period::{Period, YearMonth};
use bhyt_model::profile::ProfileRow;
use bhyt_model::query::{AggregateRequest, GroupRow};
use bhyt_model::record::VisitRecord;
use bhyt_model::visit::VisitKey;

pub trait Warehouse {
    /// Distinct settlement months with data, ascending.
    fn distinct_year_months(&self) -> Result<Vec<YearMonth>>;

    /// Distinct derived department labels inside the given ranges.
    fn distinct_departments(&self, periods: &[Period], ml2: Option<&str>) -> Result<Vec<String>>;

    /// Runs one aggregation. Results may be served from a bounded-TTL cache;
    /// every write invalidates that cache before returning.
    fn aggregate(&self, request: &AggregateRequest) -> Result<Vec<GroupRow>>;

    /// Which of the given composite keys already exist in the fact table.
    fn existing_keys(&self, keys: &[VisitKey]) -> Result<Vec<VisitKey>>;

    /// Appends normalized rows. Returns the number appended.
    fn append(&self, rows: &[VisitRecord]) -> Result<usize>;

    /// Deletes every row matching one of the composite keys. Returns the
    /// number removed.
    fn delete_keys(&self, keys: &[VisitKey]) -> Result<usize>;

    /// Administrative purge by settlement month, optionally narrowed to one
    /// facility. Returns the number removed.
    fn purge(&self, month: YearMonth, facility: Option<&str>) -> Result<usize>;

    /// Total fact-row count.
    fn row_count(&self) -> Result<usize>;

    fn lookups(&self) -> Result<LookupSet>;

    /// Replaces the three lookup tables wholesale (last writer wins).
    fn replace_lookups(&self, lookups: &LookupSet) -> Result<()>;

    fn profiles(&self) -> Result<Vec<ProfileRow>>;

    /// Replaces the profile configuration wholesale.
    fn replace_profiles(&self, rows: &[ProfileRow]) -> Result<()>;
}
