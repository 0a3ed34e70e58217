pub mod dedupe;
pub mod extract;

pub use dedupe::{DuplicatePolicy, ImportOptions, ImportOutcome, find_duplicates, import_records};
pub use extract::{DATE_FORMAT, DATETIME_FORMAT, ImportGroup, read_extract, summarize};
