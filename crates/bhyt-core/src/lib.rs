pub mod aggregate;
pub mod enrich;

pub use aggregate::{aggregate_frame, distinct_departments, distinct_year_months};
pub use enrich::{Enrichment, VisitFacts, diagnosis_prefix, enrich};
