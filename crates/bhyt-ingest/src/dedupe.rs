//! Row-level duplicate detection and import policies.
//!
//! One treatment episode is identified by (facility, patient, visit type,
//! admission, discharge). Before committing an extract, the rows whose keys
//! already exist in the warehouse are flagged; the operator decides whether
//! to skip them, allow the duplicates, or replace the old rows.

use std::collections::HashSet;

use bhyt_model::error::Result;
use bhyt_model::record::VisitRecord;
use bhyt_model::visit::VisitKey;
use bhyt_store::Warehouse;
use tracing::{info, warn};

use crate::extract::{ImportGroup, summarize};

/// What to do with rows whose key already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Keep the warehouse as is; import only the new rows.
    #[default]
    Skip,
    /// Import everything, duplicates included (operator override).
    Allow,
    /// Delete the matching old rows first, then import everything.
    Replace,
}

/// Keys from the batch that already exist in the warehouse.
pub fn find_duplicates(store: &dyn Warehouse, records: &[VisitRecord]) -> Result<Vec<VisitKey>> {
    let keys: Vec<VisitKey> = records.iter().map(VisitRecord::key).collect();
    store.existing_keys(&keys)
}

/// Outcome of one import run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportOutcome {
    pub parsed: usize,
    pub duplicates: usize,
    /// The colliding episode keys, for operator review.
    pub duplicate_keys: Vec<VisitKey>,
    pub deleted: usize,
    pub inserted: usize,
    pub dry_run: bool,
    pub summary: Vec<ImportGroup>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    pub policy: DuplicatePolicy,
    /// Detect and report without writing anything.
    pub dry_run: bool,
}

/// Applies the duplicate policy and commits the batch.
///
/// The fact table's aggregates stay correct under every policy — duplicates
/// prevented, skipped, or deliberately allowed — because aggregation reads
/// whatever rows are committed.
pub fn import_records(
    store: &dyn Warehouse,
    records: Vec<VisitRecord>,
    options: ImportOptions,
) -> Result<ImportOutcome> {
    let parsed = records.len();
    let summary = summarize(&records);
    let duplicates = find_duplicates(store, &records)?;
    if !duplicates.is_empty() {
        warn!(rows = duplicates.len(), "duplicate episodes already in the warehouse");
    }

    let mut outcome = ImportOutcome {
        parsed,
        duplicates: duplicate_row_count(&records, &duplicates),
        dry_run: options.dry_run,
        summary,
        ..ImportOutcome::default()
    };
    if options.dry_run {
        outcome.duplicate_keys = duplicates;
        return Ok(outcome);
    }

    match options.policy {
        DuplicatePolicy::Skip => {
            let existing: HashSet<&VisitKey> = duplicates.iter().collect();
            let fresh: Vec<VisitRecord> = records
                .into_iter()
                .filter(|record| !existing.contains(&record.key()))
                .collect();
            outcome.inserted = store.append(&fresh)?;
        }
        DuplicatePolicy::Allow => {
            outcome.inserted = store.append(&records)?;
        }
        DuplicatePolicy::Replace => {
            outcome.deleted = store.delete_keys(&duplicates)?;
            outcome.inserted = store.append(&records)?;
        }
    }
    outcome.duplicate_keys = duplicates;
    info!(
        inserted = outcome.inserted,
        deleted = outcome.deleted,
        skipped = outcome.parsed - outcome.inserted,
        "import committed"
    );
    Ok(outcome)
}

/// How many batch rows collide with an existing key.
fn duplicate_row_count(records: &[VisitRecord], duplicates: &[VisitKey]) -> usize {
    let existing: HashSet<&VisitKey> = duplicates.iter().collect();
    records
        .iter()
        .filter(|record| existing.contains(&record.key()))
        .count()
}
