//! Directory-backed warehouse.
//!
//! A data directory holds the fact table (`visits.csv`), the three lookup
//! CSVs and `profiles.json`. The fact frame stays resident; every write
//! goes to disk and clears the aggregate cache before returning, so a
//! completed write is never followed by a stale read in this process.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray};
use tracing::{debug, info};

use bhyt_core::aggregate::{aggregate_frame, distinct_departments, distinct_year_months};
use bhyt_model::error::{BhytError, Result};
use bhyt_model::lookup::LookupSet;
use bhyt_model::period::{Period, YearMonth};
use bhyt_model::profile::ProfileRow;
use bhyt_model::query::{AggregateRequest, GroupRow};
use bhyt_model::record::VisitRecord;
use bhyt_model::visit::VisitKey;

use crate::cache::AggregateCache;
use crate::frame::{key_at, load_frame, month_facility_at, records_to_frame, save_frame};
use crate::tables::{load_lookups, load_profiles, save_lookups, save_profiles};
use crate::warehouse::Warehouse;

pub const FACTS_FILE: &str = "visits.csv";

pub struct DirWarehouse {
    root: PathBuf,
    facts: Mutex<DataFrame>,
    cache: AggregateCache,
}

impl DirWarehouse {
    /// Opens (and if needed creates) a data directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|error| BhytError::StoreUnavailable(format!("create data dir: {error}")))?;
        let facts = load_frame(&root.join(FACTS_FILE))?;
        debug!(rows = facts.height(), root = %root.display(), "warehouse opened");
        Ok(Self {
            root,
            facts: Mutex::new(facts),
            cache: AggregateCache::default(),
        })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn lock_facts(&self) -> Result<std::sync::MutexGuard<'_, DataFrame>> {
        self.facts
            .lock()
            .map_err(|_| BhytError::StoreUnavailable("fact table lock poisoned".to_string()))
    }

    /// Persists the current frame and drops cached aggregates; the write is
    /// not done until both happened.
    fn commit(&self, facts: &DataFrame) -> Result<()> {
        save_frame(facts, &self.root.join(FACTS_FILE))?;
        self.cache.clear();
        Ok(())
    }

    fn retain_rows(&self, keep: &[bool]) -> Result<usize> {
        let removed = keep.iter().filter(|flag| !**flag).count();
        if removed == 0 {
            return Ok(0);
        }
        let mut facts = self.lock_facts()?;
        let mask = BooleanChunked::from_slice("keep".into(), keep);
        *facts = facts
            .filter(&mask)
            .map_err(|error| BhytError::StoreUnavailable(format!("filter fact table: {error}")))?;
        self.commit(&facts)?;
        Ok(removed)
    }
}

impl Warehouse for DirWarehouse {
    fn distinct_year_months(&self) -> Result<Vec<YearMonth>> {
        let facts = self.lock_facts()?;
        distinct_year_months(&facts)
    }

    fn distinct_departments(&self, periods: &[Period], ml2: Option<&str>) -> Result<Vec<String>> {
        let facts = self.lock_facts()?;
        let lookups = load_lookups(&self.root)?;
        distinct_departments(&facts, &lookups, periods, ml2)
    }

    fn aggregate(&self, request: &AggregateRequest) -> Result<Vec<GroupRow>> {
        if let Some(rows) = self.cache.get(request) {
            debug!(period = %request.period, "aggregate served from cache");
            return Ok(rows);
        }
        let rows = {
            let facts = self.lock_facts()?;
            let lookups = load_lookups(&self.root)?;
            aggregate_frame(&facts, &lookups, request)?
        };
        self.cache.put(request.clone(), rows.clone());
        Ok(rows)
    }

    fn existing_keys(&self, keys: &[VisitKey]) -> Result<Vec<VisitKey>> {
        let wanted: HashSet<&VisitKey> = keys.iter().collect();
        let facts = self.lock_facts()?;
        let mut seen: HashSet<VisitKey> = HashSet::new();
        let mut found = Vec::new();
        for idx in 0..facts.height() {
            let key = key_at(&facts, idx)?;
            if wanted.contains(&key) && seen.insert(key.clone()) {
                found.push(key);
            }
        }
        Ok(found)
    }

    fn append(&self, rows: &[VisitRecord]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        let appended = records_to_frame(rows)?;
        let mut facts = self.lock_facts()?;
        facts
            .vstack_mut(&appended)
            .map_err(|error| BhytError::StoreUnavailable(format!("append fact rows: {error}")))?;
        self.commit(&facts)?;
        info!(rows = rows.len(), total = facts.height(), "fact rows appended");
        Ok(rows.len())
    }

    fn delete_keys(&self, keys: &[VisitKey]) -> Result<usize> {
        let doomed: HashSet<&VisitKey> = keys.iter().collect();
        let keep: Vec<bool> = {
            let facts = self.lock_facts()?;
            (0..facts.height())
                .map(|idx| key_at(&facts, idx).map(|key| !doomed.contains(&key)))
                .collect::<Result<Vec<_>>>()?
        };
        let removed = self.retain_rows(&keep)?;
        if removed > 0 {
            info!(rows = removed, "fact rows deleted by key");
        }
        Ok(removed)
    }

    fn purge(&self, month: YearMonth, facility: Option<&str>) -> Result<usize> {
        let keep: Vec<bool> = {
            let facts = self.lock_facts()?;
            (0..facts.height())
                .map(|idx| {
                    let (year, mon, cskcb) = month_facility_at(&facts, idx)?;
                    let matches_month = year == Some(i64::from(month.year))
                        && mon == Some(i64::from(month.month));
                    let matches_facility = facility
                        .is_none_or(|wanted| cskcb.as_deref() == Some(wanted));
                    Ok(!(matches_month && matches_facility))
                })
                .collect::<Result<Vec<_>>>()?
        };
        let removed = self.retain_rows(&keep)?;
        info!(%month, rows = removed, "fact rows purged");
        Ok(removed)
    }

    fn row_count(&self) -> Result<usize> {
        Ok(self.lock_facts()?.height())
    }

    fn lookups(&self) -> Result<LookupSet> {
        load_lookups(&self.root)
    }

    fn replace_lookups(&self, lookups: &LookupSet) -> Result<()> {
        save_lookups(&self.root, lookups)?;
        self.cache.clear();
        Ok(())
    }

    fn profiles(&self) -> Result<Vec<ProfileRow>> {
        load_profiles(&self.root)
    }

    fn replace_profiles(&self, rows: &[ProfileRow]) -> Result<()> {
        save_profiles(&self.root, rows)?;
        self.cache.clear();
        Ok(())
    }
}
