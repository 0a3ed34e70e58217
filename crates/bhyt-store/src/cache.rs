//! Bounded-TTL cache for aggregate results.
//!
//! Stale aggregates silently mislead financial reporting, so the contract
//! is strict: entries expire after a few minutes on their own, and every
//! write to the warehouse clears the whole cache before the write call
//! returns.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use bhyt_model::query::{AggregateRequest, GroupRow};

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug)]
pub struct AggregateCache {
    ttl: Duration,
    entries: Mutex<HashMap<AggregateRequest, (Instant, Vec<GroupRow>)>>,
}

impl Default for AggregateCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl AggregateCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, request: &AggregateRequest) -> Option<Vec<GroupRow>> {
        let entries = self.entries.lock().ok()?;
        let (stored_at, rows) = entries.get(request)?;
        if stored_at.elapsed() > self.ttl {
            return None;
        }
        Some(rows.clone())
    }

    pub fn put(&self, request: AggregateRequest, rows: Vec<GroupRow>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(request, (Instant::now(), rows));
        }
    }

    /// Drops every entry. Called synchronously by all write paths.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}
