//! In-memory progress store.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;

use super::journal::{merge_entries, JournalEntry};
use super::progress::{Lease, RunProgress};
use super::store::ProgressStore;
use crate::error::{KickoffError, Result};

#[derive(Debug, Default)]
struct Records {
    progress: RunProgress,
    lease: Option<Lease>,
    journal: Vec<JournalEntry>,
    unavailable: bool,
    saves: usize,
}

/// A [`ProgressStore`] that lives only as long as the process.
///
/// The mutex gives the same check-and-set guarantee as the file store's
/// lock. [`set_unavailable`](Self::set_unavailable) makes every call fail
/// with a storage error.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    records: Mutex<Records>,
}

impl MemoryProgressStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing progress record.
    pub fn with_progress(progress: RunProgress) -> Self {
        Self {
            records: Mutex::new(Records {
                progress,
                ..Default::default()
            }),
        }
    }

    /// Simulate the backing storage going away (or coming back).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    fn lock(&self) -> MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn available(&self) -> Result<MutexGuard<'_, Records>> {
        let records = self.lock();
        if records.unavailable {
            return Err(KickoffError::storage("memory", "store unavailable"));
        }
        Ok(records)
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self) -> Result<RunProgress> {
        let records = self.available()?;
        let now = Utc::now();
        let mut progress = records.progress.clone();
        progress.lease_expiry = records
            .lease
            .as_ref()
            .filter(|lease| lease.is_active(now))
            .map(|lease| lease.expires_at);
        Ok(progress)
    }

    fn save(&self, progress: &RunProgress) -> Result<()> {
        let mut records = self.available()?;
        records.progress = RunProgress {
            lease_expiry: None,
            ..progress.clone()
        };
        records.saves += 1;
        Ok(())
    }

    fn save_as_holder(&self, holder: &str, progress: &RunProgress) -> Result<bool> {
        let mut records = self.available()?;
        if !records.lease.as_ref().is_some_and(|l| l.holder == holder) {
            return Ok(false);
        }
        records.progress = RunProgress {
            lease_expiry: None,
            ..progress.clone()
        };
        records.saves += 1;
        Ok(true)
    }

    fn lease(&self) -> Result<Option<Lease>> {
        Ok(self.available()?.lease.clone())
    }

    fn acquire_lease(&self, holder: &str, ttl: Duration) -> Result<bool> {
        let mut records = self.available()?;
        if let Some(current) = &records.lease {
            if current.holder != holder && current.is_active(Utc::now()) {
                return Ok(false);
            }
        }
        records.lease = Some(Lease::new(holder, ttl));
        Ok(true)
    }

    fn renew_lease(&self, holder: &str, ttl: Duration) -> Result<bool> {
        let mut records = self.available()?;
        if !records.lease.as_ref().is_some_and(|l| l.holder == holder) {
            return Ok(false);
        }
        records.lease = Some(Lease::new(holder, ttl));
        Ok(true)
    }

    fn release_lease(&self, holder: &str) -> Result<()> {
        let mut records = self.available()?;
        if records.lease.as_ref().is_some_and(|l| l.holder == holder) {
            records.lease = None;
        }
        Ok(())
    }

    fn append_journal(&self, entries: &[JournalEntry], retention: usize) -> Result<()> {
        let mut records = self.available()?;
        merge_entries(&mut records.journal, entries, retention);
        Ok(())
    }

    fn journal(&self, limit: usize) -> Result<Vec<JournalEntry>> {
        let records = self.available()?;
        Ok(records.journal.iter().take(limit).cloned().collect())
    }

    fn reset(&self) -> Result<()> {
        let mut records = self.available()?;
        records.progress = RunProgress::default();
        records.lease = None;
        records.journal.clear();
        Ok(())
    }
}
