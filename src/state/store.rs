//! Durable progress storage.
//!
//! [`ProgressStore`] is the seam between the sequencer and wherever progress
//! lives. [`FileProgressStore`] keeps one directory per site:
//!
//! ```text
//! <state dir>/
//!   progress.yml   current step index, completed flag, fingerprint
//!   lease.yml      holder and expiry of the running invocation
//!   journal.yml    step results, newest first
//!   .lock          held exclusively while a record is read-modify-written
//! ```
//!
//! Records are written to a temp file and renamed into place, so a reader
//! never sees a partial record.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use super::journal::{merge_entries, JournalEntry};
use super::progress::{Lease, RunProgress};
use super::site_id::SiteId;
use crate::error::{KickoffError, Result};

/// Persistence for one site's progress, lease and journal.
pub trait ProgressStore: Send + Sync {
    /// Load progress; a missing record is the zero value.
    ///
    /// `lease_expiry` reflects the current lease, if one is held.
    fn load(&self) -> Result<RunProgress>;

    /// Persist progress atomically. The lease is not part of the write.
    fn save(&self, progress: &RunProgress) -> Result<()>;

    /// Persist progress only while `holder` is still named on the lease.
    ///
    /// Returns false, writing nothing, once another invocation has taken the
    /// lease over or it has been released.
    fn save_as_holder(&self, holder: &str, progress: &RunProgress) -> Result<bool>;

    /// The current lease, expired or not.
    fn lease(&self) -> Result<Option<Lease>>;

    /// Take the lease for `holder` unless someone else holds an unexpired one.
    fn acquire_lease(&self, holder: &str, ttl: Duration) -> Result<bool>;

    /// Extend the lease by `ttl` if `holder` still owns it, expired or not.
    fn renew_lease(&self, holder: &str, ttl: Duration) -> Result<bool>;

    /// Drop the lease if `holder` still owns it.
    fn release_lease(&self, holder: &str) -> Result<()>;

    /// Add entries (oldest first), keeping at most `retention`.
    fn append_journal(&self, entries: &[JournalEntry], retention: usize) -> Result<()>;

    /// Up to `limit` journal entries, newest first.
    fn journal(&self, limit: usize) -> Result<Vec<JournalEntry>>;

    /// Delete progress, lease and journal.
    fn reset(&self) -> Result<()>;
}

/// Progress stored as YAML files in a per-site directory.
#[derive(Debug, Clone)]
pub struct FileProgressStore {
    dir: PathBuf,
}

impl FileProgressStore {
    /// Store rooted at `dir`; the directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in the default location for a site.
    pub fn for_site(site: &SiteId) -> Self {
        Self::new(site.default_state_dir())
    }

    /// Directory holding the records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn progress_path(&self) -> PathBuf {
        self.dir.join("progress.yml")
    }

    fn lease_path(&self) -> PathBuf {
        self.dir.join("lease.yml")
    }

    fn journal_path(&self) -> PathBuf {
        self.dir.join("journal.yml")
    }

    /// Hold the directory lock for the duration of `f`.
    fn locked<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock_path = self.dir.join(".lock");
        fs::create_dir_all(&self.dir).map_err(|e| KickoffError::storage(&self.dir, e))?;
        let file: File = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| KickoffError::storage(&lock_path, e))?;
        file.lock().map_err(|e| KickoffError::storage(&lock_path, e))?;
        let result = f();
        drop(file);
        result
    }
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(KickoffError::storage(path, e)),
    };
    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|e| KickoffError::storage(path, e))
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| KickoffError::storage(dir, e))?;
    }
    let content = serde_yaml::to_string(value).map_err(|e| KickoffError::storage(path, e))?;

    let temp_path = path.with_extension("yml.tmp");
    fs::write(&temp_path, &content).map_err(|e| KickoffError::storage(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| KickoffError::storage(path, e))
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(KickoffError::storage(path, e)),
    }
}

impl ProgressStore for FileProgressStore {
    fn load(&self) -> Result<RunProgress> {
        let mut progress: RunProgress = read_yaml(&self.progress_path())?.unwrap_or_default();
        let now = Utc::now();
        progress.lease_expiry = self
            .lease()?
            .filter(|lease| lease.is_active(now))
            .map(|lease| lease.expires_at);
        Ok(progress)
    }

    fn save(&self, progress: &RunProgress) -> Result<()> {
        let record = RunProgress {
            lease_expiry: None,
            ..progress.clone()
        };
        debug!(
            "Saving progress: index {}, completed {}",
            record.current_step_index, record.completed
        );
        write_yaml(&self.progress_path(), &record)
    }

    fn save_as_holder(&self, holder: &str, progress: &RunProgress) -> Result<bool> {
        self.locked(|| {
            if !self.lease()?.is_some_and(|lease| lease.holder == holder) {
                debug!("Lease no longer held by {}; not saving", holder);
                return Ok(false);
            }
            self.save(progress)?;
            Ok(true)
        })
    }

    fn lease(&self) -> Result<Option<Lease>> {
        read_yaml(&self.lease_path())
    }

    fn acquire_lease(&self, holder: &str, ttl: Duration) -> Result<bool> {
        self.locked(|| {
            if let Some(current) = self.lease()? {
                if current.holder != holder && current.is_active(Utc::now()) {
                    debug!("Lease held by {} until {}", current.holder, current.expires_at);
                    return Ok(false);
                }
            }
            write_yaml(&self.lease_path(), &Lease::new(holder, ttl))?;
            Ok(true)
        })
    }

    fn renew_lease(&self, holder: &str, ttl: Duration) -> Result<bool> {
        self.locked(|| match self.lease()? {
            Some(current) if current.holder == holder => {
                write_yaml(&self.lease_path(), &Lease::new(holder, ttl))?;
                Ok(true)
            }
            _ => Ok(false),
        })
    }

    fn release_lease(&self, holder: &str) -> Result<()> {
        self.locked(|| match self.lease()? {
            Some(current) if current.holder == holder => remove_if_exists(&self.lease_path()),
            _ => Ok(()),
        })
    }

    fn append_journal(&self, entries: &[JournalEntry], retention: usize) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        self.locked(|| {
            let mut journal: Vec<JournalEntry> =
                read_yaml(&self.journal_path())?.unwrap_or_default();
            merge_entries(&mut journal, entries, retention);
            write_yaml(&self.journal_path(), &journal)
        })
    }

    fn journal(&self, limit: usize) -> Result<Vec<JournalEntry>> {
        let mut journal: Vec<JournalEntry> = read_yaml(&self.journal_path())?.unwrap_or_default();
        journal.truncate(limit);
        Ok(journal)
    }

    fn reset(&self) -> Result<()> {
        if !self.dir.exists() {
            return Ok(());
        }
        self.locked(|| {
            remove_if_exists(&self.progress_path())?;
            remove_if_exists(&self.lease_path())?;
            remove_if_exists(&self.journal_path())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::StepResult;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileProgressStore) {
        let temp = TempDir::new().unwrap();
        let store = FileProgressStore::new(temp.path().join("state"));
        (temp, store)
    }

    fn entry(name: &str) -> JournalEntry {
        JournalEntry::from_result(&StepResult::failure(name, name, "boom"))
    }

    #[test]
    fn missing_record_loads_as_zero() {
        let (_temp, store) = store();
        assert_eq!(store.load().unwrap(), RunProgress::default());
    }

    #[test]
    fn save_and_load() {
        let (_temp, store) = store();
        let mut progress = RunProgress::default();
        progress.advance();
        progress.fingerprint = Some("abc".to_string());

        store.save(&progress).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.current_step_index, 1);
        assert_eq!(loaded.fingerprint.as_deref(), Some("abc"));
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let (_temp, store) = store();
        store.save(&RunProgress::default()).unwrap();

        assert!(store.dir().join("progress.yml").exists());
        assert!(!store.dir().join("progress.yml.tmp").exists());
    }

    #[test]
    fn corrupt_record_is_storage_error() {
        let (_temp, store) = store();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.dir().join("progress.yml"), "current_step_index: [oops").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, KickoffError::Storage { .. }));
    }

    #[test]
    fn lease_excludes_other_holders() {
        let (_temp, store) = store();
        let ttl = Duration::from_secs(60);

        assert!(store.acquire_lease("a", ttl).unwrap());
        assert!(!store.acquire_lease("b", ttl).unwrap());
        assert!(store.acquire_lease("a", ttl).unwrap());
        assert!(store.load().unwrap().lease_expiry.is_some());

        store.release_lease("a").unwrap();
        assert!(store.acquire_lease("b", ttl).unwrap());
    }

    #[test]
    fn release_by_non_holder_is_ignored() {
        let (_temp, store) = store();
        store.acquire_lease("a", Duration::from_secs(60)).unwrap();
        store.release_lease("b").unwrap();
        assert_eq!(store.lease().unwrap().unwrap().holder, "a");
    }

    #[test]
    fn expired_lease_can_be_taken_over() {
        let (_temp, store) = store();
        store.acquire_lease("crashed", Duration::ZERO).unwrap();

        assert!(store.load().unwrap().lease_expiry.is_none());
        assert!(store.acquire_lease("next", Duration::from_secs(60)).unwrap());
    }

    #[test]
    fn save_does_not_touch_lease() {
        let (_temp, store) = store();
        store.acquire_lease("a", Duration::from_secs(60)).unwrap();
        store.save(&RunProgress::default()).unwrap();
        assert!(store.lease().unwrap().is_some());
    }

    #[test]
    fn save_as_holder_requires_the_lease() {
        let (_temp, store) = store();
        let mut progress = RunProgress::default();
        progress.advance();

        assert!(!store.save_as_holder("a", &progress).unwrap());
        assert!(store.load().unwrap().is_fresh());

        store.acquire_lease("a", Duration::ZERO).unwrap();
        store.acquire_lease("b", Duration::from_secs(60)).unwrap();
        assert!(!store.save_as_holder("a", &progress).unwrap());
        assert!(store.save_as_holder("b", &progress).unwrap());
        assert_eq!(store.load().unwrap().current_step_index, 1);
    }

    #[test]
    fn renew_keeps_only_the_current_holder() {
        let (_temp, store) = store();
        let ttl = Duration::from_secs(60);

        assert!(!store.renew_lease("a", ttl).unwrap());
        store.acquire_lease("a", Duration::ZERO).unwrap();
        assert!(store.renew_lease("a", ttl).unwrap());
        assert!(store.load().unwrap().lease_expiry.is_some());
        assert!(!store.acquire_lease("b", ttl).unwrap());

        store.release_lease("a").unwrap();
        assert!(!store.renew_lease("a", ttl).unwrap());
    }

    #[test]
    fn journal_appends_and_limits() {
        let (_temp, store) = store();
        store.append_journal(&[entry("a"), entry("b")], 10).unwrap();
        store.append_journal(&[entry("c")], 2).unwrap();

        let journal = store.journal(10).unwrap();
        let names: Vec<_> = journal.iter().map(|e| e.step.as_str()).collect();
        assert_eq!(names, vec!["c", "b"]);
        assert_eq!(store.journal(1).unwrap().len(), 1);
    }

    #[test]
    fn reset_clears_everything() {
        let (_temp, store) = store();
        let mut progress = RunProgress::default();
        progress.complete(3);
        store.save(&progress).unwrap();
        store.acquire_lease("a", Duration::from_secs(60)).unwrap();
        store.append_journal(&[entry("a")], 10).unwrap();

        store.reset().unwrap();

        assert_eq!(store.load().unwrap(), RunProgress::default());
        assert!(store.lease().unwrap().is_none());
        assert!(store.journal(10).unwrap().is_empty());
    }

    #[test]
    fn reset_of_missing_dir_is_ok() {
        let (_temp, store) = store();
        store.reset().unwrap();
    }

    #[test]
    fn concurrent_acquire_grants_one_holder() {
        let (_temp, store) = store();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .acquire_lease(&format!("holder-{}", i), Duration::from_secs(60))
                        .unwrap()
                })
            })
            .collect();

        let granted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(granted, 1);
    }
}
