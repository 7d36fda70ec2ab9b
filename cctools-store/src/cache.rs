//! TTL cache of exported records.
//!
//! [`RecordCache`] keeps one entry per object type in memory and, unless it
//! runs memory-only, mirrors each entry to
//! `{cache_dir}/{site_key}/{object_type}.json`.
//!
//! Every object type has its own async mutex, held across the whole
//! check-fetch-store sequence of [`RecordCache::get`]. Two callers asking for
//! the same type never both fetch: the second waits and then finds the
//! first one's result in memory. Different types do not block each other.
//!
//! Disk faults never fail a lookup. They are logged and the cache behaves as
//! if the file were absent (on read) or keeps the result in memory only (on
//! write).

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use cctools_core::{ObjectType, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::CacheError;
use crate::persistence::{load_json, remove_file_if_exists, save_json};

/// Cache file format version; files with another version are ignored.
pub const CACHE_FORMAT_VERSION: u32 = 1;

/// Default time-to-live for cached records.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

// ============================================================================
// Freshness
// ============================================================================

/// Returns true if an entry fetched at `fetched_at` is still valid at `now`.
///
/// A zero TTL is never fresh, and neither is an entry stamped in the future.
pub fn is_fresh(fetched_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    !ttl.is_zero()
        && now
            .signed_duration_since(fetched_at)
            .to_std()
            .is_ok_and(|age| age < ttl)
}

/// Turns a free-form site identity into a safe directory name.
///
/// ASCII letters, digits, `.` and `-` pass through with their case kept.
/// Every other byte, `_` included, becomes `_xx` (lowercase hex), as does a
/// leading `.`, so distinct sites never share a directory.
pub fn site_key(site: &str) -> String {
    use std::fmt::Write as _;

    if site.is_empty() {
        return "_".to_string();
    }
    let mut key = String::with_capacity(site.len());
    for (i, byte) in site.bytes().enumerate() {
        let keep = byte.is_ascii_alphanumeric() || byte == b'-' || (byte == b'.' && i > 0);
        if keep {
            key.push(char::from(byte));
        } else {
            let _ = write!(key, "_{byte:02x}");
        }
    }
    key
}

// ============================================================================
// Entries
// ============================================================================

#[derive(Debug, Clone)]
struct Entry {
    records: Vec<Record>,
    fetched_at: DateTime<Utc>,
}

/// On-disk layout of one cached object type.
#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    site: String,
    object_type: ObjectType,
    fetched_at: DateTime<Utc>,
    records: Vec<Record>,
}

/// Where a status entry was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheLocation {
    /// Loaded in this process.
    Memory,
    /// Only on disk.
    Disk,
    /// Not cached anywhere.
    Missing,
}

/// Cache state of one object type.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    /// The object type.
    pub object_type: ObjectType,
    /// Where the entry lives.
    pub location: CacheLocation,
    /// When the entry was fetched.
    pub fetched_at: Option<DateTime<Utc>>,
    /// Number of cached records.
    pub record_count: Option<usize>,
    /// Whether the entry is valid under the TTL used for the status query.
    pub fresh: bool,
}

impl CacheStatus {
    /// Returns the entry's age at `now`.
    pub fn age(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.fetched_at.map(|t| now.signed_duration_since(t))
    }
}

/// One object type's entry plus a count of how often it was filled.
///
/// A caller reads `stores` before waiting on `entry`; if the count moved by
/// the time it holds the lock, another caller filled the entry meanwhile.
#[derive(Debug, Default)]
struct Slot {
    entry: Mutex<Option<Entry>>,
    stores: AtomicU64,
}

impl Slot {
    fn store(&self, entry: &mut Option<Entry>, records: Vec<Record>, fetched_at: DateTime<Utc>) {
        *entry = Some(Entry {
            records,
            fetched_at,
        });
        self.stores.fetch_add(1, Ordering::AcqRel);
    }
}

// ============================================================================
// Record Cache
// ============================================================================

/// Per-site cache of normalized records.
#[derive(Debug)]
pub struct RecordCache {
    site: String,
    dir: Option<PathBuf>,
    slots: StdMutex<HashMap<ObjectType, Arc<Slot>>>,
    clock: Arc<dyn Clock>,
}

impl RecordCache {
    /// Creates a cache for `site`, persisting under `cache_dir` when given.
    ///
    /// Files go to `{cache_dir}/{site_key}/`, so two sites sharing a cache
    /// directory never see each other's records.
    pub fn new(cache_dir: Option<PathBuf>, site: impl Into<String>) -> Self {
        let site = site.into();
        let dir = cache_dir.map(|base| base.join(site_key(&site)));
        Self {
            site,
            dir,
            slots: StdMutex::new(HashMap::new()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Creates a cache that never touches the disk.
    pub fn in_memory(site: impl Into<String>) -> Self {
        Self::new(None, site)
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the site this cache belongs to.
    pub fn site(&self) -> &str {
        &self.site
    }

    /// Returns this site's cache directory, if persisting.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Returns the cache file for `object_type`, if persisting.
    pub fn entry_path(&self, object_type: ObjectType) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", object_type.name())))
    }

    fn slot(&self, object_type: ObjectType) -> Arc<Slot> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(object_type).or_default())
    }

    /// Returns the records for `object_type`, fetching them if no valid
    /// entry exists.
    ///
    /// Checks memory, then disk, then runs `fetch`. A fetched result is
    /// stored in memory and on disk before it is returned. Callers always
    /// get their own copy.
    ///
    /// # Errors
    ///
    /// Returns whatever `fetch` returns, unchanged. Nothing is cached then.
    #[instrument(skip(self, fetch), fields(site = %self.site))]
    pub async fn get<F, Fut, E>(
        &self,
        object_type: ObjectType,
        ttl: Duration,
        fetch: F,
    ) -> Result<Vec<Record>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Record>, E>>,
    {
        let slot = self.slot(object_type);
        let seen = slot.stores.load(Ordering::Acquire);
        let mut entry = slot.entry.lock().await;

        let now = self.clock.now();
        if let Some(cached) = entry.as_ref() {
            if slot.stores.load(Ordering::Acquire) != seen {
                debug!("Filled by a concurrent caller");
                return Ok(cached.records.clone());
            }
            if is_fresh(cached.fetched_at, now, ttl) {
                debug!("Memory hit");
                return Ok(cached.records.clone());
            }
        }

        if let Some(path) = self.entry_path(object_type) {
            match self.read_file(&path, object_type).await {
                Ok(Some(file)) if is_fresh(file.fetched_at, now, ttl) => {
                    debug!(path = %path.display(), "Disk hit");
                    let records = file.records.clone();
                    slot.store(&mut entry, file.records, file.fetched_at);
                    return Ok(records);
                }
                Ok(Some(_)) => debug!(path = %path.display(), "Disk entry is stale"),
                Ok(None) => debug!(path = %path.display(), "No disk entry"),
                Err(e) => warn!(error = %e, "Ignoring unreadable cache file"),
            }
        }

        let records = fetch().await?;
        let fetched_at = self.clock.now();
        info!(count = records.len(), "Fetched and cached");

        if let Some(path) = self.entry_path(object_type) {
            if let Err(e) = self
                .write_file(&path, object_type, fetched_at, &records)
                .await
            {
                warn!(error = %e, "Failed to persist cache entry");
            }
        }

        slot.store(&mut entry, records.clone(), fetched_at);
        Ok(records)
    }

    /// Drops the cached entry for `object_type` from memory and disk.
    pub async fn invalidate(&self, object_type: ObjectType) {
        let slot = self.slot(object_type);
        let mut entry = slot.entry.lock().await;
        *entry = None;

        if let Some(path) = self.entry_path(object_type) {
            if let Err(e) = remove_file_if_exists(&path).await {
                warn!(error = %CacheError::at(path, e), "Failed to remove cache file");
            }
        }
        debug!(%object_type, "Invalidated");
    }

    /// Drops every cached entry for this site.
    pub async fn clear(&self) {
        for object_type in ObjectType::all() {
            self.invalidate(*object_type).await;
        }
        info!(site = %self.site, "Cache cleared");
    }

    /// Reports the cache state of every object type under `ttl`.
    pub async fn status(&self, ttl: Duration) -> Vec<CacheStatus> {
        let now = self.clock.now();
        let mut statuses = Vec::with_capacity(ObjectType::all().len());

        for object_type in ObjectType::all().iter().copied() {
            let slot = self.slot(object_type);
            let entry = slot.entry.lock().await;

            let (location, found) = if let Some(cached) = entry.as_ref() {
                (
                    CacheLocation::Memory,
                    Some((cached.fetched_at, cached.records.len())),
                )
            } else {
                let on_disk = match self.entry_path(object_type) {
                    Some(path) => match self.read_file(&path, object_type).await {
                        Ok(file) => file.map(|f| (f.fetched_at, f.records.len())),
                        Err(e) => {
                            warn!(error = %e, "Ignoring unreadable cache file");
                            None
                        }
                    },
                    None => None,
                };
                match on_disk {
                    Some(found) => (CacheLocation::Disk, Some(found)),
                    None => (CacheLocation::Missing, None),
                }
            };

            statuses.push(CacheStatus {
                object_type,
                location,
                fetched_at: found.map(|(at, _)| at),
                record_count: found.map(|(_, count)| count),
                fresh: found.is_some_and(|(at, _)| is_fresh(at, now, ttl)),
            });
        }
        statuses
    }

    // ========================================================================
    // Disk
    // ========================================================================

    async fn read_file(
        &self,
        path: &Path,
        object_type: ObjectType,
    ) -> Result<Option<CacheFile>, CacheError> {
        if !path.exists() {
            return Ok(None);
        }
        let file: CacheFile = load_json(path)
            .await
            .map_err(|e| CacheError::at(path.to_path_buf(), e))?;

        let mismatch = if file.version != CACHE_FORMAT_VERSION {
            Some(format!("format version {}", file.version))
        } else if file.site != self.site {
            Some(format!("site '{}'", file.site))
        } else if file.object_type != object_type {
            Some(format!("object type '{}'", file.object_type))
        } else {
            None
        };

        match mismatch {
            Some(reason) => Err(CacheError::Mismatch {
                path: path.to_path_buf(),
                reason,
            }),
            None => Ok(Some(file)),
        }
    }

    async fn write_file(
        &self,
        path: &Path,
        object_type: ObjectType,
        fetched_at: DateTime<Utc>,
        records: &[Record],
    ) -> Result<(), CacheError> {
        #[derive(Serialize)]
        struct CacheFileRef<'a> {
            version: u32,
            site: &'a str,
            object_type: ObjectType,
            fetched_at: DateTime<Utc>,
            records: &'a [Record],
        }

        let file = CacheFileRef {
            version: CACHE_FORMAT_VERSION,
            site: &self.site,
            object_type,
            fetched_at,
            records,
        };
        save_json(path, &file)
            .await
            .map_err(|e| CacheError::at(path.to_path_buf(), e))
    }
}

// ============================================================================
// Tests
// ============================================================================
