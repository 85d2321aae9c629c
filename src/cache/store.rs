use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use moka::sync::Cache;
use tracing::{debug, warn};

use super::error::{CacheError, CacheResult};
use super::types::{CacheCategory, CacheEnvelope, CacheStats};

const ENTRY_EXTENSION: &str = "json";

const TEMP_EXTENSION: &str = "json.tmp";

/// Content-addressed, category-scoped cache.
///
/// Entries live as one JSON file per `(category, fingerprint)` under a
/// category subdirectory, fronted by a bounded in-memory layer so hot
/// entries skip the disk read. Expired entries are indistinguishable from
/// absent ones, and any fault on the read path is reported as a miss.
pub struct ContentCache {
    root: PathBuf,
    memory: Cache<String, Arc<CacheEnvelope>>,
}

impl ContentCache {
    const MEMORY_CAPACITY: u64 = 1_000;

    /// Creates a cache rooted at `root` with the default in-memory capacity.
    pub fn new(root: PathBuf) -> Self {
        Self::with_memory_capacity(root, Self::MEMORY_CAPACITY)
    }

    /// Creates a cache with an explicit in-memory entry capacity.
    pub fn with_memory_capacity(root: PathBuf, capacity: u64) -> Self {
        Self {
            root,
            memory: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Returns the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Looks up an entry, returning its payload on a fresh hit.
    ///
    /// Absent, expired, and unreadable entries all surface as `None`.
    pub fn get(&self, category: CacheCategory, fingerprint: &str) -> Option<serde_json::Value> {
        let now = Utc::now();
        let key = Self::memory_key(category, fingerprint);

        if let Some(envelope) = self.memory.get(&key) {
            if envelope.is_fresh_at(now) {
                debug!(%category, fingerprint, "cache hit (memory)");
                return Some(envelope.payload.clone());
            }
            self.memory.invalidate(&key);
        }

        match self.read_envelope(category, fingerprint) {
            Ok(Some(envelope)) if envelope.is_fresh_at(now) => {
                debug!(%category, fingerprint, "cache hit (disk)");
                let payload = envelope.payload.clone();
                self.memory.insert(key, Arc::new(envelope));
                Some(payload)
            }
            Ok(Some(_)) => {
                debug!(%category, fingerprint, "cache entry expired");
                None
            }
            Ok(None) => None,
            Err(e) => {
                // A cache fault must never block an evaluation.
                warn!(%category, fingerprint, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Stores a payload, overwriting any existing entry.
    ///
    /// Returns `false` when the disk write fails; the failure is logged and
    /// otherwise swallowed.
    pub fn set(
        &self,
        category: CacheCategory,
        fingerprint: &str,
        payload: serde_json::Value,
    ) -> bool {
        let envelope = CacheEnvelope::new(category, fingerprint.to_string(), payload);
        self.store_envelope(envelope)
    }

    /// Clears one category, or every category when `category` is `None`.
    pub fn clear(&self, category: Option<CacheCategory>) {
        let categories: &[CacheCategory] = match category {
            Some(ref c) => std::slice::from_ref(c),
            None => &CacheCategory::ALL,
        };

        for &cat in categories {
            let dir = self.category_dir(cat);
            if !dir.exists() {
                continue;
            }
            if let Ok(entries) = fs::read_dir(&dir) {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION) {
                        if let Err(e) = fs::remove_file(&path) {
                            warn!(%cat, path = %path.display(), error = %e, "failed to remove cache file");
                        }
                    }
                }
            }
        }

        self.memory.invalidate_all();
    }

    /// Returns entry counts per category and the total bytes on disk.
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();

        for cat in CacheCategory::ALL {
            let (count, bytes) = self.scan_category(cat);
            match cat {
                CacheCategory::Documents => stats.documents = count,
                CacheCategory::Search => stats.search = count,
                CacheCategory::Analysis => stats.analysis = count,
            }
            stats.total_bytes += bytes;
        }

        stats
    }

    fn memory_key(category: CacheCategory, fingerprint: &str) -> String {
        format!("{}/{}", category.dir_name(), fingerprint)
    }

    fn category_dir(&self, category: CacheCategory) -> PathBuf {
        self.root.join(category.dir_name())
    }

    fn entry_path(&self, category: CacheCategory, fingerprint: &str) -> PathBuf {
        self.category_dir(category)
            .join(format!("{}.{}", fingerprint, ENTRY_EXTENSION))
    }

    fn temp_entry_path(&self, category: CacheCategory, fingerprint: &str) -> PathBuf {
        self.category_dir(category)
            .join(format!("{}.{}", fingerprint, TEMP_EXTENSION))
    }

    fn read_envelope(
        &self,
        category: CacheCategory,
        fingerprint: &str,
    ) -> CacheResult<Option<CacheEnvelope>> {
        let path = self.entry_path(category, fingerprint);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path).map_err(|source| CacheError::Io {
            path: path.clone(),
            source,
        })?;
        let envelope = serde_json::from_slice(&bytes)?;
        Ok(Some(envelope))
    }

    pub(crate) fn store_envelope(&self, envelope: CacheEnvelope) -> bool {
        let key = Self::memory_key(envelope.category, &envelope.fingerprint);

        match self.write_envelope(&envelope) {
            Ok(()) => {
                debug!(category = %envelope.category, fingerprint = %envelope.fingerprint, "cache entry stored");
                self.memory.insert(key, Arc::new(envelope));
                true
            }
            Err(e) => {
                // Losing a cache write must not fail the evaluation.
                warn!(category = %envelope.category, fingerprint = %envelope.fingerprint, error = %e, "cache write failed");
                self.memory.insert(key, Arc::new(envelope));
                false
            }
        }
    }

    fn write_envelope(&self, envelope: &CacheEnvelope) -> CacheResult<()> {
        let dir = self.category_dir(envelope.category);
        fs::create_dir_all(&dir).map_err(|source| CacheError::Io {
            path: dir.clone(),
            source,
        })?;

        let bytes = serde_json::to_vec_pretty(envelope)?;
        let temp_path = self.temp_entry_path(envelope.category, &envelope.fingerprint);
        let final_path = self.entry_path(envelope.category, &envelope.fingerprint);

        {
            let mut file = File::create(&temp_path).map_err(|source| CacheError::Io {
                path: temp_path.clone(),
                source,
            })?;
            file.write_all(&bytes).map_err(|source| CacheError::Io {
                path: temp_path.clone(),
                source,
            })?;
        }

        fs::rename(&temp_path, &final_path).map_err(|source| CacheError::Io {
            path: final_path,
            source,
        })?;
        Ok(())
    }

    fn scan_category(&self, category: CacheCategory) -> (usize, u64) {
        let dir = self.category_dir(category);
        let Ok(entries) = fs::read_dir(&dir) else {
            return (0, 0);
        };

        let mut count = 0;
        let mut bytes = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION) {
                count += 1;
                if let Ok(metadata) = fs::metadata(&path) {
                    bytes += metadata.len();
                }
            }
        }
        (count, bytes)
    }
}

impl std::fmt::Debug for ContentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentCache")
            .field("root", &self.root)
            .field("memory_entries", &self.memory.entry_count())
            .finish()
    }
}
