//! Persistent best-match cache for the category similarity fallback.
//!
//! Maps a queried sense name to the name of the best-scoring category sense.
//! Only winners are stored: a query that matched nothing is scanned again
//! next time.
//!
//! Lifecycle: `load` once at start, mutate during synthesis, `flush` once at
//! the end of a run. The file is a single JSON object and is rewritten in
//! full on every flush.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::Mutex;

use crate::Result;

// ============================================================================
// MatchCache trait
// ============================================================================

/// Cache access used by the attribute synthesizer.
pub trait MatchCache {
    /// Return the cached match for `key`, or run `scan` and cache its result
    /// when it finds one. Check and insert happen as one step.
    fn get_or_insert_with<F>(&mut self, key: &str, scan: F) -> Option<String>
    where
        F: FnOnce() -> Option<String>;

    /// Drop the entry for `key`, returning the match it held.
    fn remove(&mut self, key: &str) -> Option<String>;
}

impl<C: MatchCache + ?Sized> MatchCache for &mut C {
    fn get_or_insert_with<F>(&mut self, key: &str, scan: F) -> Option<String>
    where
        F: FnOnce() -> Option<String>,
    {
        (**self).get_or_insert_with(key, scan)
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        (**self).remove(key)
    }
}

// ============================================================================
// SimilarityCache
// ============================================================================

/// Single-owner cache with an optional backing file.
#[derive(Debug, Default)]
pub struct SimilarityCache {
    path: Option<PathBuf>,
    entries: HashMap<String, String>,
    hits: usize,
    misses: usize,
}

impl SimilarityCache {
    /// A cache that is never persisted.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load from `path`. A missing file gives an empty cache; so does an
    /// unreadable or malformed one, with a warning.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<HashMap<String, String>>(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "corrupted similarity cache, starting empty");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "unreadable similarity cache, starting empty");
                HashMap::new()
            }
        };
        tracing::info!(similarities = entries.len(), "loaded similarity cache");
        Self { path: Some(path), entries, hits: 0, misses: 0 }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, best_match: impl Into<String>) {
        self.entries.insert(key.into(), best_match.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since load.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }

    /// Write the whole cache to its backing file. No-op for in-memory caches.
    pub fn flush(&self) -> Result<()> {
        match &self.path {
            Some(path) => self.flush_to(path),
            None => Ok(()),
        }
    }

    pub fn flush_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let sorted: BTreeMap<&str, &str> =
            self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        fs::write(path, serde_json::to_vec(&sorted)?)?;
        tracing::info!(similarities = sorted.len(), path = %path.display(), "flushed similarity cache");
        Ok(())
    }
}

impl MatchCache for SimilarityCache {
    fn get_or_insert_with<F>(&mut self, key: &str, scan: F) -> Option<String>
    where
        F: FnOnce() -> Option<String>,
    {
        if let Some(hit) = self.entries.get(key) {
            self.hits += 1;
            tracing::debug!(sense = key, best_match = %hit, "similarity cache hit");
            return Some(hit.clone());
        }
        self.misses += 1;
        let found = scan()?;
        self.entries.insert(key.to_string(), found.clone());
        Some(found)
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }
}

// ============================================================================
// SharedSimilarityCache
// ============================================================================

/// Cloneable handle for multi-threaded callers.
///
/// `get_or_insert_with` holds the lock across the scan, so two threads asking
/// for the same key never both scan and never interleave check and insert.
#[derive(Debug, Clone, Default)]
pub struct SharedSimilarityCache {
    inner: Arc<Mutex<SimilarityCache>>,
}

impl SharedSimilarityCache {
    pub fn new(cache: SimilarityCache) -> Self {
        Self { inner: Arc::new(Mutex::new(cache)) }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().get(key).map(str::to_string)
    }

    pub fn flush(&self) -> Result<()> {
        self.inner.lock().flush()
    }

    /// Recover the cache once every other handle is gone.
    pub fn try_unwrap(self) -> std::result::Result<SimilarityCache, Self> {
        Arc::try_unwrap(self.inner)
            .map(|mutex| mutex.into_inner())
            .map_err(|inner| Self { inner })
    }
}

impl MatchCache for SharedSimilarityCache {
    fn get_or_insert_with<F>(&mut self, key: &str, scan: F) -> Option<String>
    where
        F: FnOnce() -> Option<String>,
    {
        self.inner.lock().get_or_insert_with(key, scan)
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        self.inner.lock().remove(key)
    }
}
