//! Process-wide memo of completed analyses.
//!
//! Each key owns a `tokio::sync::OnceCell`. Concurrent requests for the same
//! key share the cell, so only the first runs the computation and the rest
//! await its result. The LRU mutex is only held to fetch or insert a cell,
//! never across an await.

use crate::analysis::AnalysisRecord;
use lru::LruCache;
use std::fmt;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OnceCell;
use tracing::{debug, info};
use triage_graph::RepoId;

/// Default number of analyses kept.
pub const DEFAULT_CAPACITY: usize = 512;

/// Identity of a cached analysis: repository (case-insensitive) and issue
/// number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    repo: String,
    number: u64,
}

impl CacheKey {
    pub fn new(repo: &RepoId, number: u64) -> Self {
        Self {
            repo: repo.cache_key(),
            number,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repo, self.number)
    }
}

type Slot = Arc<OnceCell<AnalysisRecord>>;

/// Bounded, single-flight analysis cache.
pub struct AnalysisCache {
    entries: Mutex<LruCache<CacheKey, Slot>>,
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl AnalysisCache {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    // A panic while holding the lock cannot leave a half-written entry
    fn entries(&self) -> MutexGuard<'_, LruCache<CacheKey, Slot>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Completed analysis for `key`, if any.
    pub fn lookup(&self, key: &CacheKey) -> Option<AnalysisRecord> {
        let hit = self
            .entries()
            .get(key)
            .and_then(|slot| slot.get().cloned());
        debug!(key = %key, hit = hit.is_some(), "cache lookup");
        hit
    }

    /// Insert or overwrite the analysis for `key`.
    pub fn store(&self, key: CacheKey, record: AnalysisRecord) {
        info!(key = %key, "cache store");
        let slot = Arc::new(OnceCell::new_with(Some(record)));
        self.entries().put(key, slot);
    }

    /// Return the cached analysis or compute it, running `compute` at most
    /// once across concurrent callers of the same key.
    ///
    /// The boolean is `true` when the value came from the cache (including
    /// waiting on another caller's computation). A failed computation is not
    /// cached and takes no capacity, so the next caller retries.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: CacheKey,
        compute: F,
    ) -> Result<(AnalysisRecord, bool), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AnalysisRecord, E>>,
    {
        let slot: Slot = self
            .entries()
            .get_or_insert(key.clone(), || Arc::new(OnceCell::new()))
            .clone();

        if let Some(record) = slot.get() {
            debug!(key = %key, "cache hit");
            return Ok((record.clone(), true));
        }

        let mut computed_here = false;
        let result = slot
            .get_or_try_init(|| async {
                computed_here = true;
                compute().await
            })
            .await
            .cloned();

        let record = match result {
            Ok(record) => record,
            Err(err) => {
                self.discard_empty(&key, &slot);
                return Err(err);
            }
        };

        if computed_here {
            let mut entries = self.entries();
            // A failed sibling may have discarded the slot before this retry filled it
            if !entries.contains(&key) {
                entries.put(key.clone(), slot);
            }
            info!(key = %key, "cache store");
        } else {
            debug!(key = %key, "joined in-flight computation");
        }
        Ok((record, !computed_here))
    }

    // Drop a slot left empty by a failed computation so it does not hold
    // capacity. A slot replaced by `store` in the meantime is left alone.
    fn discard_empty(&self, key: &CacheKey, slot: &Slot) {
        let mut entries = self.entries();
        let stale = entries
            .peek(key)
            .is_some_and(|held| Arc::ptr_eq(held, slot) && !held.initialized());
        if stale {
            entries.pop(key);
            debug!(key = %key, "discarded failed cache slot");
        }
    }

    /// Number of completed analyses held.
    pub fn len(&self) -> usize {
        self.entries()
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries().cap().get()
    }
}

impl fmt::Debug for AnalysisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
