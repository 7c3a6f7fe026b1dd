//! Persistent point cache keyed by (region identity, dot count).
//!
//! The cache is a thin contract over a [`PointStore`]: a hit is returned as
//! stored, without recomputing or re-validating against current geometry; a
//! miss is computed, written as a whole entry and then returned. Entries never
//! expire on their own, only [`PointCache::invalidate`] removes them.
//!
//! Stores are `Send + Sync` and write each entry atomically. The cache holds a
//! per-key lock across load, compute and store, so threads sharing a key see
//! one computed entry and different keys never wait on each other.

pub mod fs;
pub mod memory;

pub use fs::FsPointStore;
pub use memory::MemoryPointStore;

use std::collections::HashSet;
use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::domain::RegionId;
use crate::error::{CacheError, SampleError, StoreError};
use crate::geometry::Point;

/// Cache key. Both the identity and the requested count take part, so
/// changing the count for a region is a miss, never a stale hit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub id: RegionId,
    pub count: usize,
}

impl CacheKey {
    pub fn new(id: RegionId, count: usize) -> Self {
        Self { id, count }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.count)
    }
}

/// Key-value storage behind [`PointCache`].
pub trait PointStore: Send + Sync {
    fn contains(&self, key: &CacheKey) -> Result<bool, StoreError>;

    /// `Ok(None)` on a miss
    fn load(&self, key: &CacheKey) -> Result<Option<Vec<Point>>, StoreError>;

    /// Replace the entry for `key` as a whole
    fn store(&self, key: &CacheKey, points: &[Point]) -> Result<(), StoreError>;

    /// Returns whether an entry existed
    fn remove(&self, key: &CacheKey) -> Result<bool, StoreError>;
}

/// Keys currently held by a caller
#[derive(Default)]
struct KeyLocks {
    held: Mutex<HashSet<CacheKey>>,
    released: Condvar,
}

impl KeyLocks {
    fn held(&self) -> MutexGuard<'_, HashSet<CacheKey>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self, key: &CacheKey) -> KeyGuard<'_> {
        let mut held = self.held();
        while held.contains(key) {
            held = self
                .released
                .wait(held)
                .unwrap_or_else(PoisonError::into_inner);
        }
        held.insert(key.clone());
        KeyGuard {
            locks: self,
            key: key.clone(),
        }
    }
}

struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: CacheKey,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.locks.held().remove(&self.key);
        self.locks.released.notify_all();
    }
}

pub struct PointCache<S> {
    store: S,
    locks: KeyLocks,
}

impl<S: PointStore> PointCache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: KeyLocks::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn contains(&self, key: &CacheKey) -> Result<bool, StoreError> {
        self.store.contains(key)
    }

    /// Stored points for `key`, or the result of `compute` after persisting it.
    ///
    /// A failing `compute` leaves the store untouched. `compute` runs while
    /// `key` is locked, so it must not call back into the cache for that key.
    pub fn get_or_compute<F>(&self, key: &CacheKey, compute: F) -> Result<Vec<Point>, CacheError>
    where
        F: FnOnce() -> Result<Vec<Point>, SampleError>,
    {
        let _guard = self.locks.lock(key);
        if let Some(points) = self.store.load(key)? {
            debug!(key = %key, "cache hit");
            return Ok(points);
        }

        debug!(key = %key, "cache miss");
        let points = compute()?;
        self.store.store(key, &points)?;
        Ok(points)
    }

    /// Drop the entry for `key`; returns whether one existed.
    pub fn invalidate(&self, key: &CacheKey) -> Result<bool, StoreError> {
        let _guard = self.locks.lock(key);
        self.store.remove(key)
    }
}
