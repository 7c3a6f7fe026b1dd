use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{CacheKey, PointStore};
use crate::error::StoreError;
use crate::geometry::Point;

/// In-process store, used in tests and for one-off runs without a cache dir.
#[derive(Debug, Default)]
pub struct MemoryPointStore {
    entries: Mutex<HashMap<CacheKey, Vec<Point>>>,
}

impl MemoryPointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, Vec<Point>>> {
        // Entries are replaced whole, so a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PointStore for MemoryPointStore {
    fn contains(&self, key: &CacheKey) -> Result<bool, StoreError> {
        Ok(self.entries().contains_key(key))
    }

    fn load(&self, key: &CacheKey) -> Result<Option<Vec<Point>>, StoreError> {
        Ok(self.entries().get(key).cloned())
    }

    fn store(&self, key: &CacheKey, points: &[Point]) -> Result<(), StoreError> {
        self.entries().insert(key.clone(), points.to_vec());
        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> Result<bool, StoreError> {
        Ok(self.entries().remove(key).is_some())
    }
}
