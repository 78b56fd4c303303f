//! In-memory cache made of DashMap-backed regions.
//!
//! # Design
//!
//! - Cache: DashMap from region name to `Arc<InMemoryRegion>`
//! - Region: DashMap from canonical key bytes to the `(key, value)` pair
//!
//! [`Value`] is not `Hash` (it holds floats and JSON documents), so regions
//! key their map by the MessagePack encoding of the key. Two keys are the
//! same entry exactly when they encode to the same bytes.
//!
//! # Thread Safety
//!
//! Reads and writes only lock the shard that holds the key. Different
//! regions never contend.

use std::sync::Arc;

use cinder_core::{Cache, Region, RegionError, Value};
use dashmap::DashMap;
use tracing::debug;

fn key_bytes(key: &Value) -> Result<Vec<u8>, RegionError> {
    rmp_serde::to_vec(key)
        .map_err(|e| RegionError::InvalidInput(format!("unhashable key {}: {}", key, e)))
}

/// A region held in memory.
#[derive(Debug)]
pub struct InMemoryRegion {
    name: String,
    entries: DashMap<Vec<u8>, (Value, Value)>,
}

impl InMemoryRegion {
    /// Create a new empty region
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: DashMap::new(),
        }
    }

    /// Whether `key` has an entry.
    pub fn contains(&self, key: &Value) -> bool {
        key_bytes(key)
            .map(|k| self.entries.contains_key(&k))
            .unwrap_or(false)
    }

    /// Snapshot of all keys, in no particular order.
    pub fn keys(&self) -> Vec<Value> {
        self.entries.iter().map(|e| e.value().0.clone()).collect()
    }
}

impl Region for InMemoryRegion {
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn get(&self, key: &Value) -> Result<Option<Value>, RegionError> {
        let k = key_bytes(key)?;
        Ok(self.entries.get(&k).map(|e| e.value().1.clone()))
    }

    #[inline]
    fn put(&self, key: Value, value: Value) -> Result<Option<Value>, RegionError> {
        let k = key_bytes(&key)?;
        Ok(self.entries.insert(k, (key, value)).map(|(_, old)| old))
    }

    #[inline]
    fn remove(&self, key: &Value) -> Result<Option<Value>, RegionError> {
        let k = key_bytes(key)?;
        Ok(self.entries.remove(&k).map(|(_, (_, old))| old))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A cache of named in-memory regions.
///
/// ```ignore
/// use cinder_storage::InMemoryCache;
///
/// let cache = InMemoryCache::new();
/// cache.create_region("orders");
/// ```
#[derive(Debug, Default)]
pub struct InMemoryCache {
    regions: DashMap<String, Arc<InMemoryRegion>>,
}

impl InMemoryCache {
    /// Create a cache with no regions
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `name` if it does not exist and return it.
    pub fn create_region(&self, name: &str) -> Arc<InMemoryRegion> {
        self.regions
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(region = name, "region created");
                Arc::new(InMemoryRegion::new(name))
            })
            .clone()
    }

    /// Drop `name` and its entries. Returns true if it existed.
    pub fn destroy_region(&self, name: &str) -> bool {
        let existed = self.regions.remove(name).is_some();
        if existed {
            debug!(region = name, "region destroyed");
        }
        existed
    }

    /// Number of regions
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}

impl Cache for InMemoryCache {
    fn region(&self, name: &str) -> Option<Arc<dyn Region>> {
        self.regions
            .get(name)
            .map(|r| Arc::clone(r.value()) as Arc<dyn Region>)
    }

    fn region_names(&self) -> Vec<String> {
        self.regions.iter().map(|r| r.key().clone()).collect()
    }
}
