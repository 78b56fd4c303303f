//! Backing resources an operation runs against.
//!
//! The storage engine and cluster membership live outside this workspace.
//! Handlers only see these traits: a [`Cache`] of named [`Region`]s on
//! servers, or a [`Locator`] that knows which servers are alive.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::RegionError;
use crate::value::Value;

/// A named key/value region.
///
/// Each call is atomic on its own; callers never hold locks across calls.
pub trait Region: Send + Sync {
    /// Region name.
    fn name(&self) -> &str;

    /// Read the value stored under `key`.
    fn get(&self, key: &Value) -> Result<Option<Value>, RegionError>;

    /// Store `value` under `key`, returning the previous value.
    fn put(&self, key: Value, value: Value) -> Result<Option<Value>, RegionError>;

    /// Remove `key`, returning the previous value.
    fn remove(&self, key: &Value) -> Result<Option<Value>, RegionError>;

    /// Number of entries.
    fn len(&self) -> usize;

    /// Returns true if the region holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A server-side cache: a set of named regions.
pub trait Cache: Send + Sync {
    /// Look up a region by name.
    fn region(&self, name: &str) -> Option<Arc<dyn Region>>;

    /// Names of all regions, in no particular order.
    fn region_names(&self) -> Vec<String>;
}

/// Host and port of a cache server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerLocation {
    /// Host name or address
    pub host: String,
    /// Client port
    pub port: u16,
}

impl ServerLocation {
    /// Build a server location.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

/// A cluster locator.
pub trait Locator: Send + Sync {
    /// Servers in the current load snapshot.
    ///
    /// `None` means no snapshot is available yet; callers treat it like an
    /// empty list.
    fn servers(&self) -> Option<Vec<ServerLocation>>;
}
