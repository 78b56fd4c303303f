//! In-memory cluster locator.

use cinder_core::{Locator, ServerLocation};
use parking_lot::RwLock;
use tracing::debug;

/// Locator whose load snapshot is set by hand.
///
/// Starts with no snapshot, the state of a locator that has not yet heard
/// from any server.
#[derive(Debug, Default)]
pub struct InMemoryLocator {
    snapshot: RwLock<Option<Vec<ServerLocation>>>,
}

impl InMemoryLocator {
    /// Locator with no load snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Locator with an initial snapshot.
    pub fn with_servers(servers: impl IntoIterator<Item = ServerLocation>) -> Self {
        let locator = Self::new();
        locator.update(servers);
        locator
    }

    /// Replace the load snapshot.
    pub fn update(&self, servers: impl IntoIterator<Item = ServerLocation>) {
        let servers: Vec<ServerLocation> = servers.into_iter().collect();
        debug!(count = servers.len(), "load snapshot updated");
        *self.snapshot.write() = Some(servers);
    }

    /// Forget the load snapshot.
    pub fn clear(&self) {
        *self.snapshot.write() = None;
    }
}

impl Locator for InMemoryLocator {
    fn servers(&self) -> Option<Vec<ServerLocation>> {
        self.snapshot.read().clone()
    }
}
