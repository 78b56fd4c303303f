//! Client protocol statistics sinks.

use std::sync::atomic::{AtomicU64, Ordering};

/// Increment-style counters recorded by the pipeline.
///
/// Implementations must tolerate concurrent increments from many
/// connections.
pub trait ClientStatistics: Send + Sync {
    /// An operation was denied by the authorizer.
    fn inc_authorization_violations(&self);

    /// A connection handshake was rejected.
    fn inc_authentication_failures(&self);

    /// An operation ran to a response, success or classified failure.
    fn inc_operations_processed(&self);
}

/// Discards every increment.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpStatistics;

impl ClientStatistics for NoOpStatistics {
    fn inc_authorization_violations(&self) {}
    fn inc_authentication_failures(&self) {}
    fn inc_operations_processed(&self) {}
}

/// Point-in-time copy of [`ProtocolStatistics`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsSnapshot {
    /// Denied operations
    pub authorization_violations: u64,
    /// Rejected handshakes
    pub authentication_failures: u64,
    /// Operations that produced a response
    pub operations_processed: u64,
}

/// Atomic counters.
#[derive(Debug, Default)]
pub struct ProtocolStatistics {
    authorization_violations: AtomicU64,
    authentication_failures: AtomicU64,
    operations_processed: AtomicU64,
}

impl ProtocolStatistics {
    /// All counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Denied operations so far
    pub fn authorization_violations(&self) -> u64 {
        self.authorization_violations.load(Ordering::Relaxed)
    }

    /// Rejected handshakes so far
    pub fn authentication_failures(&self) -> u64 {
        self.authentication_failures.load(Ordering::Relaxed)
    }

    /// Processed operations so far
    pub fn operations_processed(&self) -> u64 {
        self.operations_processed.load(Ordering::Relaxed)
    }

    /// Copy of every counter.
    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            authorization_violations: self.authorization_violations(),
            authentication_failures: self.authentication_failures(),
            operations_processed: self.operations_processed(),
        }
    }
}

impl ClientStatistics for ProtocolStatistics {
    fn inc_authorization_violations(&self) {
        self.authorization_violations.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_authentication_failures(&self) {
        self.authentication_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_operations_processed(&self) {
        self.operations_processed.fetch_add(1, Ordering::Relaxed);
    }
}
