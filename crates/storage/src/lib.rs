//! In-memory backing resources for cinder.
//!
//! Implements the [`cinder_core::Cache`] and [`cinder_core::Locator`]
//! capabilities without a storage engine or cluster, for embedding and tests.

#![warn(missing_docs)]

pub mod locator;
pub mod region;

pub use locator::InMemoryLocator;
pub use region::{InMemoryCache, InMemoryRegion};
