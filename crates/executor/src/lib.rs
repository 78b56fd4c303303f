//! Request pipeline for the cinder client protocol.
//!
//! A connection authenticates once ([`ClientSession`]), then each decoded
//! request goes through the [`OperationsProcessor`]:
//!
//! ```text
//! Request ─▶ OperationRegistry::describe ─▶ Authorizer::authorize ─▶ handler ─▶ Response
//! ```
//!
//! Handlers run against the cache or locator bound to the
//! [`ExecutionContext`] and report every anticipated failure as a classified
//! [`cinder_core::ErrorResponse`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod handlers;
pub mod processor;
pub mod registry;
pub mod session;
pub mod statistics;

pub use context::{Binding, ExecutionContext};
pub use handlers::OperationHandler;
pub use processor::OperationsProcessor;
pub use registry::{Operation, OperationDescriptor, OperationRegistry};
pub use session::{ClientSession, SessionError};
pub use statistics::{ClientStatistics, NoOpStatistics, ProtocolStatistics, StatisticsSnapshot};
