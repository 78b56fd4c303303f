//! cinder: server-side request pipeline for the cinder cache client protocol.
//!
//! This crate re-exports the workspace members with a single entry point:
//!
//! - [`domain`]: values, error codes and backing-store capabilities
//! - [`wire`]: message shapes, framing and the serialization service
//! - [`security`]: authentication, authorization and plugin lookup
//! - [`storage`]: in-memory cache, regions and locator
//! - [`executor`]: execution context, registry, processor, handlers and sessions
//!
//! ```ignore
//! use std::sync::Arc;
//! use cinder::prelude::*;
//!
//! let processor = Arc::new(OperationsProcessor::new());
//! let session = ClientSession::establish(
//!     &ProtocolConfig::new(),
//!     &mut input,
//!     &mut output,
//!     security_manager,
//!     cache,
//!     Arc::new(ProtocolStatistics::new()),
//!     processor,
//! )?;
//! session.serve(&mut input, &mut output)?;
//! ```

pub use cinder_core as domain;
pub use cinder_executor as executor;
pub use cinder_security as security;
pub use cinder_storage as storage;
pub use cinder_wire as wire;

/// The types most embedders need.
pub mod prelude {
    pub use cinder_core::{Cache, ErrorCode, ErrorResponse, Locator, Region, ServerLocation, Value};
    pub use cinder_executor::{
        ClientSession, ClientStatistics, ExecutionContext, OperationsProcessor, ProtocolStatistics,
    };
    pub use cinder_security::{
        Principal, ProtocolConfig, ResourcePermission, SecurityManager, StaticSecurityManager,
    };
    pub use cinder_storage::{InMemoryCache, InMemoryLocator};
    pub use cinder_wire::{Request, Response};
}
