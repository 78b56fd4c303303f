//! Operation handlers.
//!
//! One function per operation kind. A handler never panics or propagates for
//! an anticipated failure: region lookups, codec errors and store errors all
//! come back as a classified `Err(ErrorResponse)`.

pub mod region;
pub mod server;

pub use region::{get, get_all, get_region_names, put, put_all, remove};
pub use server::get_available_servers;

use cinder_core::OperationResult;
use cinder_wire::SerializationService;

use crate::context::ExecutionContext;

/// Executes one operation kind.
///
/// Implemented for every function or closure with the handler signature, so
/// the registry can hold plain functions and tests can hold closures.
pub trait OperationHandler<Req, Resp>: Send + Sync {
    /// Run `request` against the context's backing resource.
    fn process(
        &self,
        serialization: &dyn SerializationService,
        request: Req,
        context: &ExecutionContext,
    ) -> OperationResult<Resp>;
}

impl<Req, Resp, F> OperationHandler<Req, Resp> for F
where
    F: Fn(&dyn SerializationService, Req, &ExecutionContext) -> OperationResult<Resp>
        + Send
        + Sync,
{
    fn process(
        &self,
        serialization: &dyn SerializationService,
        request: Req,
        context: &ExecutionContext,
    ) -> OperationResult<Resp> {
        self(serialization, request, context)
    }
}
