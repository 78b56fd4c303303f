//! Operation registry.
//!
//! Maps each [`RequestKind`] to an [`OperationDescriptor`]: the handler, the
//! permission it requires, and the converters between the wire envelopes and
//! the handler's own request/response types. Descriptors are typed; the
//! registry stores them behind the object-safe [`Operation`] trait.
//!
//! [`OperationRegistry::new`] covers every kind in [`RequestKind::ALL`].

use cinder_core::{ErrorResponse, OperationResult};
use cinder_security::ResourcePermission;
use cinder_wire::{Request, RequestKind, Response, SerializationService};
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::context::ExecutionContext;
use crate::handlers::{self, OperationHandler};

/// A registered operation, with its request and response types erased.
pub trait Operation: Send + Sync {
    /// Discriminant this operation serves.
    fn kind(&self) -> RequestKind;

    /// Permission required before the handler may run. Unscoped; the
    /// dispatcher narrows it to the request's region.
    fn required_permission(&self) -> &ResourcePermission;

    /// Convert `request`, run the handler and convert its result.
    ///
    /// Exactly one of the success and error converters runs.
    fn execute(
        &self,
        serialization: &dyn SerializationService,
        request: Request,
        context: &ExecutionContext,
    ) -> Response;
}

/// Registry entry for one operation kind.
pub struct OperationDescriptor<Req, Resp> {
    kind: RequestKind,
    permission: ResourcePermission,
    handler: Box<dyn OperationHandler<Req, Resp>>,
    from_request: fn(Request) -> Option<Req>,
    to_response: fn(Resp) -> Response,
    to_error_response: fn(ErrorResponse) -> Response,
}

impl<Req, Resp> OperationDescriptor<Req, Resp> {
    /// Bind a handler to a kind. Failures map to [`Response::Error`].
    pub fn new(
        kind: RequestKind,
        permission: ResourcePermission,
        handler: impl OperationHandler<Req, Resp> + 'static,
        from_request: fn(Request) -> Option<Req>,
        to_response: fn(Resp) -> Response,
    ) -> Self {
        Self {
            kind,
            permission,
            handler: Box::new(handler),
            from_request,
            to_response,
            to_error_response: Response::Error,
        }
    }

    /// Replace the failure converter.
    pub fn with_error_response(mut self, to_error_response: fn(ErrorResponse) -> Response) -> Self {
        self.to_error_response = to_error_response;
        self
    }

    fn respond(&self, result: OperationResult<Resp>) -> Response {
        match result {
            Ok(response) => (self.to_response)(response),
            Err(error) => (self.to_error_response)(error),
        }
    }
}

impl<Req, Resp> Operation for OperationDescriptor<Req, Resp>
where
    Req: Send + Sync + 'static,
    Resp: Send + Sync + 'static,
{
    fn kind(&self) -> RequestKind {
        self.kind
    }

    fn required_permission(&self) -> &ResourcePermission {
        &self.permission
    }

    fn execute(
        &self,
        serialization: &dyn SerializationService,
        request: Request,
        context: &ExecutionContext,
    ) -> Response {
        let Some(request) = (self.from_request)(request) else {
            warn!(operation = %self.kind, "request does not match its registered operation");
            return (self.to_error_response)(ErrorResponse::unsupported_operation(format!(
                "Request does not match operation {}",
                self.kind
            )));
        };
        self.respond(self.handler.process(serialization, request, context))
    }
}

/// Discriminant → operation table.
pub struct OperationRegistry {
    operations: FxHashMap<RequestKind, Box<dyn Operation>>,
}

impl OperationRegistry {
    /// Registry with every supported operation.
    pub fn new() -> Self {
        Self::empty()
            .register(OperationDescriptor::new(
                RequestKind::Get,
                ResourcePermission::data_read(),
                handlers::get,
                |r| match r {
                    Request::Get(r) => Some(r),
                    _ => None,
                },
                Response::Get,
            ))
            .register(OperationDescriptor::new(
                RequestKind::Put,
                ResourcePermission::data_write(),
                handlers::put,
                |r| match r {
                    Request::Put(r) => Some(r),
                    _ => None,
                },
                Response::Put,
            ))
            .register(OperationDescriptor::new(
                RequestKind::GetAll,
                ResourcePermission::data_read(),
                handlers::get_all,
                |r| match r {
                    Request::GetAll(r) => Some(r),
                    _ => None,
                },
                Response::GetAll,
            ))
            .register(OperationDescriptor::new(
                RequestKind::PutAll,
                ResourcePermission::data_write(),
                handlers::put_all,
                |r| match r {
                    Request::PutAll(r) => Some(r),
                    _ => None,
                },
                Response::PutAll,
            ))
            .register(OperationDescriptor::new(
                RequestKind::Remove,
                ResourcePermission::data_write(),
                handlers::remove,
                |r| match r {
                    Request::Remove(r) => Some(r),
                    _ => None,
                },
                Response::Remove,
            ))
            .register(OperationDescriptor::new(
                RequestKind::GetRegionNames,
                ResourcePermission::data_read(),
                handlers::get_region_names,
                |r| match r {
                    Request::GetRegionNames(r) => Some(r),
                    _ => None,
                },
                Response::GetRegionNames,
            ))
            .register(OperationDescriptor::new(
                RequestKind::GetAvailableServers,
                ResourcePermission::cluster_read(),
                handlers::get_available_servers,
                |r| match r {
                    Request::GetAvailableServers(r) => Some(r),
                    _ => None,
                },
                Response::GetAvailableServers,
            ))
    }

    /// Registry with no operations. Every dispatch fails as unsupported.
    pub fn empty() -> Self {
        Self {
            operations: FxHashMap::default(),
        }
    }

    /// Add or replace the operation for the descriptor's kind.
    pub fn register<Req, Resp>(mut self, descriptor: OperationDescriptor<Req, Resp>) -> Self
    where
        Req: Send + Sync + 'static,
        Resp: Send + Sync + 'static,
    {
        self.operations.insert(descriptor.kind, Box::new(descriptor));
        self
    }

    /// The operation registered for `kind`.
    pub fn describe(&self, kind: RequestKind) -> Option<&dyn Operation> {
        self.operations.get(&kind).map(|op| op.as_ref())
    }

    /// Number of registered operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether no operation is registered
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Tests build partial registries around these.
#[cfg(test)]
pub(crate) fn unwrap_get(request: Request) -> Option<cinder_wire::GetRequest> {
    match request {
        Request::Get(r) => Some(r),
        _ => None,
    }
}
