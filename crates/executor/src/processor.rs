//! Central dispatch.
//!
//! [`OperationsProcessor::process`] turns one decoded [`Request`] into one
//! [`Response`]:
//!
//! 1. look up the operation for the request's discriminant
//! 2. authorize the context's principal for the operation's permission,
//!    scoped to the request's region
//! 3. run the handler
//! 4. convert its result
//!
//! The handler never runs when authorization is denied or cannot be decided.
//! Every anticipated failure comes back as [`Response::Error`].

use std::sync::Arc;

use cinder_core::ErrorResponse;
use cinder_wire::{ProtocolSerializationService, Request, Response, SerializationService};
use tracing::{debug, error, warn};

use crate::context::ExecutionContext;
use crate::registry::OperationRegistry;

/// Dispatches requests through an [`OperationRegistry`].
pub struct OperationsProcessor {
    registry: OperationRegistry,
    serialization: Arc<dyn SerializationService>,
}

impl OperationsProcessor {
    /// Processor over every supported operation with the default codecs.
    pub fn new() -> Self {
        Self::with_registry(
            OperationRegistry::new(),
            Arc::new(ProtocolSerializationService::new()),
        )
    }

    /// Processor over a given registry and serialization service.
    pub fn with_registry(
        registry: OperationRegistry,
        serialization: Arc<dyn SerializationService>,
    ) -> Self {
        Self {
            registry,
            serialization,
        }
    }

    /// The registry requests are dispatched through.
    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Process one request against `context`.
    pub fn process(&self, request: Request, context: &ExecutionContext) -> Response {
        let Some(operation) = request.kind().and_then(|kind| self.registry.describe(kind)) else {
            warn!("unsupported request type");
            return Response::Error(ErrorResponse::unsupported_operation(
                "Unsupported request type",
            ));
        };
        let kind = operation.kind();
        debug!(operation = %kind, "processing request");

        let permission = operation
            .required_permission()
            .clone()
            .scoped(request.region());
        match context.authorizer().authorize(
            context.principal(),
            &permission,
            context.security_manager(),
        ) {
            Ok(true) => {}
            Ok(false) => {
                warn!(
                    operation = %kind,
                    principal = ?context.principal().map(|p| p.name()),
                    %permission,
                    "authorization denied"
                );
                context.statistics().inc_authorization_violations();
                return Response::Error(ErrorResponse::authorization_failed());
            }
            Err(invalid) => {
                error!(operation = %kind, reason = %invalid.reason, "invalid execution context");
                return Response::Error(invalid.into());
            }
        }

        let response = operation.execute(self.serialization.as_ref(), request, context);
        context.statistics().inc_operations_processed();
        response
    }
}

impl Default for OperationsProcessor {
    fn default() -> Self {
        Self::new()
    }
}
