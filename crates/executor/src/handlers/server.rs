//! Locator handlers.

use cinder_core::OperationResult;
use cinder_wire::{
    GetAvailableServersRequest, GetAvailableServersResponse, SerializationService, Server,
};
use tracing::debug;

use crate::context::ExecutionContext;

/// Handle GetAvailableServers.
///
/// A locator with no load snapshot yet answers with an empty list.
pub fn get_available_servers(
    _serialization: &dyn SerializationService,
    _request: GetAvailableServersRequest,
    context: &ExecutionContext,
) -> OperationResult<GetAvailableServersResponse> {
    let servers: Vec<Server> = context
        .locator()?
        .servers()
        .unwrap_or_default()
        .into_iter()
        .map(|location| Server {
            hostname: location.host,
            port: location.port,
        })
        .collect();
    debug!(count = servers.len(), "available servers");
    Ok(GetAvailableServersResponse { servers })
}
