//! Per-operation authorization strategies.

use cinder_core::InvalidExecutionContext;
use tracing::trace;

use crate::manager::{Principal, SecurityManager};
use crate::permission::ResourcePermission;

/// Decides whether a principal may run an operation.
pub trait Authorizer: Send + Sync {
    /// Whether `principal` holds `permission`.
    ///
    /// Returns [`InvalidExecutionContext`] when the strategy needs context
    /// state that is absent, such as a security manager on a locator context.
    fn authorize(
        &self,
        principal: Option<&Principal>,
        permission: &ResourcePermission,
        security_manager: Option<&dyn SecurityManager>,
    ) -> Result<bool, InvalidExecutionContext>;

    /// The ID this strategy is registered under.
    fn implementation_id(&self) -> &'static str;
}

/// Allows everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpAuthorizer;

impl NoOpAuthorizer {
    /// Registration ID.
    pub const ID: &'static str = "NOOP";
}

impl Authorizer for NoOpAuthorizer {
    fn authorize(
        &self,
        _principal: Option<&Principal>,
        _permission: &ResourcePermission,
        _security_manager: Option<&dyn SecurityManager>,
    ) -> Result<bool, InvalidExecutionContext> {
        Ok(true)
    }

    fn implementation_id(&self) -> &'static str {
        Self::ID
    }
}

/// Delegates to [`SecurityManager::authorize`].
///
/// A missing principal is denied; a missing security manager is an invalid
/// context.
#[derive(Debug, Default, Clone, Copy)]
pub struct SecurityManagerAuthorizer;

impl SecurityManagerAuthorizer {
    /// Registration ID.
    pub const ID: &'static str = "DEFAULT";
}

impl Authorizer for SecurityManagerAuthorizer {
    fn authorize(
        &self,
        principal: Option<&Principal>,
        permission: &ResourcePermission,
        security_manager: Option<&dyn SecurityManager>,
    ) -> Result<bool, InvalidExecutionContext> {
        let manager = security_manager.ok_or_else(|| {
            InvalidExecutionContext::new("authorization requires a security manager")
        })?;
        let Some(principal) = principal else {
            return Ok(false);
        };
        let allowed = manager.authorize(principal, permission);
        trace!(principal = %principal, %permission, allowed, "authorization decision");
        Ok(allowed)
    }

    fn implementation_id(&self) -> &'static str {
        Self::ID
    }
}
