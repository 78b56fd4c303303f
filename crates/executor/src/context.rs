//! Per-request execution context.
//!
//! A context binds an operation to exactly one backing resource: a server
//! [`Cache`] or a cluster [`Locator`]. Asking for the other one is an
//! [`InvalidExecutionContext`] error, which the dispatcher turns into
//! `UNSUPPORTED_OPERATION`.

use std::fmt;
use std::sync::Arc;

use cinder_core::{Cache, InvalidExecutionContext, Locator};
use cinder_security::{Authorizer, NoOpAuthorizer, Principal, SecurityManager};

use crate::statistics::{ClientStatistics, NoOpStatistics};

/// The resource a context runs operations against.
#[derive(Clone)]
pub enum Binding {
    /// Server-side cache
    Cache(Arc<dyn Cache>),
    /// Cluster locator
    Locator(Arc<dyn Locator>),
}

/// Everything an operation needs beyond its request.
///
/// Immutable once built; owned by the connection that built it.
#[derive(Clone)]
pub struct ExecutionContext {
    binding: Binding,
    principal: Option<Principal>,
    security_manager: Option<Arc<dyn SecurityManager>>,
    statistics: Arc<dyn ClientStatistics>,
    authorizer: Arc<dyn Authorizer>,
}

impl ExecutionContext {
    /// Context for a server connection.
    pub fn for_cache(
        cache: Arc<dyn Cache>,
        principal: Principal,
        security_manager: Arc<dyn SecurityManager>,
        statistics: Arc<dyn ClientStatistics>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            binding: Binding::Cache(cache),
            principal: Some(principal),
            security_manager: Some(security_manager),
            statistics,
            authorizer,
        }
    }

    /// Context for a locator connection.
    ///
    /// Locators do not enforce per-operation permissions: the context gets
    /// the allow-all authorizer and discards statistics.
    pub fn for_locator(locator: Arc<dyn Locator>) -> Self {
        Self {
            binding: Binding::Locator(locator),
            principal: None,
            security_manager: None,
            statistics: Arc::new(NoOpStatistics),
            authorizer: Arc::new(NoOpAuthorizer),
        }
    }

    /// The bound resource.
    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// The cache, if this is a server context.
    pub fn cache(&self) -> Result<&Arc<dyn Cache>, InvalidExecutionContext> {
        match &self.binding {
            Binding::Cache(cache) => Ok(cache),
            Binding::Locator(_) => Err(InvalidExecutionContext::new(
                "Operations on the locator should not try to operate on a cache",
            )),
        }
    }

    /// The locator, if this is a locator context.
    pub fn locator(&self) -> Result<&Arc<dyn Locator>, InvalidExecutionContext> {
        match &self.binding {
            Binding::Locator(locator) => Ok(locator),
            Binding::Cache(_) => Err(InvalidExecutionContext::new(
                "Operations on the server should not try to operate on a locator",
            )),
        }
    }

    /// Authenticated principal. Always present on server contexts.
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Policy provider. Always present on server contexts.
    pub fn security_manager(&self) -> Option<&dyn SecurityManager> {
        self.security_manager.as_deref()
    }

    /// Statistics sink.
    pub fn statistics(&self) -> &dyn ClientStatistics {
        self.statistics.as_ref()
    }

    /// Per-operation authorizer.
    pub fn authorizer(&self) -> &dyn Authorizer {
        self.authorizer.as_ref()
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let binding = match self.binding {
            Binding::Cache(_) => "cache",
            Binding::Locator(_) => "locator",
        };
        f.debug_struct("ExecutionContext")
            .field("binding", &binding)
            .field("principal", &self.principal)
            .field("authorizer", &self.authorizer.implementation_id())
            .finish()
    }
}
