//! Plugin lookup for authentication and authorization strategies.
//!
//! # Design
//!
//! Each strategy family has a [`PluginRegistry`]: a map from implementation
//! ID to factory, populated from a discovery function the first time anyone
//! touches it. Population runs at most once per registry; concurrent first
//! callers block until the map is complete and then share the same immutable
//! map. Nothing takes a lock after that.
//!
//! Discovery defaults to the compiled-in tables ([`builtin_authenticators`],
//! [`builtin_authorizers`]). Embedders with their own strategies build a
//! service with [`AuthenticatorLookupService::with_discovery`].
//!
//! # Duplicate IDs
//!
//! If discovery yields the same ID twice, the entry that comes later wins
//! and a warning is logged.

use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{info, warn};

use crate::authenticator::{Authenticator, NoOpAuthenticator, SimpleAuthenticator};
use crate::authorizer::{Authorizer, NoOpAuthorizer, SecurityManagerAuthorizer};

/// Lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No strategy is registered under the ID. This is an operator
    /// configuration error and is not retried.
    #[error("could not find implementation for {family} with implementation ID {id}")]
    NotRegistered {
        /// Strategy family
        family: &'static str,
        /// Requested ID
        id: String,
    },

    /// The strategy is registered but its factory failed.
    #[error("unable to instantiate {family} for ID {id}: {reason}")]
    Instantiation {
        /// Strategy family
        family: &'static str,
        /// Requested ID
        id: String,
        /// Factory error
        reason: String,
    },
}

/// Builds a fresh strategy instance.
pub type PluginFactory<T> = Arc<dyn Fn() -> Result<Box<T>, String> + Send + Sync>;

/// One discovered strategy.
pub struct PluginEntry<T: ?Sized> {
    id: String,
    factory: PluginFactory<T>,
}

impl<T: ?Sized> PluginEntry<T> {
    /// Register `factory` under `id`.
    pub fn new(
        id: impl Into<String>,
        factory: impl Fn() -> Result<Box<T>, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            factory: Arc::new(factory),
        }
    }

    /// Implementation ID.
    pub fn id(&self) -> &str {
        &self.id
    }
}

type Discovery<T> = Box<dyn Fn() -> Vec<PluginEntry<T>> + Send + Sync>;

/// Lazily populated, then immutable, ID → factory map.
pub struct PluginRegistry<T: ?Sized> {
    family: &'static str,
    discover: Discovery<T>,
    plugins: OnceCell<FxHashMap<String, PluginFactory<T>>>,
}

impl<T: ?Sized> PluginRegistry<T> {
    /// Registry for `family` that populates itself from `discover`.
    pub fn new(
        family: &'static str,
        discover: impl Fn() -> Vec<PluginEntry<T>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            family,
            discover: Box::new(discover),
            plugins: OnceCell::new(),
        }
    }

    /// Populate the map if nobody has yet and return it.
    pub fn initialize(&self) -> &FxHashMap<String, PluginFactory<T>> {
        self.plugins.get_or_init(|| {
            let mut plugins = FxHashMap::default();
            for entry in (self.discover)() {
                if plugins.insert(entry.id.clone(), entry.factory).is_some() {
                    warn!(
                        family = self.family,
                        id = %entry.id,
                        "duplicate implementation ID, later registration replaces earlier"
                    );
                }
            }
            info!(family = self.family, count = plugins.len(), "plugin registry populated");
            plugins
        })
    }

    /// Whether the map has been populated.
    pub fn is_initialized(&self) -> bool {
        self.plugins.get().is_some()
    }

    /// Registered IDs, sorted.
    pub fn registered_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.initialize().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Instantiate the strategy registered under `id`.
    pub fn lookup(&self, id: &str) -> Result<Box<T>, LookupError> {
        let factory = self
            .initialize()
            .get(id)
            .ok_or_else(|| LookupError::NotRegistered {
                family: self.family,
                id: id.to_string(),
            })?;
        factory().map_err(|reason| {
            warn!(family = self.family, id, %reason, "strategy factory failed");
            LookupError::Instantiation {
                family: self.family,
                id: id.to_string(),
                reason,
            }
        })
    }
}

/// Compiled-in authenticators: `SIMPLE` and `NOOP`.
pub fn builtin_authenticators() -> Vec<PluginEntry<dyn Authenticator>> {
    vec![
        PluginEntry::new(SimpleAuthenticator::ID, || {
            Ok(Box::new(SimpleAuthenticator::new()) as Box<dyn Authenticator>)
        }),
        PluginEntry::new(NoOpAuthenticator::ID, || {
            Ok(Box::new(NoOpAuthenticator::default()) as Box<dyn Authenticator>)
        }),
    ]
}

/// Compiled-in authorizers: `DEFAULT` and `NOOP`.
pub fn builtin_authorizers() -> Vec<PluginEntry<dyn Authorizer>> {
    vec![
        PluginEntry::new(SecurityManagerAuthorizer::ID, || {
            Ok(Box::new(SecurityManagerAuthorizer) as Box<dyn Authorizer>)
        }),
        PluginEntry::new(NoOpAuthorizer::ID, || {
            Ok(Box::new(NoOpAuthorizer) as Box<dyn Authorizer>)
        }),
    ]
}

static AUTHENTICATORS: Lazy<AuthenticatorLookupService> =
    Lazy::new(AuthenticatorLookupService::new);

static AUTHORIZERS: Lazy<AuthorizationLookupService> = Lazy::new(AuthorizationLookupService::new);

/// Finds authenticators by implementation ID.
pub struct AuthenticatorLookupService {
    registry: PluginRegistry<dyn Authenticator>,
}

impl AuthenticatorLookupService {
    /// Service over the compiled-in authenticators.
    pub fn new() -> Self {
        Self::with_discovery(builtin_authenticators)
    }

    /// Service over a custom discovery function.
    pub fn with_discovery(
        discover: impl Fn() -> Vec<PluginEntry<dyn Authenticator>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            registry: PluginRegistry::new("Authenticator", discover),
        }
    }

    /// The process-wide service.
    pub fn global() -> &'static Self {
        &AUTHENTICATORS
    }

    /// A fresh authenticator for `mode`.
    pub fn get_authenticator(&self, mode: &str) -> Result<Box<dyn Authenticator>, LookupError> {
        self.registry.lookup(mode)
    }

    /// Registered IDs, sorted.
    pub fn registered_ids(&self) -> Vec<String> {
        self.registry.registered_ids()
    }
}

impl Default for AuthenticatorLookupService {
    fn default() -> Self {
        Self::new()
    }
}

/// Finds authorizers by implementation ID.
pub struct AuthorizationLookupService {
    registry: PluginRegistry<dyn Authorizer>,
}

impl AuthorizationLookupService {
    /// Service over the compiled-in authorizers.
    pub fn new() -> Self {
        Self::with_discovery(builtin_authorizers)
    }

    /// Service over a custom discovery function.
    pub fn with_discovery(
        discover: impl Fn() -> Vec<PluginEntry<dyn Authorizer>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            registry: PluginRegistry::new("Authorizer", discover),
        }
    }

    /// The process-wide service.
    pub fn global() -> &'static Self {
        &AUTHORIZERS
    }

    /// A fresh authorizer for `mode`.
    pub fn get_authorizer(&self, mode: &str) -> Result<Box<dyn Authorizer>, LookupError> {
        self.registry.lookup(mode)
    }

    /// Registered IDs, sorted.
    pub fn registered_ids(&self) -> Vec<String> {
        self.registry.registered_ids()
    }
}

impl Default for AuthorizationLookupService {
    fn default() -> Self {
        Self::new()
    }
}
