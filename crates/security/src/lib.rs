//! Authentication, authorization and protocol configuration for cinder.
//!
//! Connections authenticate once through an [`Authenticator`] chosen by
//! [`ProtocolConfig::authentication_mode`]; each operation is then checked by
//! an [`Authorizer`] chosen by [`ProtocolConfig::authorization_mode`]. Both
//! are resolved by implementation ID through the lookup services in
//! [`lookup`].

#![warn(missing_docs)]

pub mod authenticator;
pub mod authorizer;
pub mod config;
pub mod lookup;
pub mod manager;
pub mod permission;

pub use authenticator::{
    AuthenticationError, Authenticator, NoOpAuthenticator, SimpleAuthenticator,
};
pub use authorizer::{Authorizer, NoOpAuthorizer, SecurityManagerAuthorizer};
pub use config::ProtocolConfig;
pub use lookup::{
    AuthenticatorLookupService, AuthorizationLookupService, LookupError, PluginEntry,
    PluginRegistry,
};
pub use manager::{
    AuthenticationFailed, Credentials, Principal, SecurityManager, StaticSecurityManager,
};
pub use permission::{Operation, Resource, ResourcePermission};
