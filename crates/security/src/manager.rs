//! Security policy provider.
//!
//! A [`SecurityManager`] validates credentials and answers permission
//! questions for an authenticated [`Principal`]. Deployments plug in their own
//! implementation; [`StaticSecurityManager`] keeps a fixed user table.

use std::fmt;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::permission::ResourcePermission;

/// Identity produced by a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal {
    name: String,
}

impl Principal {
    /// Principal for a named user.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Principal used when authentication is disabled.
    pub fn anonymous() -> Self {
        Self::new("anonymous")
    }

    /// User name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Username/password pair presented during the handshake.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User name
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Build credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Credentials were rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("authentication failed: {0}")]
pub struct AuthenticationFailed(pub String);

/// Validates credentials and decides permissions.
pub trait SecurityManager: Send + Sync {
    /// Authenticate credentials into a principal.
    fn authenticate(&self, credentials: &Credentials) -> Result<Principal, AuthenticationFailed>;

    /// Whether `principal` holds `permission`.
    fn authorize(&self, principal: &Principal, permission: &ResourcePermission) -> bool;
}

struct UserEntry {
    password: String,
    grants: Vec<ResourcePermission>,
}

/// Security manager backed by a fixed user table.
///
/// ```ignore
/// let manager = StaticSecurityManager::new()
///     .user("reader", "pw", [ResourcePermission::data_read()])
///     .user("admin", "pw", [ResourcePermission::data_read(), ResourcePermission::data_write()]);
/// ```
#[derive(Default)]
pub struct StaticSecurityManager {
    users: FxHashMap<String, UserEntry>,
}

impl StaticSecurityManager {
    /// Empty user table: every authentication fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user.
    pub fn user(
        mut self,
        name: impl Into<String>,
        password: impl Into<String>,
        grants: impl IntoIterator<Item = ResourcePermission>,
    ) -> Self {
        self.users.insert(
            name.into(),
            UserEntry {
                password: password.into(),
                grants: grants.into_iter().collect(),
            },
        );
        self
    }
}

impl SecurityManager for StaticSecurityManager {
    fn authenticate(&self, credentials: &Credentials) -> Result<Principal, AuthenticationFailed> {
        match self.users.get(&credentials.username) {
            Some(entry) if entry.password == credentials.password => {
                Ok(Principal::new(credentials.username.clone()))
            }
            // Same message for unknown user and wrong password.
            _ => Err(AuthenticationFailed("invalid username or password".into())),
        }
    }

    fn authorize(&self, principal: &Principal, permission: &ResourcePermission) -> bool {
        self.users
            .get(principal.name())
            .map(|entry| entry.grants.iter().any(|g| g.implies(permission)))
            .unwrap_or(false)
    }
}
