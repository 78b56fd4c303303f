//! Protocol configuration.

use serde::{Deserialize, Serialize};

use cinder_wire::DEFAULT_MAX_MESSAGE_SIZE;

/// Security and framing options for client connections.
///
/// Use the builder methods to configure options:
///
/// ```ignore
/// use cinder_security::ProtocolConfig;
///
/// let config = ProtocolConfig::new()
///     .authentication_mode("SIMPLE")
///     .authorization_mode("NOOP");
/// ```
///
/// Or load from JSON; missing fields take their defaults:
///
/// ```ignore
/// let config = ProtocolConfig::from_json_str(r#"{"authorization_mode":"NOOP"}"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProtocolConfig {
    /// Implementation ID of the authenticator used for the handshake.
    pub authentication_mode: String,
    /// Implementation ID of the authorizer installed on each context.
    pub authorization_mode: String,
    /// Largest frame body accepted from a client, in bytes.
    pub max_message_size: usize,
}

impl ProtocolConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Set the authenticator implementation ID.
    pub fn authentication_mode(mut self, mode: impl Into<String>) -> Self {
        self.authentication_mode = mode.into();
        self
    }

    /// Set the authorizer implementation ID.
    pub fn authorization_mode(mut self, mode: impl Into<String>) -> Self {
        self.authorization_mode = mode.into();
        self
    }

    /// Set the maximum frame size.
    pub fn max_message_size(mut self, bytes: usize) -> Self {
        self.max_message_size = bytes;
        self
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            authentication_mode: crate::SimpleAuthenticator::ID.to_string(),
            authorization_mode: crate::SecurityManagerAuthorizer::ID.to_string(),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}
