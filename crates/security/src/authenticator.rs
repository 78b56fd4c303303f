//! Connection handshake authentication.
//!
//! An [`Authenticator`] lives for one connection and moves through two
//! states: unauthenticated, then authenticated for the rest of the
//! connection. Once authenticated, further calls return the cached principal
//! without touching the streams.

use std::io::{Read, Write};

use cinder_wire::{
    read_delimited, write_delimited, FrameError, SimpleAuthenticationRequest,
    SimpleAuthenticationResponse, DEFAULT_MAX_MESSAGE_SIZE,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::manager::{AuthenticationFailed, Credentials, Principal, SecurityManager};

/// Handshake failure.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// The client closed the stream before sending a handshake message.
    #[error("end of stream before authentication request")]
    EndOfStream,

    /// The security manager rejected the credentials. The client has
    /// already been told.
    #[error(transparent)]
    Failed(#[from] AuthenticationFailed),

    /// The handshake message could not be read or parsed.
    #[error("malformed authentication message: {0}")]
    Malformed(String),

    /// Stream failure.
    #[error("i/o error during authentication: {0}")]
    Io(#[from] std::io::Error),
}

impl From<FrameError> for AuthenticationError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Io(e) => AuthenticationError::Io(e),
            other => AuthenticationError::Malformed(other.to_string()),
        }
    }
}

/// A pluggable handshake strategy.
pub trait Authenticator: Send {
    /// Run the handshake over `input`/`output`, or return the cached
    /// principal if this connection is already authenticated.
    fn authenticate(
        &mut self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        security_manager: &dyn SecurityManager,
    ) -> Result<Principal, AuthenticationError>;

    /// Whether a handshake has succeeded on this connection.
    fn is_authenticated(&self) -> bool;

    /// Cap the size of handshake frames this strategy reads. Strategies that
    /// read nothing ignore it.
    fn set_max_message_size(&mut self, _bytes: usize) {}

    /// The ID this strategy is registered under.
    fn implementation_id(&self) -> &'static str;
}

/// Username/password handshake.
///
/// Reads one delimited [`SimpleAuthenticationRequest`] and always answers
/// with one delimited [`SimpleAuthenticationResponse`] before returning,
/// including on failure.
#[derive(Debug)]
pub struct SimpleAuthenticator {
    principal: Option<Principal>,
    max_message_size: usize,
}

impl Default for SimpleAuthenticator {
    fn default() -> Self {
        Self {
            principal: None,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl SimpleAuthenticator {
    /// Registration ID.
    pub const ID: &'static str = "SIMPLE";

    /// Fresh, unauthenticated instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject handshake frames larger than `bytes`.
    pub fn with_max_message_size(mut self, bytes: usize) -> Self {
        self.max_message_size = bytes;
        self
    }

    fn reply(output: &mut dyn Write, authenticated: bool) -> Result<(), AuthenticationError> {
        write_delimited(output, &SimpleAuthenticationResponse { authenticated })?;
        Ok(())
    }
}

impl Authenticator for SimpleAuthenticator {
    fn authenticate(
        &mut self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        security_manager: &dyn SecurityManager,
    ) -> Result<Principal, AuthenticationError> {
        if let Some(principal) = &self.principal {
            return Ok(principal.clone());
        }

        let request: SimpleAuthenticationRequest =
            read_delimited(input, self.max_message_size)?
                .ok_or(AuthenticationError::EndOfStream)?;
        let credentials = Credentials::new(request.username, request.password);

        match security_manager.authenticate(&credentials) {
            Ok(principal) => {
                self.principal = Some(principal.clone());
                Self::reply(output, true)?;
                debug!(principal = %principal, "client authenticated");
                Ok(principal)
            }
            Err(failed) => {
                warn!(username = %credentials.username, "authentication failed");
                Self::reply(output, false)?;
                Err(failed.into())
            }
        }
    }

    fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    fn set_max_message_size(&mut self, bytes: usize) {
        self.max_message_size = bytes;
    }

    fn implementation_id(&self) -> &'static str {
        Self::ID
    }
}

/// Handshake for unsecured deployments: reads and writes nothing and yields
/// [`Principal::anonymous`].
#[derive(Debug, Default)]
pub struct NoOpAuthenticator {
    authenticated: bool,
}

impl NoOpAuthenticator {
    /// Registration ID.
    pub const ID: &'static str = "NOOP";
}

impl Authenticator for NoOpAuthenticator {
    fn authenticate(
        &mut self,
        _input: &mut dyn Read,
        _output: &mut dyn Write,
        _security_manager: &dyn SecurityManager,
    ) -> Result<Principal, AuthenticationError> {
        self.authenticated = true;
        Ok(Principal::anonymous())
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn implementation_id(&self) -> &'static str {
        Self::ID
    }
}
