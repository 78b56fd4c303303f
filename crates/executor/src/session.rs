//! Client sessions.
//!
//! A [`ClientSession`] is one authenticated server connection: it runs the
//! handshake with the configured authenticator, installs the configured
//! authorizer on a cache-bound [`ExecutionContext`], and then serves
//! length-delimited requests until the client closes the stream.

use std::io::{Read, Write};
use std::sync::Arc;

use cinder_core::{Cache, ErrorCode, ErrorResponse};
use cinder_security::{
    AuthenticationError, AuthenticatorLookupService, AuthorizationLookupService, LookupError,
    Principal, ProtocolConfig, SecurityManager,
};
use cinder_wire::{read_delimited, write_delimited, FrameError, Request, Response};
use thiserror::Error;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::context::ExecutionContext;
use crate::processor::OperationsProcessor;
use crate::statistics::ClientStatistics;

/// Session-level failure.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The configured authenticator or authorizer is not available.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The handshake failed. The client has already been told.
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    /// A request or response frame could not be read or written.
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// One authenticated client connection.
pub struct ClientSession {
    id: Uuid,
    context: ExecutionContext,
    processor: Arc<OperationsProcessor>,
    max_message_size: usize,
}

impl ClientSession {
    /// Authenticate a new connection using the process-wide lookup services.
    pub fn establish(
        config: &ProtocolConfig,
        input: &mut dyn Read,
        output: &mut dyn Write,
        security_manager: Arc<dyn SecurityManager>,
        cache: Arc<dyn Cache>,
        statistics: Arc<dyn ClientStatistics>,
        processor: Arc<OperationsProcessor>,
    ) -> Result<Self, SessionError> {
        Self::establish_with(
            AuthenticatorLookupService::global(),
            AuthorizationLookupService::global(),
            config,
            input,
            output,
            security_manager,
            cache,
            statistics,
            processor,
        )
    }

    /// Authenticate a new connection using the given lookup services.
    #[allow(clippy::too_many_arguments)]
    pub fn establish_with(
        authenticators: &AuthenticatorLookupService,
        authorizers: &AuthorizationLookupService,
        config: &ProtocolConfig,
        input: &mut dyn Read,
        output: &mut dyn Write,
        security_manager: Arc<dyn SecurityManager>,
        cache: Arc<dyn Cache>,
        statistics: Arc<dyn ClientStatistics>,
        processor: Arc<OperationsProcessor>,
    ) -> Result<Self, SessionError> {
        let id = Uuid::new_v4();
        let span = info_span!("client_session", session_id = %id);
        let _guard = span.enter();

        let mut authenticator = authenticators.get_authenticator(&config.authentication_mode)?;
        authenticator.set_max_message_size(config.max_message_size);
        let authorizer = authorizers.get_authorizer(&config.authorization_mode)?;

        let principal: Principal =
            match authenticator.authenticate(input, output, security_manager.as_ref()) {
                Ok(principal) => principal,
                Err(err) => {
                    warn!(error = %err, "client handshake failed");
                    statistics.inc_authentication_failures();
                    return Err(err.into());
                }
            };
        info!(
            principal = %principal,
            authenticator = authenticator.implementation_id(),
            authorizer = authorizer.implementation_id(),
            "client session established"
        );

        let context = ExecutionContext::for_cache(
            cache,
            principal,
            security_manager,
            statistics,
            Arc::from(authorizer),
        );
        Ok(Self {
            id,
            context,
            processor,
            max_message_size: config.max_message_size,
        })
    }

    /// Session id, as recorded on the session's log span.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The authenticated principal.
    pub fn principal(&self) -> Option<&Principal> {
        self.context.principal()
    }

    /// The context requests run against.
    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Process one decoded request.
    pub fn serve_request(&self, request: Request) -> Response {
        self.processor.process(request, &self.context)
    }

    /// Read the next request frame. `None` on a clean end of stream.
    pub fn read_request(&self, input: &mut dyn Read) -> Result<Option<Request>, FrameError> {
        read_delimited(input, self.max_message_size)
    }

    /// Write one response frame.
    pub fn write_response(
        &self,
        output: &mut dyn Write,
        response: &Response,
    ) -> Result<(), FrameError> {
        write_delimited(output, response)
    }

    /// Serve requests until the client closes the stream. Returns the number
    /// of requests answered.
    ///
    /// A complete frame whose body does not decode is answered with
    /// `VALUE_ENCODING_ERROR` and the session carries on. Stream failures,
    /// truncated frames and oversized frames end the session.
    pub fn serve(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<u64, SessionError> {
        let span = info_span!("client_session", session_id = %self.id);
        let _guard = span.enter();

        let mut served = 0u64;
        loop {
            let response = match self.read_request(input) {
                Ok(Some(request)) => self.serve_request(request),
                Ok(None) => break,
                Err(FrameError::Decode(err)) => {
                    warn!(error = %err, "malformed request body");
                    Response::Error(ErrorResponse::new(
                        ErrorCode::ValueEncodingError,
                        format!("Malformed request: {err}"),
                    ))
                }
                Err(err) => return Err(err.into()),
            };
            self.write_response(output, &response)?;
            served += 1;
        }
        debug!(served, "client closed session");
        Ok(served)
    }
}
