//! Failure classification shared by handlers and the dispatcher.
//!
//! Every anticipated failure of an operation ends up as an [`ErrorResponse`]:
//! an [`ErrorCode`] drawn from a closed enumeration plus a human-readable
//! message. The numeric code values are part of the wire contract; new codes
//! may be added, existing ones must never be renumbered.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Wire-visible failure categories.
///
/// Each variant is a disjoint category; a handler classifies every caught
/// failure into exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ErrorCode {
    /// A key or value used an encoding the server cannot decode or encode.
    ValueEncodingError = 1100,
    /// The request names an operation this server (or context) cannot run.
    UnsupportedOperation = 1102,
    /// The caller is not permitted to run the operation.
    AuthorizationFailed = 1201,
    /// The data exists but could not be reached (loader or storage failure).
    DataUnreachable = 1301,
    /// The backing store timed out.
    OperationTimeout = 1302,
    /// The input violated a store constraint.
    ConstraintViolation = 2000,
    /// The named region does not exist.
    RegionNotFound = 2100,
}

impl ErrorCode {
    /// Every code, in ascending wire order.
    pub const ALL: [ErrorCode; 7] = [
        ErrorCode::ValueEncodingError,
        ErrorCode::UnsupportedOperation,
        ErrorCode::AuthorizationFailed,
        ErrorCode::DataUnreachable,
        ErrorCode::OperationTimeout,
        ErrorCode::ConstraintViolation,
        ErrorCode::RegionNotFound,
    ];

    /// The stable numeric value sent on the wire.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Resolve a numeric wire value; unknown values yield `None`.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Upper-snake name, as used in logs and operator docs.
    pub fn name(self) -> &'static str {
        match self {
            ErrorCode::ValueEncodingError => "VALUE_ENCODING_ERROR",
            ErrorCode::UnsupportedOperation => "UNSUPPORTED_OPERATION",
            ErrorCode::AuthorizationFailed => "AUTHORIZATION_FAILED",
            ErrorCode::DataUnreachable => "DATA_UNREACHABLE",
            ErrorCode::OperationTimeout => "OPERATION_TIMEOUT",
            ErrorCode::ConstraintViolation => "CONSTRAINT_VIOLATION",
            ErrorCode::RegionNotFound => "REGION_NOT_FOUND",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.code())
    }
}

/// A classified failure: code plus message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct ErrorResponse {
    /// Failure category
    pub code: ErrorCode,
    /// Human-readable detail, safe to send to the client
    pub message: String,
}

impl ErrorResponse {
    /// Build an error response.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// `REGION_NOT_FOUND` with the canonical message.
    pub fn region_not_found() -> Self {
        Self::new(ErrorCode::RegionNotFound, "Region not found")
    }

    /// `AUTHORIZATION_FAILED` with the canonical message.
    pub fn authorization_failed() -> Self {
        Self::new(
            ErrorCode::AuthorizationFailed,
            "User isn't authorized for this operation.",
        )
    }

    /// `UNSUPPORTED_OPERATION` with the given message.
    pub fn unsupported_operation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnsupportedOperation, message)
    }
}

/// Outcome of one operation: `Ok` is the success payload, `Err` the
/// classified failure.
pub type OperationResult<T> = Result<T, ErrorResponse>;

/// An operation asked its context for a resource the context is not bound to.
///
/// Raised by the execution context accessors (a locator operation on a
/// cache-bound context, or the reverse) and by authorizers that need state a
/// locator context does not carry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid execution context: {reason}")]
pub struct InvalidExecutionContext {
    /// What was asked for and why it is unavailable
    pub reason: String,
}

impl InvalidExecutionContext {
    /// Build from a reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// The dispatcher never lets a raw context error reach the wire: it becomes
/// `UNSUPPORTED_OPERATION`.
impl From<InvalidExecutionContext> for ErrorResponse {
    fn from(_: InvalidExecutionContext) -> Self {
        ErrorResponse::unsupported_operation("Invalid execution context found for operation.")
    }
}

/// Failures a backing region can report for a single call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    /// The store did not answer in time.
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// A distributed lease expired while the call was in progress.
    #[error("lease expired: {0}")]
    LeaseExpired(String),

    /// A cache loader or partitioned storage failed to produce the data.
    #[error("data unreachable: {0}")]
    DataUnreachable(String),

    /// The key or value was rejected by the store.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl RegionError {
    /// The wire category this failure belongs to.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            RegionError::Timeout(_) | RegionError::LeaseExpired(_) => ErrorCode::OperationTimeout,
            RegionError::DataUnreachable(_) => ErrorCode::DataUnreachable,
            RegionError::InvalidInput(_) => ErrorCode::ConstraintViolation,
        }
    }
}

impl From<RegionError> for ErrorResponse {
    fn from(err: RegionError) -> Self {
        let message = match &err {
            RegionError::Timeout(m) | RegionError::LeaseExpired(m) => {
                format!("Operation timed out: {}", m)
            }
            RegionError::DataUnreachable(m) => format!("Data unreachable: {}", m),
            RegionError::InvalidInput(m) => format!("Invalid input: {}", m),
        };
        ErrorResponse::new(err.error_code(), message)
    }
}
