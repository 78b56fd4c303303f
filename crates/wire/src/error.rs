//! Wire-layer errors.

use cinder_core::{ErrorCode, ErrorResponse};
use thiserror::Error;

/// Failure converting between encoded and domain values.
///
/// Handlers classify every variant as `VALUE_ENCODING_ERROR`.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The custom encoding tag is not one this server knows.
    #[error("unsupported encoding type {0}")]
    UnsupportedEncodingType(u32),

    /// The encoding is known but no codec is registered for it.
    #[error("no codec registered for encoding {0}")]
    CodecNotRegistered(&'static str),

    /// The codec rejected the payload.
    #[error("{encoding} codec failed: {reason}")]
    Codec {
        /// Encoding name
        encoding: &'static str,
        /// Codec error text
        reason: String,
    },
}

/// Failure reading or writing a delimited frame.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Underlying stream failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended part-way through a frame.
    #[error("stream ended inside a frame")]
    Truncated,

    /// The length prefix exceeds the configured maximum.
    #[error("frame of {len} bytes exceeds maximum of {max}")]
    TooLarge {
        /// Announced length
        len: usize,
        /// Configured maximum
        max: usize,
    },

    /// The message could not be serialized.
    #[error("encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// The frame body is not a valid message.
    #[error("decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// Every encoding failure is `VALUE_ENCODING_ERROR` on the wire.
impl From<EncodingError> for ErrorResponse {
    fn from(err: EncodingError) -> Self {
        ErrorResponse::new(
            ErrorCode::ValueEncodingError,
            format!("Value encoding error: {}", err),
        )
    }
}
