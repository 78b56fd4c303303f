//! Wire layer for the cinder client protocol.
//!
//! - [`messages`]: request/response shapes, one pair per operation kind
//! - [`encoded`]: [`EncodedValue`], the on-wire form of keys and values
//! - [`serialization`]: the [`SerializationService`] that converts between
//!   encoded and domain values through registered codecs
//! - [`framing`]: length-delimited message framing

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encoded;
pub mod error;
pub mod framing;
pub mod messages;
pub mod serialization;

pub use encoded::{EncodedValue, EncodingType};
pub use error::{EncodingError, FrameError};
pub use framing::{read_delimited, write_delimited, DEFAULT_MAX_MESSAGE_SIZE};
pub use messages::*;
pub use serialization::{
    Codec, JsonCodec, MessagePackCodec, ProtocolSerializationService, SerializationService,
};
