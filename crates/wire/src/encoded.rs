//! On-wire representation of keys and values.

use serde::{Deserialize, Serialize};

/// An encoded key or value as carried by requests and responses.
///
/// Scalars travel as typed fields. Structured documents travel as
/// [`EncodedValue::Custom`] bytes tagged with an encoding, decoded by
/// whichever codec the server registered for that encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EncodedValue {
    /// Null / absent
    Null,
    /// Boolean
    Bool(bool),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// 64-bit float
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Raw bytes
    Binary(Vec<u8>),
    /// Codec-encoded payload
    Custom {
        /// Encoding tag, see [`EncodingType`]
        encoding: u32,
        /// Encoded bytes
        bytes: Vec<u8>,
    },
}

impl EncodedValue {
    /// Custom payload with a known encoding.
    pub fn custom(encoding: EncodingType, bytes: Vec<u8>) -> Self {
        EncodedValue::Custom {
            encoding: encoding.tag(),
            bytes,
        }
    }
}

impl From<&str> for EncodedValue {
    fn from(v: &str) -> Self {
        EncodedValue::String(v.to_string())
    }
}

impl From<i32> for EncodedValue {
    fn from(v: i32) -> Self {
        EncodedValue::Int(v)
    }
}

/// Custom encodings a server may register codecs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingType {
    /// UTF-8 JSON text
    Json,
    /// MessagePack
    MessagePack,
}

impl EncodingType {
    /// Wire tag.
    pub fn tag(self) -> u32 {
        match self {
            EncodingType::Json => 1,
            EncodingType::MessagePack => 2,
        }
    }

    /// Resolve a wire tag.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            1 => Some(EncodingType::Json),
            2 => Some(EncodingType::MessagePack),
            _ => None,
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            EncodingType::Json => "JSON",
            EncodingType::MessagePack => "MessagePack",
        }
    }
}
