//! Conversion between [`EncodedValue`] and domain [`Value`].
//!
//! Scalars map one-to-one. Custom-encoded payloads go through a [`Codec`]
//! looked up by encoding tag:
//!
//! | Tag state | Error |
//! |-----------|-------|
//! | Unknown tag | `UnsupportedEncodingType` |
//! | Known tag, no codec registered | `CodecNotRegistered` |
//! | Codec rejects the bytes | `Codec` |

use cinder_core::{JsonValue, Value};
use rustc_hash::FxHashMap;

use crate::encoded::{EncodedValue, EncodingType};
use crate::error::EncodingError;

/// Capability handlers use to decode request values and encode results.
pub trait SerializationService: Send + Sync {
    /// Decode a wire value into a domain value.
    fn decode(&self, encoded: &EncodedValue) -> Result<Value, EncodingError>;

    /// Encode a domain value for the wire.
    fn encode(&self, value: &Value) -> Result<EncodedValue, EncodingError>;
}

/// A codec for one custom encoding.
pub trait Codec: Send + Sync {
    /// The encoding this codec handles.
    fn encoding(&self) -> EncodingType;

    /// Decode payload bytes.
    fn decode(&self, bytes: &[u8]) -> Result<Value, EncodingError>;

    /// Encode a document.
    fn encode(&self, document: &JsonValue) -> Result<Vec<u8>, EncodingError>;
}

/// JSON text codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encoding(&self) -> EncodingType {
        EncodingType::Json
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, EncodingError> {
        serde_json::from_slice::<serde_json::Value>(bytes)
            .map(|v| Value::Json(JsonValue::from(v)))
            .map_err(|e| EncodingError::Codec {
                encoding: EncodingType::Json.name(),
                reason: e.to_string(),
            })
    }

    fn encode(&self, document: &JsonValue) -> Result<Vec<u8>, EncodingError> {
        Ok(document.to_json_string().into_bytes())
    }
}

/// MessagePack document codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct MessagePackCodec;

impl Codec for MessagePackCodec {
    fn encoding(&self) -> EncodingType {
        EncodingType::MessagePack
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, EncodingError> {
        rmp_serde::from_slice::<serde_json::Value>(bytes)
            .map(|v| Value::Json(JsonValue::from(v)))
            .map_err(|e| EncodingError::Codec {
                encoding: EncodingType::MessagePack.name(),
                reason: e.to_string(),
            })
    }

    fn encode(&self, document: &JsonValue) -> Result<Vec<u8>, EncodingError> {
        rmp_serde::to_vec(&**document).map_err(|e| EncodingError::Codec {
            encoding: EncodingType::MessagePack.name(),
            reason: e.to_string(),
        })
    }
}

/// Codec-registry backed serialization service.
///
/// Documents are encoded with the preferred encoding (JSON unless changed);
/// any registered encoding is accepted on decode.
pub struct ProtocolSerializationService {
    codecs: FxHashMap<EncodingType, Box<dyn Codec>>,
    document_encoding: EncodingType,
}

impl ProtocolSerializationService {
    /// Service with the JSON and MessagePack codecs registered.
    pub fn new() -> Self {
        Self::empty()
            .with_codec(JsonCodec)
            .with_codec(MessagePackCodec)
    }

    /// Service with no codecs: only scalars can be converted.
    pub fn empty() -> Self {
        Self {
            codecs: FxHashMap::default(),
            document_encoding: EncodingType::Json,
        }
    }

    /// Register a codec, replacing any codec for the same encoding.
    pub fn with_codec(mut self, codec: impl Codec + 'static) -> Self {
        self.codecs.insert(codec.encoding(), Box::new(codec));
        self
    }

    /// Encoding used when writing documents.
    pub fn with_document_encoding(mut self, encoding: EncodingType) -> Self {
        self.document_encoding = encoding;
        self
    }

    fn codec(&self, encoding: EncodingType) -> Result<&dyn Codec, EncodingError> {
        self.codecs
            .get(&encoding)
            .map(|c| c.as_ref())
            .ok_or(EncodingError::CodecNotRegistered(encoding.name()))
    }
}

impl Default for ProtocolSerializationService {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializationService for ProtocolSerializationService {
    fn decode(&self, encoded: &EncodedValue) -> Result<Value, EncodingError> {
        Ok(match encoded {
            EncodedValue::Null => Value::Null,
            EncodedValue::Bool(b) => Value::Bool(*b),
            EncodedValue::Int(n) => Value::Int(*n),
            EncodedValue::Long(n) => Value::Long(*n),
            EncodedValue::Double(n) => Value::Double(*n),
            EncodedValue::String(s) => Value::String(s.clone()),
            EncodedValue::Binary(b) => Value::Bytes(b.clone()),
            EncodedValue::Custom { encoding, bytes } => {
                let ty = EncodingType::from_tag(*encoding)
                    .ok_or(EncodingError::UnsupportedEncodingType(*encoding))?;
                return self.codec(ty)?.decode(bytes);
            }
        })
    }

    fn encode(&self, value: &Value) -> Result<EncodedValue, EncodingError> {
        Ok(match value {
            Value::Null => EncodedValue::Null,
            Value::Bool(b) => EncodedValue::Bool(*b),
            Value::Int(n) => EncodedValue::Int(*n),
            Value::Long(n) => EncodedValue::Long(*n),
            Value::Double(n) => EncodedValue::Double(*n),
            Value::String(s) => EncodedValue::String(s.clone()),
            Value::Bytes(b) => EncodedValue::Binary(b.clone()),
            Value::Json(doc) => {
                let codec = self.codec(self.document_encoding)?;
                EncodedValue::custom(self.document_encoding, codec.encode(doc)?)
            }
        })
    }
}
