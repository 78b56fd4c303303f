//! Request and response messages.
//!
//! A [`Request`] is a closed tagged union over the operation kinds this
//! server understands. Anything a newer client sends that this build does not
//! know decodes as [`Request::Unrecognized`], so dispatch can answer with
//! `UNSUPPORTED_OPERATION` instead of failing to parse.

use cinder_core::ErrorResponse;
use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::encoded::EncodedValue;

// =============================================================================
// Shared shapes
// =============================================================================

/// A key with its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Encoded key
    pub key: EncodedValue,
    /// Encoded value
    pub value: EncodedValue,
}

/// A per-item failure inside a bulk response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedError {
    /// The key exactly as the client sent it
    pub key: EncodedValue,
    /// Why this key failed
    pub error: ErrorResponse,
}

/// A cache server reachable by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Host name
    pub hostname: String,
    /// Client port
    pub port: u16,
}

// =============================================================================
// Region operations
// =============================================================================

/// Read one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetRequest {
    /// Region name
    pub region: String,
    /// Key to read
    pub key: EncodedValue,
}

/// Value read by [`GetRequest`]; `Null` if absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetResponse {
    /// Encoded value
    pub result: EncodedValue,
}

/// Write one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutRequest {
    /// Region name
    pub region: String,
    /// Entry to store
    pub entry: Entry,
}

/// Acknowledgement of [`PutRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutResponse {}

/// Read many keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetAllRequest {
    /// Region name
    pub region: String,
    /// Keys to read
    pub keys: Vec<EncodedValue>,
}

/// Successful entries and per-key failures side by side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetAllResponse {
    /// Keys read successfully
    pub entries: Vec<Entry>,
    /// Keys that failed
    pub failures: Vec<KeyedError>,
}

/// Write many entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutAllRequest {
    /// Region name
    pub region: String,
    /// Entries to store
    pub entries: Vec<Entry>,
}

/// Entries that could not be stored; empty when all succeeded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PutAllResponse {
    /// Keys that failed
    pub failed_keys: Vec<KeyedError>,
}

/// Remove one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveRequest {
    /// Region name
    pub region: String,
    /// Key to remove
    pub key: EncodedValue,
}

/// Acknowledgement of [`RemoveRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveResponse {}

/// List region names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRegionNamesRequest {}

/// Region names known to the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRegionNamesResponse {
    /// Region names, sorted
    pub regions: Vec<String>,
}

// =============================================================================
// Locator operations
// =============================================================================

/// Ask a locator for live servers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAvailableServersRequest {}

/// Live servers, possibly none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAvailableServersResponse {
    /// One entry per live server
    pub servers: Vec<Server>,
}

// =============================================================================
// Authentication handshake
// =============================================================================

/// Username/password handshake message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleAuthenticationRequest {
    /// User name
    pub username: String,
    /// Password
    pub password: String,
}

/// Handshake outcome written back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleAuthenticationResponse {
    /// Whether the credentials were accepted
    pub authenticated: bool,
}

// =============================================================================
// Envelopes
// =============================================================================

/// Discriminant of a request: one per supported operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequestKind {
    /// [`GetRequest`]
    Get,
    /// [`PutRequest`]
    Put,
    /// [`GetAllRequest`]
    GetAll,
    /// [`PutAllRequest`]
    PutAll,
    /// [`RemoveRequest`]
    Remove,
    /// [`GetRegionNamesRequest`]
    GetRegionNames,
    /// [`GetAvailableServersRequest`]
    GetAvailableServers,
}

impl RequestKind {
    /// Every kind this build supports.
    pub const ALL: [RequestKind; 7] = [
        RequestKind::Get,
        RequestKind::Put,
        RequestKind::GetAll,
        RequestKind::PutAll,
        RequestKind::Remove,
        RequestKind::GetRegionNames,
        RequestKind::GetAvailableServers,
    ];

    /// The kind whose wire tag is `name`.
    pub fn from_name(name: &str) -> Option<RequestKind> {
        RequestKind::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Name used in logs and as the wire tag.
    pub fn name(self) -> &'static str {
        match self {
            RequestKind::Get => "Get",
            RequestKind::Put => "Put",
            RequestKind::GetAll => "GetAll",
            RequestKind::PutAll => "PutAll",
            RequestKind::Remove => "Remove",
            RequestKind::GetRegionNames => "GetRegionNames",
            RequestKind::GetAvailableServers => "GetAvailableServers",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A client request.
///
/// Encoded as `{ type, payload }`. Decoding is hand-written so that an unknown
/// `type` skips whatever payload accompanies it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum Request {
    /// Read one key
    Get(GetRequest),
    /// Write one entry
    Put(PutRequest),
    /// Read many keys
    GetAll(GetAllRequest),
    /// Write many entries
    PutAll(PutAllRequest),
    /// Remove one key
    Remove(RemoveRequest),
    /// List regions
    GetRegionNames(GetRegionNamesRequest),
    /// Locate servers
    GetAvailableServers(GetAvailableServersRequest),
    /// A request type this build does not know.
    Unrecognized,
}

impl Request {
    /// The request's discriminant, or `None` for [`Request::Unrecognized`].
    pub fn kind(&self) -> Option<RequestKind> {
        Some(match self {
            Request::Get(_) => RequestKind::Get,
            Request::Put(_) => RequestKind::Put,
            Request::GetAll(_) => RequestKind::GetAll,
            Request::PutAll(_) => RequestKind::PutAll,
            Request::Remove(_) => RequestKind::Remove,
            Request::GetRegionNames(_) => RequestKind::GetRegionNames,
            Request::GetAvailableServers(_) => RequestKind::GetAvailableServers,
            Request::Unrecognized => return None,
        })
    }

    /// The region a region-scoped request targets.
    pub fn region(&self) -> Option<&str> {
        match self {
            Request::Get(r) => Some(&r.region),
            Request::Put(r) => Some(&r.region),
            Request::GetAll(r) => Some(&r.region),
            Request::PutAll(r) => Some(&r.region),
            Request::Remove(r) => Some(&r.region),
            Request::GetRegionNames(_)
            | Request::GetAvailableServers(_)
            | Request::Unrecognized => None,
        }
    }
}

// =============================================================================
// Request decoding
// =============================================================================

const REQUEST_FIELDS: &[&str] = &["type", "payload"];

enum RequestField {
    Type,
    Payload,
    Other,
}

impl<'de> Deserialize<'de> for RequestField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldVisitor;

        impl<'de> Visitor<'de> for FieldVisitor {
            type Value = RequestField;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a request envelope field")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<RequestField, E> {
                Ok(match v {
                    "type" => RequestField::Type,
                    "payload" => RequestField::Payload,
                    _ => RequestField::Other,
                })
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<RequestField, E> {
                match std::str::from_utf8(v) {
                    Ok(s) => self.visit_str(s),
                    Err(_) => Ok(RequestField::Other),
                }
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<RequestField, E> {
                Ok(match v {
                    0 => RequestField::Type,
                    1 => RequestField::Payload,
                    _ => RequestField::Other,
                })
            }
        }

        deserializer.deserialize_identifier(FieldVisitor)
    }
}

/// The `type` of an envelope. Unknown names are not an error.
#[derive(Clone, Copy)]
enum RequestTag {
    Known(RequestKind),
    Unknown,
}

impl<'de> Deserialize<'de> for RequestTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TagVisitor;

        impl<'de> Visitor<'de> for TagVisitor {
            type Value = RequestTag;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a request type name or index")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<RequestTag, E> {
                Ok(RequestKind::from_name(v).map_or(RequestTag::Unknown, RequestTag::Known))
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<RequestTag, E> {
                match std::str::from_utf8(v) {
                    Ok(s) => self.visit_str(s),
                    Err(_) => Ok(RequestTag::Unknown),
                }
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<RequestTag, E> {
                let kind = usize::try_from(v)
                    .ok()
                    .and_then(|i| RequestKind::ALL.get(i).copied());
                Ok(kind.map_or(RequestTag::Unknown, RequestTag::Known))
            }
        }

        deserializer.deserialize_identifier(TagVisitor)
    }
}

/// Decodes the payload of a known kind.
struct PayloadSeed(RequestKind);

impl<'de> DeserializeSeed<'de> for PayloadSeed {
    type Value = Request;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Request, D::Error> {
        Ok(match self.0 {
            RequestKind::Get => Request::Get(GetRequest::deserialize(deserializer)?),
            RequestKind::Put => Request::Put(PutRequest::deserialize(deserializer)?),
            RequestKind::GetAll => Request::GetAll(GetAllRequest::deserialize(deserializer)?),
            RequestKind::PutAll => Request::PutAll(PutAllRequest::deserialize(deserializer)?),
            RequestKind::Remove => Request::Remove(RemoveRequest::deserialize(deserializer)?),
            RequestKind::GetRegionNames => {
                Request::GetRegionNames(GetRegionNamesRequest::deserialize(deserializer)?)
            }
            RequestKind::GetAvailableServers => {
                Request::GetAvailableServers(GetAvailableServersRequest::deserialize(deserializer)?)
            }
        })
    }
}

struct RequestVisitor;

impl<'de> Visitor<'de> for RequestVisitor {
    type Value = Request;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a request envelope")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Request, A::Error> {
        let mut tag: Option<RequestTag> = None;
        let mut request: Option<Request> = None;
        // Payload seen before its tag; decoded once the tag arrives.
        let mut buffered: Option<serde_json::Value> = None;

        while let Some(field) = map.next_key::<RequestField>()? {
            match field {
                RequestField::Type => {
                    if tag.is_some() {
                        return Err(de::Error::duplicate_field("type"));
                    }
                    tag = Some(map.next_value()?);
                }
                RequestField::Payload => match tag {
                    Some(RequestTag::Known(kind)) => {
                        request = Some(map.next_value_seed(PayloadSeed(kind))?);
                    }
                    Some(RequestTag::Unknown) => {
                        map.next_value::<IgnoredAny>()?;
                    }
                    None => buffered = Some(map.next_value()?),
                },
                RequestField::Other => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        match tag.ok_or_else(|| <A::Error as de::Error>::missing_field("type"))? {
            RequestTag::Unknown => Ok(Request::Unrecognized),
            RequestTag::Known(kind) => match (request, buffered) {
                (Some(request), _) => Ok(request),
                (None, Some(payload)) => PayloadSeed(kind)
                    .deserialize(payload)
                    .map_err(de::Error::custom),
                (None, None) => Err(de::Error::missing_field("payload")),
            },
        }
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Request, A::Error> {
        let tag: RequestTag = seq
            .next_element()?
            .ok_or_else(|| <A::Error as de::Error>::invalid_length(0, &self))?;
        match tag {
            RequestTag::Known(kind) => seq
                .next_element_seed(PayloadSeed(kind))?
                .ok_or_else(|| de::Error::invalid_length(1, &self)),
            RequestTag::Unknown => {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(Request::Unrecognized)
            }
        }
    }
}

impl<'de> Deserialize<'de> for Request {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_struct("Request", REQUEST_FIELDS, RequestVisitor)
    }
}

/// A server response: one success payload per operation kind, or an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Response {
    /// Result of a get
    Get(GetResponse),
    /// Result of a put
    Put(PutResponse),
    /// Result of a bulk get
    GetAll(GetAllResponse),
    /// Result of a bulk put
    PutAll(PutAllResponse),
    /// Result of a remove
    Remove(RemoveResponse),
    /// Result of a region listing
    GetRegionNames(GetRegionNamesResponse),
    /// Result of server discovery
    GetAvailableServers(GetAvailableServersResponse),
    /// Classified failure
    Error(ErrorResponse),
}

impl Response {
    /// The error payload, if this is an error response.
    pub fn error(&self) -> Option<&ErrorResponse> {
        match self {
            Response::Error(e) => Some(e),
            _ => None,
        }
    }
}
