//! Request and response types shared by the dispatcher and transports

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Extra options forwarded verbatim as query parameters
pub type Params = Map<String, Value>;

/// Headers attached to a single request, in insertion order
pub type RequestHeaders = Vec<(String, String)>;

// =============================================================================
// Request payload
// =============================================================================

/// Binary part sent alongside the payload fields in multipart requests
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    /// Form field name
    pub field: String,
    /// File name reported to the server
    pub file_name: String,
    /// File contents
    pub content: Bytes,
}

impl FilePart {
    pub fn new(
        field: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// Structured request body
///
/// `fields` is passed through unmodified. `files` is only meaningful for
/// multipart requests (certificate registration).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub fields: Map<String, Value>,
    pub files: Vec<FilePart>,
}

impl Payload {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            files: Vec::new(),
        }
    }

    /// Add a field, replacing any previous value
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Attach a binary file part
    pub fn with_file(mut self, file: FilePart) -> Self {
        self.files.push(file);
        self
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

impl From<Value> for Payload {
    /// Objects become the field map; any other value is stored under `data`
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self::new(fields),
            Value::Null => Self::default(),
            other => {
                let mut fields = Map::new();
                fields.insert("data".to_string(), other);
                Self::new(fields)
            }
        }
    }
}

// =============================================================================
// Response envelope
// =============================================================================

/// Response body, either decoded JSON or the raw bytes
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Raw(Bytes),
}

impl ResponseBody {
    /// Decoded JSON body, if the request asked for one
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    /// Raw body bytes, if decoding was disabled
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Json(_) => None,
            Self::Raw(bytes) => Some(bytes),
        }
    }

    /// Body as JSON, parsing raw bytes when possible
    ///
    /// Raw endpoints still answer errors with a JSON document, so callers
    /// inspecting a failed raw response go through here.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Self::Json(value) => Some(value.clone()),
            Self::Raw(bytes) => serde_json::from_slice(bytes).ok(),
        }
    }
}

impl Serialize for ResponseBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Json(value) => value.serialize(serializer),
            Self::Raw(bytes) => serializer.serialize_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

/// Response returned by the base client, unchanged by the dispatcher
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "httpCode")]
    pub status: u16,
    pub body: ResponseBody,
    /// Response headers by lowercase name; repeated headers are joined with
    /// `", "` and values that are not UTF-8 are decoded lossily
    pub headers: BTreeMap<String, String>,
}

impl ResponseEnvelope {
    pub fn new(status: u16, body: ResponseBody) -> Self {
        Self {
            status,
            body,
            headers: BTreeMap::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Serialized form used as the error detail of last resort
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("HTTP {}", self.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_from_object() {
        let payload = Payload::from(json!({"serie": 1, "numero": 10}));
        assert_eq!(payload.fields.get("numero"), Some(&json!(10)));
        assert!(payload.files.is_empty());
    }

    #[test]
    fn test_payload_from_scalar() {
        let payload = Payload::from(json!("abc"));
        assert_eq!(payload.fields.get("data"), Some(&json!("abc")));
    }

    #[test]
    fn test_raw_body_to_json() {
        let body = ResponseBody::Raw(Bytes::from_static(br#"{"message":"x"}"#));
        assert_eq!(body.to_json(), Some(json!({"message": "x"})));

        let pdf = ResponseBody::Raw(Bytes::from_static(b"%PDF-1.4"));
        assert_eq!(pdf.to_json(), None);
    }

    #[test]
    fn test_envelope_serialization() {
        let envelope = ResponseEnvelope::new(500, ResponseBody::Json(json!({"foo": "bar"})));
        assert_eq!(
            envelope.to_json_string(),
            r#"{"httpCode":500,"body":{"foo":"bar"},"headers":{}}"#
        );
    }

    #[test]
    fn test_raw_envelope_serialization() {
        let envelope = ResponseEnvelope::new(200, ResponseBody::Raw(Bytes::from_static(b"<xml/>")));
        assert_eq!(
            envelope.to_json_string(),
            r#"{"httpCode":200,"body":"<xml/>","headers":{}}"#
        );
    }
}
