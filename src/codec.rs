//! Metadata codec
//!
//! Callers attach an opaque JSON object to every log entry. It arrives as a
//! string, is kept as a structured document while it moves through storage,
//! and leaves again as a string. Only objects are accepted at the top level.

use serde_json::{Map, Value};
use thiserror::Error;

/// Structured metadata document (string keys, arbitrary JSON values)
pub type Document = Map<String, Value>;

/// Errors produced while decoding caller metadata
#[derive(Debug, Error)]
pub enum CodecError {
    /// The payload is not syntactically valid JSON
    #[error("metadata is not valid JSON: {0}")]
    InvalidFormat(#[from] serde_json::Error),

    /// The payload is valid JSON but its top level is not an object
    #[error("metadata must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },
}

/// Parse a metadata string into a document
///
/// # Example
///
/// ```
/// use analytics_service::codec::decode_metadata;
///
/// let doc = decode_metadata(r#"{"order_id": 42}"#).unwrap();
/// assert_eq!(doc["order_id"], 42);
/// assert!(decode_metadata("[1, 2]").is_err());
/// ```
pub fn decode_metadata(raw: &str) -> Result<Document, CodecError> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        other => Err(CodecError::NotAnObject {
            found: json_type_name(&other),
        }),
    }
}

/// Serialize a document back to its compact JSON string form
pub fn encode_metadata(doc: &Document) -> String {
    // Display on Value is infallible for maps with string keys
    Value::Object(doc.clone()).to_string()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
