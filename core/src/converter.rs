//! `DocumentConverter`: turns a typed probe into a raw [`Document`].
//!
//! The converter decides field names. With [`JsonConverter`] those are serde's
//! names, so `#[serde(rename = "...")]` is how a property's field name comes to
//! differ from its logical name.

use crate::document::Document;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while converting a probe into a document.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The value could not be serialized.
    #[error("probe could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The value serialized to something other than an object.
    #[error("probe serialized to {kind}, expected an object")]
    NotADocument {
        /// JSON kind the value serialized to.
        kind: &'static str,
    },
}

/// Converts arbitrary serializable values into documents.
///
/// Implementations must be deterministic and side-effect free, and must key the
/// resulting document by field name.
pub trait DocumentConverter: Send + Sync {
    /// Convert `value` into a document.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if the value cannot be represented as a document.
    fn to_document<T: Serialize + ?Sized>(&self, value: &T) -> Result<Document, ConversionError>;
}

/// The default converter, backed by `serde_json`.
///
/// Enums serialize the way serde derives them; `Option::None` becomes `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConverter;

impl DocumentConverter for JsonConverter {
    fn to_document<T: Serialize + ?Sized>(&self, value: &T) -> Result<Document, ConversionError> {
        match serde_json::to_value(value)? {
            Value::Object(document) => Ok(document),
            other => Err(ConversionError::NotADocument {
                kind: kind_of(&other),
            }),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
