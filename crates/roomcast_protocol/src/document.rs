//! The room document schema.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing or serializing a room document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document is not valid JSON or does not match the schema.
    #[error("malformed room document: {0}")]
    Malformed(String),

    /// The `room` field is empty.
    #[error("room name must be a non-empty string")]
    EmptyName,
}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        DocumentError::Malformed(err.to_string())
    }
}

/// A room document as supplied by publishers.
///
/// The schema is exactly two fields: `room` is the name the room is
/// published under, `data` is an opaque payload interpreted only by
/// consumers. Any other shape - missing fields, extra fields, a
/// non-string name - is rejected at parse time.
///
/// # Example
///
/// ```
/// use roomcast_protocol::RoomDocument;
///
/// let doc = RoomDocument::from_json(r#"{"room": "cave1", "data": [1, 2, 3]}"#).unwrap();
/// assert_eq!(doc.name(), "cave1");
///
/// assert!(RoomDocument::from_json(r#"{"room": "cave1"}"#).is_err());
/// assert!(RoomDocument::from_json(r#"{"room": 7, "data": null}"#).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomDocument {
    /// Name the room is published under, unique within an owner namespace.
    pub room: String,
    /// Opaque payload; the service never interprets it.
    pub data: serde_json::Value,
}

impl RoomDocument {
    /// Creates a document from its parts.
    pub fn new(room: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            room: room.into(),
            data,
        }
    }

    /// Parses a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Malformed`] if the text is not valid JSON
    /// or does not have exactly the `room` and `data` fields, and
    /// [`DocumentError::EmptyName`] if the room name is empty.
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        let document: Self = serde_json::from_str(text)?;
        if document.room.is_empty() {
            return Err(DocumentError::EmptyName);
        }
        Ok(document)
    }

    /// Serializes the document to JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Malformed`] if serialization fails.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Returns the room name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.room
    }
}
