use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ClipError;

/// Reference to a blob held by the upload store. The sync engine never
/// looks inside it.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// The shared clipboard value of a room.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClipPayload {
    Text { text: String },
    File { file: FileRef },
}

impl ClipPayload {
    pub fn text(text: impl Into<String>) -> Self {
        ClipPayload::Text { text: text.into() }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ClipPayload::Text { text } if text.is_empty())
    }

    /// Rejects inline text longer than `max_chars` characters.
    pub fn check_size(&self, max_chars: usize) -> Result<(), ClipError> {
        if let ClipPayload::Text { text } = self {
            // cheap byte bound first, chars are never more than bytes
            if text.len() > max_chars {
                let size = text.chars().count();
                if size > max_chars {
                    return Err(ClipError::PayloadTooLarge { size, limit: max_chars });
                }
            }
        }
        Ok(())
    }
}

impl Default for ClipPayload {
    fn default() -> Self {
        ClipPayload::text("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_payload_wire_shape() {
        let json = serde_json::to_value(ClipPayload::text("hello")).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "text", "text": "hello"}));
    }

    #[test]
    fn file_payload_wire_shape() {
        let raw = r#"{"kind":"file","file":{"id":"6f1c1f36-8a6a-4b7e-9f5b-2d3f4b5a6c7d","name":"a.txt","size":3,"mimeType":"text/plain","uploadedAt":"2026-01-01T00:00:00Z"}}"#;
        let payload: ClipPayload = serde_json::from_str(raw).unwrap();
        match payload {
            ClipPayload::File { file } => {
                assert_eq!(file.name, "a.txt");
                assert_eq!(file.mime_type, "text/plain");
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn size_bound_counts_characters() {
        // 4 chars, 8 bytes
        let payload = ClipPayload::text("ääää");
        assert!(payload.check_size(4).is_ok());
        assert_eq!(
            payload.check_size(3),
            Err(ClipError::PayloadTooLarge { size: 4, limit: 3 })
        );
    }

    #[test]
    fn default_is_empty_text() {
        assert!(ClipPayload::default().is_empty());
        assert!(!ClipPayload::text("x").is_empty());
    }
}
