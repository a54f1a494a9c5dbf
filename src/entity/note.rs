// src/entity/note.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::validation::{MAX_CONTENT_SIZE, MAX_TITLE_LENGTH};
use crate::error::{Result, SharenoteError};
use crate::storage::{Document, StoredDocument};

/// A note as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Absent only on records written before share links existed
    pub share_id: Option<String>,
    pub share_url: Option<String>,
}

impl Note {
    /// Shape a stored document into its external form.
    ///
    /// `title` and `content` must be strings; `share_id` is optional and
    /// `share_url` is derived from it.
    pub fn from_document(doc: &StoredDocument, share_base_url: &str) -> Result<Self> {
        let id = doc.id.to_string();
        let title = string_field(&doc.fields, "title")
            .ok_or_else(|| SharenoteError::InvalidDocument(id.clone()))?;
        let content = string_field(&doc.fields, "content")
            .ok_or_else(|| SharenoteError::InvalidDocument(id.clone()))?;
        let share_id = string_field(&doc.fields, "share_id");
        let share_url = share_id
            .as_deref()
            .map(|share_id| share_url_for(share_base_url, share_id));

        Ok(Self {
            id,
            title,
            content,
            share_id,
            share_url,
        })
    }
}

fn string_field(fields: &Document, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Join the share base address and a token with exactly one `/`.
pub fn share_url_for(share_base_url: &str, share_id: &str) -> String {
    format!("{}/{}", share_base_url.trim_end_matches('/'), share_id)
}

fn required_string(
    body: &Document,
    field: &'static str,
) -> std::result::Result<String, ValidationError> {
    match body.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        None => Err(ValidationError {
            field,
            message: "Field required".to_string(),
            kind: "missing",
        }),
        Some(_) => Err(ValidationError {
            field,
            message: "Input should be a valid string".to_string(),
            kind: "string_type",
        }),
    }
}

/// Request body for creating or replacing a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteInput {
    pub title: String,
    pub content: String,
}

/// A single schema violation in a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
    pub kind: &'static str,
}

impl NoteInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Read `title` and `content` from a JSON object body, then validate.
    ///
    /// Errors name the offending field.
    pub fn from_json(body: &Document) -> std::result::Result<Self, ValidationError> {
        let input = Self {
            title: required_string(body, "title")?,
            content: required_string(body, "content")?,
        };
        input.validate()?;
        Ok(input)
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError {
                field: "title",
                message: "Title must not be empty".to_string(),
                kind: "string_too_short",
            });
        }
        let title_len = self.title.chars().count();
        if title_len > MAX_TITLE_LENGTH {
            return Err(ValidationError {
                field: "title",
                message: format!(
                    "Title too long: {} characters (max {})",
                    title_len, MAX_TITLE_LENGTH
                ),
                kind: "string_too_long",
            });
        }
        if self.content.is_empty() {
            return Err(ValidationError {
                field: "content",
                message: "Content must not be empty".to_string(),
                kind: "string_too_short",
            });
        }
        if self.content.len() > MAX_CONTENT_SIZE {
            return Err(ValidationError {
                field: "content",
                message: format!(
                    "Content too large: {} bytes (max {})",
                    self.content.len(),
                    MAX_CONTENT_SIZE
                ),
                kind: "string_too_long",
            });
        }
        Ok(())
    }

    /// Fields written to the store for this input.
    pub fn to_fields(&self) -> Document {
        let mut fields = Document::new();
        fields.insert("title".to_string(), Value::String(self.title.clone()));
        fields.insert("content".to_string(), Value::String(self.content.clone()));
        fields
    }
}
