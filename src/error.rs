use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharenoteError {
    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Shared note not found: {0}")]
    SharedNoteNotFound(String),

    #[error("Invalid document {0}: missing or malformed required field")]
    InvalidDocument(String),

    #[error("Invalid input for '{field}': {message}")]
    InvalidInput { field: String, message: String },

    #[error("Duplicate value '{value}' for unique field '{field}'")]
    DuplicateKey { field: String, value: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SharenoteError {
    /// True for both lookup paths' not-found variants.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SharenoteError::NoteNotFound(_) | SharenoteError::SharedNoteNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SharenoteError>;
