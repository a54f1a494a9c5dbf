mod note;

pub use note::{share_url_for, Note, NoteInput, ValidationError};

/// Input limits enforced by the request schema.
pub mod validation {
    pub const MAX_TITLE_LENGTH: usize = 500;
    pub const MAX_CONTENT_SIZE: usize = 102_400; // 100KB
}
