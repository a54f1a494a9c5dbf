//! Note CRUD and the share-token lifecycle on top of a [`DocumentStore`].

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::entity::{Note, NoteInput};
use crate::error::{Result, SharenoteError};
use crate::storage::{DocumentId, DocumentStore, Filter, StoredDocument};

const SHARE_ID_FIELD: &str = "share_id";

/// Request-handling logic for notes.
///
/// Holds no mutable state of its own; cloning shares the store handle.
#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn DocumentStore>,
    share_base_url: Arc<str>,
}

impl NoteService {
    /// Wrap a store handle and register the unique `share_id` index.
    pub fn new(store: Arc<dyn DocumentStore>, share_base_url: &str) -> Result<Self> {
        store.ensure_unique_index(SHARE_ID_FIELD)?;
        Ok(Self {
            store,
            share_base_url: Arc::from(share_base_url),
        })
    }

    fn shape(&self, doc: &StoredDocument) -> Result<Note> {
        Note::from_document(doc, &self.share_base_url)
    }

    pub fn create(&self, input: &NoteInput) -> Result<Note> {
        let share_id = Uuid::new_v4().to_string();
        let mut fields = input.to_fields();
        fields.insert(SHARE_ID_FIELD.to_string(), Value::String(share_id));

        let id = self.store.insert_one(fields)?;
        debug!(%id, "Created note");

        let created = self
            .store
            .find_one(&Filter::ById(id))?
            .ok_or_else(|| SharenoteError::NoteNotFound(id.to_string()))?;
        self.shape(&created)
    }

    /// Every note as of the call, shaped as the cursor is consumed.
    pub fn list(&self) -> Result<impl Iterator<Item = Result<Note>> + '_> {
        let cursor = self.store.find_all()?;
        Ok(cursor.map(move |doc| self.shape(&doc)))
    }

    pub fn get(&self, id: &str) -> Result<Note> {
        let doc = self.find_by_id(id)?;
        self.shape(&doc)
    }

    pub fn update(&self, id: &str, input: &NoteInput) -> Result<Note> {
        let existing = self.find_by_id(id)?;

        let mut fields = input.to_fields();
        // A record without a token stays without one.
        if let Some(share_id) = existing.fields.get(SHARE_ID_FIELD) {
            fields.insert(SHARE_ID_FIELD.to_string(), share_id.clone());
        }

        if self.store.update_one(&existing.id, fields)? == 0 {
            return Err(SharenoteError::NoteNotFound(id.to_string()));
        }
        debug!(id = %existing.id, "Updated note");

        let updated = self
            .store
            .find_one(&Filter::ById(existing.id))?
            .ok_or_else(|| SharenoteError::NoteNotFound(id.to_string()))?;
        self.shape(&updated)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let doc_id = parse_id(id)?;
        if self.store.delete_one(&Filter::ById(doc_id))? == 0 {
            return Err(SharenoteError::NoteNotFound(id.to_string()));
        }
        debug!(id = %doc_id, "Deleted note");
        Ok(())
    }

    pub fn get_shared(&self, share_id: &str) -> Result<Note> {
        let doc = self
            .store
            .find_one(&Filter::field(SHARE_ID_FIELD, share_id))?
            .ok_or_else(|| SharenoteError::SharedNoteNotFound(share_id.to_string()))?;
        self.shape(&doc)
    }

    pub fn delete_shared(&self, share_id: &str) -> Result<()> {
        if self
            .store
            .delete_one(&Filter::field(SHARE_ID_FIELD, share_id))?
            == 0
        {
            return Err(SharenoteError::SharedNoteNotFound(share_id.to_string()));
        }
        debug!(share_id, "Deleted shared note");
        Ok(())
    }

    fn find_by_id(&self, id: &str) -> Result<StoredDocument> {
        let doc_id = parse_id(id)?;
        self.store
            .find_one(&Filter::ById(doc_id))?
            .ok_or_else(|| SharenoteError::NoteNotFound(id.to_string()))
    }
}

/// Malformed identifiers cannot name a stored note, so they are not found.
fn parse_id(id: &str) -> Result<DocumentId> {
    DocumentId::parse(id).ok_or_else(|| SharenoteError::NoteNotFound(id.to_string()))
}
