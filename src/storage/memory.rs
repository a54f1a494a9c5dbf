use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use super::{Document, DocumentCursor, DocumentId, DocumentStore, Filter, StoredDocument};
use crate::error::{Result, SharenoteError};

#[derive(Default)]
struct Collection {
    docs: Vec<StoredDocument>,
    unique_fields: Vec<String>,
}

impl Collection {
    /// Fail if `fields` would collide with another document on a unique field.
    fn check_unique(&self, fields: &Document, skip: Option<&DocumentId>) -> Result<()> {
        for field in &self.unique_fields {
            let value = match fields.get(field) {
                Some(Value::Null) | None => continue,
                Some(value) => value,
            };
            let taken = self
                .docs
                .iter()
                .filter(|doc| Some(&doc.id) != skip)
                .any(|doc| doc.fields.get(field) == Some(value));
            if taken {
                return Err(SharenoteError::DuplicateKey {
                    field: field.clone(),
                    value: display_value(value),
                });
            }
        }
        Ok(())
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// In-process document store, kept in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collection>> {
        self.inner
            .read()
            .map_err(|_| SharenoteError::Storage("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collection>> {
        self.inner
            .write()
            .map_err(|_| SharenoteError::Storage("memory store lock poisoned".to_string()))
    }
}

impl DocumentStore for MemoryStore {
    fn insert_one(&self, fields: Document) -> Result<DocumentId> {
        let mut collection = self.write()?;
        collection.check_unique(&fields, None)?;

        let id = DocumentId::new();
        collection.docs.push(StoredDocument { id, fields });
        Ok(id)
    }

    fn find_one(&self, filter: &Filter) -> Result<Option<StoredDocument>> {
        let collection = self.read()?;
        Ok(collection.docs.iter().find(|doc| doc.matches(filter)).cloned())
    }

    fn find_all(&self) -> Result<DocumentCursor> {
        let collection = self.read()?;
        Ok(DocumentCursor::new(collection.docs.clone()))
    }

    fn update_one(&self, id: &DocumentId, fields: Document) -> Result<u64> {
        let mut collection = self.write()?;
        let Some(pos) = collection.docs.iter().position(|doc| doc.id == *id) else {
            return Ok(0);
        };

        let mut merged = collection.docs[pos].fields.clone();
        merged.extend(fields);
        collection.check_unique(&merged, Some(id))?;

        collection.docs[pos].fields = merged;
        Ok(1)
    }

    fn delete_one(&self, filter: &Filter) -> Result<u64> {
        let mut collection = self.write()?;
        match collection.docs.iter().position(|doc| doc.matches(filter)) {
            Some(pos) => {
                collection.docs.remove(pos);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn ensure_unique_index(&self, field: &str) -> Result<()> {
        let mut collection = self.write()?;
        if !collection.unique_fields.iter().any(|f| f == field) {
            collection.unique_fields.push(field.to_string());
        }
        Ok(())
    }
}
