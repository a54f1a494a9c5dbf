//! Document store abstraction.
//!
//! Notes are persisted as schemaless JSON documents in a collection. The
//! [`DocumentStore`] trait is the only contract the service depends on, so a
//! store handle can be swapped for tests or deployment.

mod memory;
mod sqlite_store;

pub use memory::MemoryStore;
pub use sqlite_store::SqliteStore;

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::Result;

/// Raw document body. The identifier lives outside it, in [`StoredDocument`].
pub type Document = Map<String, Value>;

/// Store-assigned document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an externally supplied identifier; `None` when malformed.
    ///
    /// Only the lowercase hyphenated form the store renders is accepted, so
    /// each note is reachable under exactly one id string.
    pub fn parse(s: &str) -> Option<Self> {
        let id: Self = s.parse().ok()?;
        (id.to_string() == s).then_some(id)
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A document together with its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub fields: Document,
}

impl StoredDocument {
    fn matches(&self, filter: &Filter) -> bool {
        match filter {
            Filter::ById(id) => self.id == *id,
            Filter::FieldEq(_, Value::Null) => false,
            Filter::FieldEq(field, value) => self.fields.get(field) == Some(value),
        }
    }
}

/// Selector for single-document operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    ById(DocumentId),
    /// Top-level field equality. A `null` value matches nothing.
    FieldEq(String, Value),
}

impl Filter {
    pub fn field(field: &str, value: impl Into<Value>) -> Self {
        Filter::FieldEq(field.to_string(), value.into())
    }
}

/// Iterator over a collection, consumed once.
///
/// The documents are a snapshot read in full when the query runs; later
/// writes are not visible through an open cursor.
pub struct DocumentCursor {
    inner: std::vec::IntoIter<StoredDocument>,
}

impl DocumentCursor {
    pub(crate) fn new(docs: Vec<StoredDocument>) -> Self {
        Self {
            inner: docs.into_iter(),
        }
    }
}

impl Iterator for DocumentCursor {
    type Item = StoredDocument;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// A collection of JSON documents.
///
/// Implementations must be safe to share between concurrently running
/// requests.
pub trait DocumentStore: Send + Sync {
    /// Insert a document and return the identifier the store assigned.
    fn insert_one(&self, fields: Document) -> Result<DocumentId>;

    /// First document matching `filter`, if any.
    fn find_one(&self, filter: &Filter) -> Result<Option<StoredDocument>>;

    /// Snapshot of every document in store iteration order.
    fn find_all(&self) -> Result<DocumentCursor>;

    /// Replace the given top-level fields of one document, keeping the rest.
    /// Returns the number of matched documents.
    fn update_one(&self, id: &DocumentId, fields: Document) -> Result<u64>;

    /// Delete at most one document. Returns the number deleted.
    fn delete_one(&self, filter: &Filter) -> Result<u64>;

    /// Reject writes that would give two documents the same non-null `field`.
    fn ensure_unique_index(&self, field: &str) -> Result<()>;
}
