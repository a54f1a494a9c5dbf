use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde_json::Value;
use tracing::debug;

use super::{Document, DocumentCursor, DocumentId, DocumentStore, Filter, StoredDocument};
use crate::error::{Result, SharenoteError};

struct Inner {
    conn: Connection,
    unique_fields: Vec<String>,
}

/// Document store persisted in a single SQLite table.
///
/// Bodies are stored as JSON text; field lookups go through `json_extract`.
pub struct SqliteStore {
    inner: Mutex<Inner>,
    collection: String,
}

impl SqliteStore {
    /// Open or create the database file and select `collection`.
    pub fn open(path: &Path, collection: &str) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn, collection)
    }

    /// Volatile database, dropped with the store.
    pub fn open_in_memory(collection: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, collection)
    }

    fn with_connection(conn: Connection, collection: &str) -> Result<Self> {
        check_identifier(collection)?;
        let store = Self {
            inner: Mutex::new(Inner {
                conn,
                unique_fields: Vec::new(),
            }),
            collection: collection.to_string(),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let inner = self.lock()?;

        // seq gives a stable iteration order
        inner.conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                id TEXT NOT NULL UNIQUE,
                body TEXT NOT NULL
            )",
            [],
        )?;
        inner.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection)",
            [],
        )?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| SharenoteError::Storage("sqlite connection lock poisoned".to_string()))
    }

    /// SQL predicate and its single bound parameter for `filter`.
    fn predicate(filter: &Filter) -> Result<(String, SqlValue)> {
        match filter {
            Filter::ById(id) => Ok(("id = ?2".to_string(), SqlValue::Text(id.to_string()))),
            // binds NULL, and `= NULL` is never true
            Filter::FieldEq(field, value) => {
                let path = json_path(field)?;
                Ok((format!("json_extract(body, '{path}') = ?2"), sql_value(value)))
            }
        }
    }

    fn duplicate_key(inner: &Inner, fields: &Document, err: rusqlite::Error) -> SharenoteError {
        let is_constraint = matches!(
            &err,
            rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
        );
        if !is_constraint {
            return err.into();
        }
        inner
            .unique_fields
            .iter()
            .find_map(|field| {
                fields.get(field).map(|value| SharenoteError::DuplicateKey {
                    field: field.clone(),
                    value: value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string()),
                })
            })
            .unwrap_or_else(|| err.into())
    }
}

impl DocumentStore for SqliteStore {
    fn insert_one(&self, fields: Document) -> Result<DocumentId> {
        let inner = self.lock()?;
        let id = DocumentId::new();
        let body = serde_json::to_string(&fields)?;

        inner
            .conn
            .execute(
                "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)",
                params![self.collection, id.to_string(), body],
            )
            .map_err(|e| Self::duplicate_key(&inner, &fields, e))?;

        debug!(collection = %self.collection, %id, "Inserted document");
        Ok(id)
    }

    fn find_one(&self, filter: &Filter) -> Result<Option<StoredDocument>> {
        let inner = self.lock()?;
        let (predicate, value) = Self::predicate(filter)?;
        let sql = format!(
            "SELECT id, body FROM documents WHERE collection = ?1 AND {predicate} ORDER BY seq LIMIT 1"
        );

        let row: Option<(String, String)> = inner
            .conn
            .query_row(&sql, params![self.collection, value], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()?;

        row.map(|(id, body)| parse_row(&id, &body)).transpose()
    }

    fn find_all(&self) -> Result<DocumentCursor> {
        let inner = self.lock()?;
        let mut stmt = inner
            .conn
            .prepare("SELECT id, body FROM documents WHERE collection = ?1 ORDER BY seq")?;

        let rows = stmt.query_map([&self.collection], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut docs = Vec::new();
        for row in rows {
            let (id, body) = row?;
            docs.push(parse_row(&id, &body)?);
        }
        Ok(DocumentCursor::new(docs))
    }

    fn update_one(&self, id: &DocumentId, fields: Document) -> Result<u64> {
        let inner = self.lock()?;
        let body: Option<String> = inner
            .conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                params![self.collection, id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(body) = body else {
            return Ok(0);
        };

        let mut merged = parse_row(&id.to_string(), &body)?.fields;
        merged.extend(fields);
        let new_body = serde_json::to_string(&merged)?;

        let changed = inner
            .conn
            .execute(
                "UPDATE documents SET body = ?1 WHERE collection = ?2 AND id = ?3",
                params![new_body, self.collection, id.to_string()],
            )
            .map_err(|e| Self::duplicate_key(&inner, &merged, e))?;

        Ok(changed as u64)
    }

    fn delete_one(&self, filter: &Filter) -> Result<u64> {
        let inner = self.lock()?;
        let (predicate, value) = Self::predicate(filter)?;
        let sql = format!(
            "DELETE FROM documents WHERE seq = (
                SELECT seq FROM documents WHERE collection = ?1 AND {predicate} ORDER BY seq LIMIT 1
            )"
        );

        let deleted = inner.conn.execute(&sql, params![self.collection, value])?;
        Ok(deleted as u64)
    }

    fn ensure_unique_index(&self, field: &str) -> Result<()> {
        let mut inner = self.lock()?;
        let path = json_path(field)?;
        let index = format!("idx_{}_{}_unique", self.collection, field);

        // NULLs are distinct in SQLite unique indexes, so documents without
        // the field never collide.
        inner.conn.execute(
            &format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {index}
                 ON documents(collection, json_extract(body, '{path}'))"
            ),
            [],
        )?;

        if !inner.unique_fields.iter().any(|f| f == field) {
            inner.unique_fields.push(field.to_string());
        }
        Ok(())
    }
}

fn parse_row(id: &str, body: &str) -> Result<StoredDocument> {
    let id = DocumentId::parse(id)
        .ok_or_else(|| SharenoteError::Storage(format!("corrupt document id: {id}")))?;
    match serde_json::from_str::<Value>(body)? {
        Value::Object(fields) => Ok(StoredDocument { id, fields }),
        _ => Err(SharenoteError::InvalidDocument(id.to_string())),
    }
}

/// Names are spliced into SQL text, so only plain identifiers are allowed.
fn check_identifier(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SharenoteError::Storage(format!("invalid identifier: {name:?}")))
    }
}

fn json_path(field: &str) -> Result<String> {
    check_identifier(field)?;
    Ok(format!("$.{field}"))
}

fn sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(*b as i64),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}
