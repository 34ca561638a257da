//! Document storage operations

use super::VectorStore;
use crate::corpus::Document;
use crate::error::Result;
use chrono::Utc;
use rusqlite::params;

impl VectorStore {
    /// Insert a document if not already stored. Returns true when new.
    pub fn insert_document(&self, doc: &Document) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let rows = self.conn.execute(
            "INSERT OR IGNORE INTO documents (id, content, created_at) VALUES (?1, ?2, ?3)",
            params![doc.id, doc.content, now],
        )?;
        Ok(rows > 0)
    }

    /// Get document by id
    pub fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let result = self.conn.query_row(
            "SELECT id, content FROM documents WHERE id = ?1",
            params![id],
            |row| {
                Ok(Document {
                    id: row.get(0)?,
                    content: row.get(1)?,
                })
            },
        );
        match result {
            Ok(doc) => Ok(Some(doc)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether `id` already has an embedding from `model`
    pub fn has_embedding(&self, id: &str, model: &str) -> Result<bool> {
        let found: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM embeddings WHERE doc_id = ?1 AND model = ?2",
            params![id, model],
            |row| row.get(0),
        )?;
        Ok(found)
    }
}
