//! Store statistics

use super::VectorStore;
use crate::error::Result;

/// Registered embedding model
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelInfo {
    pub model: String,
    pub dimensions: usize,
    /// Documents embedded with this model
    pub embedded_count: usize,
    pub last_used_at: String,
}

/// Store stats
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoreStats {
    pub document_count: usize,
    /// Documents embedded with at least one model
    pub embedded_count: usize,
    pub pending_embedding: usize,
    pub models: Vec<ModelInfo>,
}

impl VectorStore {
    /// Get store statistics
    pub fn stats(&self) -> Result<StoreStats> {
        let document_count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;

        let embedded_count: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT doc_id) FROM embeddings",
            [],
            |row| row.get(0),
        )?;

        let mut stmt = self.conn.prepare(
            "SELECT m.model, m.dimensions, m.last_used_at,
                    (SELECT COUNT(*) FROM embeddings e WHERE e.model = m.model)
             FROM model_metadata m ORDER BY m.model",
        )?;
        let models = stmt
            .query_map([], |row| {
                Ok(ModelInfo {
                    model: row.get(0)?,
                    dimensions: row.get::<_, i64>(1)? as usize,
                    last_used_at: row.get(2)?,
                    embedded_count: row.get::<_, i64>(3)? as usize,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(StoreStats {
            document_count: document_count as usize,
            embedded_count: embedded_count as usize,
            pending_embedding: (document_count - embedded_count).max(0) as usize,
            models,
        })
    }
}
