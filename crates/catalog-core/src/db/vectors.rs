//! Vector storage operations

use super::VectorStore;
use crate::error::Result;
use chrono::Utc;
use rusqlite::params;

impl VectorStore {
    /// Insert (or replace) the embedding for a document
    pub fn insert_embedding(&self, doc_id: &str, model: &str, embedding: &[f32]) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR REPLACE INTO embeddings (doc_id, model, embedding, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![doc_id, model, embedding_to_bytes(embedding), now],
        )?;
        Ok(())
    }

    /// Get every embedding produced by `model`
    pub fn all_embeddings(&self, model: &str) -> Result<Vec<(String, Vec<f32>)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT doc_id, embedding FROM embeddings WHERE model = ?1")?;

        let results = stmt
            .query_map(params![model], |row| {
                let doc_id: String = row.get(0)?;
                let embedding_bytes: Vec<u8> = row.get(1)?;
                Ok((doc_id, bytes_to_embedding(&embedding_bytes)))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(results)
    }

    /// Check if model dimensions are compatible with expected dimensions
    pub fn check_model_compatibility(&self, model: &str, expected_dims: usize) -> Result<bool> {
        match self.get_model_dimensions(model)? {
            Some(stored_dims) => Ok(stored_dims == expected_dims),
            None => Ok(true), // not registered yet
        }
    }

    /// Register model with its dimensions
    pub fn register_model(&self, model: &str, dimensions: usize) -> Result<()> {
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO model_metadata (model, dimensions, created_at, last_used_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(model) DO UPDATE SET last_used_at = ?3",
            params![model, dimensions as i64, now],
        )?;

        Ok(())
    }

    /// Get stored model dimensions
    pub fn get_model_dimensions(&self, model: &str) -> Result<Option<usize>> {
        let result = self.conn.query_row(
            "SELECT dimensions FROM model_metadata WHERE model = ?1",
            params![model],
            |row| row.get::<_, i64>(0),
        );

        match result {
            Ok(dims) => Ok(Some(dims as usize)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Convert f32 embedding to bytes (little-endian)
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes to f32 embedding
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Compute cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;

    #[test]
    fn test_embedding_bytes_are_little_endian() {
        let bytes = embedding_to_bytes(&[1.0, -2.5]);
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
        assert_eq!(bytes_to_embedding(&bytes), vec![1.0, -2.5]);
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-4);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-4);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_store_and_filter_by_model() {
        let store = VectorStore::open_in_memory().unwrap();
        let doc = Document::new("id: 1");
        store.insert_document(&doc).unwrap();
        store.insert_embedding(&doc.id, "mistral", &[0.5, 0.5]).unwrap();

        assert_eq!(
            store.all_embeddings("mistral").unwrap(),
            vec![(doc.id.clone(), vec![0.5, 0.5])]
        );
        assert!(store.all_embeddings("other").unwrap().is_empty());
        assert!(store.has_embedding(&doc.id, "mistral").unwrap());
        assert!(!store.has_embedding(&doc.id, "other").unwrap());
    }

    #[test]
    fn test_model_registration() {
        let store = VectorStore::open_in_memory().unwrap();
        assert!(store.check_model_compatibility("mistral", 4).unwrap());

        store.register_model("mistral", 4).unwrap();
        store.register_model("mistral", 4).unwrap();
        assert_eq!(store.get_model_dimensions("mistral").unwrap(), Some(4));
        assert!(store.check_model_compatibility("mistral", 4).unwrap());
        assert!(!store.check_model_compatibility("mistral", 8).unwrap());
    }
}
