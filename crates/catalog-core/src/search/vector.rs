//! Vector similarity search
//!
//! Computes cosine similarity between the query embedding and every stored
//! embedding of the same model.

use super::{SearchHit, SearchOptions};
use crate::db::{cosine_similarity, VectorStore};
use crate::error::Result;
use crate::llm::Embedder;

impl VectorStore {
    /// Perform vector similarity search
    pub async fn search_vec(
        &self,
        query: &str,
        embedder: &dyn Embedder,
        options: &SearchOptions,
    ) -> Result<Vec<SearchHit>> {
        let model = embedder.model_name();
        let stored_embeddings = self.all_embeddings(model)?;
        if stored_embeddings.is_empty() {
            tracing::warn!("No embeddings stored for model {}", model);
            return Ok(Vec::new());
        }

        let query_embedding = embedder.embed(query).await?;

        let mut similarities: Vec<(String, f32)> = stored_embeddings
            .iter()
            .map(|(doc_id, embedding)| (doc_id.clone(), cosine_similarity(&query_embedding, embedding)))
            .filter(|(_, score)| (*score as f64) >= options.min_score)
            .collect();

        similarities.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        let mut results = Vec::new();
        for (doc_id, score) in similarities.into_iter().take(options.limit) {
            if let Some(doc) = self.get_document(&doc_id)? {
                results.push(SearchHit {
                    name: doc.field("name").map(str::to_string),
                    doc_id: doc.id,
                    score: score as f64,
                    content: doc.content,
                });
            }
        }

        Ok(results)
    }
}

/// Rank stored documents against `query`
pub async fn search(
    store: &VectorStore,
    embedder: &dyn Embedder,
    query: &str,
    limit: usize,
    min_score: f64,
) -> Result<Vec<SearchHit>> {
    store
        .search_vec(query, embedder, &SearchOptions { limit, min_score })
        .await
}
