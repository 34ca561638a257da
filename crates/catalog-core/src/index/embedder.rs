//! Ingest pipeline: store corpus documents and embed the ones still missing

use crate::corpus::Document;
use crate::db::VectorStore;
use crate::error::{CatalogError, Result};
use crate::llm::Embedder;
use std::collections::HashSet;

const BATCH_SIZE: usize = 32;

/// Ingest progress, emitted after each embedded batch
#[derive(Debug, Clone)]
pub struct IngestProgress {
    pub total: usize,
    pub embedded: usize,
}

/// Ingest statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct IngestStats {
    /// Blocks handed in, duplicates included
    pub total_documents: usize,
    pub duplicate_documents: usize,
    /// Documents not previously stored
    pub new_documents: usize,
    pub embedded_documents: usize,
    /// Already embedded with the same model
    pub skipped_documents: usize,
    pub dimensions: Option<usize>,
}

/// Progress callback
pub type IngestProgressFn<'a> = &'a (dyn Fn(IngestProgress) + Send + Sync);

/// Store `docs` and embed every one that lacks an embedding for the
/// embedder's model. Re-running over the same corpus is a no-op.
pub async fn ingest_documents(
    store: &VectorStore,
    embedder: &dyn Embedder,
    docs: &[Document],
    progress: Option<IngestProgressFn<'_>>,
) -> Result<IngestStats> {
    let mut stats = IngestStats {
        total_documents: docs.len(),
        ..Default::default()
    };

    if docs.is_empty() {
        return Ok(stats);
    }

    let model = embedder.model_name().to_string();
    let mut seen = HashSet::new();
    let mut pending: Vec<&Document> = Vec::new();

    for doc in docs {
        if !seen.insert(doc.id.as_str()) {
            stats.duplicate_documents += 1;
            continue;
        }
        if store.insert_document(doc)? {
            stats.new_documents += 1;
        }
        if store.has_embedding(&doc.id, &model)? {
            stats.skipped_documents += 1;
        } else {
            pending.push(doc);
        }
    }

    stats.dimensions = store.get_model_dimensions(&model)?;

    tracing::info!(
        "Embedding {} document(s) with {} ({} already embedded)",
        pending.len(),
        model,
        stats.skipped_documents
    );

    let total = pending.len();
    for batch in pending.chunks(BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(|d| d.content.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        if embeddings.len() != batch.len() {
            return Err(CatalogError::ExternalError(format!(
                "Embedder returned {} vectors for {} documents",
                embeddings.len(),
                batch.len()
            )));
        }

        for (doc, embedding) in batch.iter().zip(embeddings.iter()) {
            let dimensions = match stats.dimensions {
                Some(dims) if dims == embedding.len() => dims,
                Some(dims) => {
                    return Err(CatalogError::Config(format!(
                        "Model {} produced {} dimensions but the store holds {}-dimensional vectors for it",
                        model,
                        embedding.len(),
                        dims
                    )))
                }
                None => {
                    let dims = embedding.len();
                    if !store.check_model_compatibility(&model, dims)? {
                        return Err(CatalogError::Config(format!(
                            "Model {} dimension mismatch with stored embeddings",
                            model
                        )));
                    }
                    stats.dimensions = Some(dims);
                    dims
                }
            };

            store.register_model(&model, dimensions)?;
            store.insert_embedding(&doc.id, &model, embedding)?;
            stats.embedded_documents += 1;
        }

        tracing::debug!("Embedded {}/{} documents", stats.embedded_documents, total);
        if let Some(cb) = progress {
            cb(IngestProgress {
                total,
                embedded: stats.embedded_documents,
            });
        }
    }

    Ok(stats)
}


#[cfg(test)]
mod tests {
    use super::test_utils::BagOfWordsEmbedder;
    use super::*;
    use crate::corpus::split_blocks;
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;

    fn corpus(n: usize) -> Vec<Document> {
        let text: Vec<String> = (0..n)
            .map(|i| format!("id: {}\nname: Product {}\n---", i, i))
            .collect();
        split_blocks(&text.join("\n\n"))
    }

    #[tokio::test]
    async fn test_ingest_batches_and_is_idempotent() {
        let store = VectorStore::open_in_memory().unwrap();
        let embedder = BagOfWordsEmbedder::new(16);
        let docs = corpus(40);

        let events = Mutex::new(Vec::new());
        let record = |p: IngestProgress| events.lock().unwrap().push(p.embedded);
        let cb: IngestProgressFn<'_> = &record;

        let stats = ingest_documents(&store, &embedder, &docs, Some(cb)).await.unwrap();
        assert_eq!(stats.new_documents, 40);
        assert_eq!(stats.embedded_documents, 40);
        assert_eq!(stats.dimensions, Some(16));
        assert_eq!(embedder.batches.load(Ordering::SeqCst), 2);
        assert_eq!(*events.lock().unwrap(), vec![32, 40]);

        let again = ingest_documents(&store, &embedder, &docs, None).await.unwrap();
        assert_eq!(again.new_documents, 0);
        assert_eq!(again.embedded_documents, 0);
        assert_eq!(again.skipped_documents, 40);
        assert_eq!(embedder.batches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_duplicate_blocks_stored_once() {
        let store = VectorStore::open_in_memory().unwrap();
        let embedder = BagOfWordsEmbedder::new(8);
        let docs = split_blocks("id: 1\n---\nid: 1\n---\nid: 2\n---");

        let stats = ingest_documents(&store, &embedder, &docs, None).await.unwrap();
        assert_eq!(stats.total_documents, 3);
        assert_eq!(stats.duplicate_documents, 1);
        assert_eq!(stats.embedded_documents, 2);
        assert_eq!(store.stats().unwrap().document_count, 2);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_config_error() {
        let store = VectorStore::open_in_memory().unwrap();
        ingest_documents(&store, &BagOfWordsEmbedder::new(8), &corpus(1), None)
            .await
            .unwrap();

        let err = ingest_documents(&store, &BagOfWordsEmbedder::new(4), &corpus(3), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }

    #[tokio::test]
    async fn test_second_model_keeps_first_model_vectors() {
        let store = VectorStore::open_in_memory().unwrap();
        let docs = corpus(2);
        let first = BagOfWordsEmbedder {
            model: "a",
            ..BagOfWordsEmbedder::new(8)
        };
        let second = BagOfWordsEmbedder {
            model: "b",
            ..BagOfWordsEmbedder::new(4)
        };

        ingest_documents(&store, &first, &docs, None).await.unwrap();
        let stats = ingest_documents(&store, &second, &docs, None).await.unwrap();
        assert_eq!(stats.embedded_documents, 2);

        assert_eq!(store.all_embeddings("a").unwrap().len(), 2);
        assert_eq!(store.all_embeddings("b").unwrap().len(), 2);

        let again = ingest_documents(&store, &first, &docs, None).await.unwrap();
        assert_eq!(again.embedded_documents, 0);
        assert_eq!(again.skipped_documents, 2);

        let per_model: Vec<usize> = store
            .stats()
            .unwrap()
            .models
            .iter()
            .map(|m| m.embedded_count)
            .collect();
        assert_eq!(per_model, vec![2, 2]);
    }

    #[tokio::test]
    async fn test_empty_corpus_makes_no_calls() {
        let store = VectorStore::open_in_memory().unwrap();
        let embedder = BagOfWordsEmbedder::new(8);
        let stats = ingest_documents(&store, &embedder, &[], None).await.unwrap();
        assert_eq!(stats, IngestStats::default());
        assert_eq!(embedder.batches.load(Ordering::SeqCst), 0);
    }
}
