use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::{
    error::AppError,
    storage::{
        db::SurrealDbClient,
        types::{corpus_entry::CorpusEntry, StoredObject},
    },
    utils::embedding::EmbeddingProvider,
};

/// The retrieval corpus as seen by the rest of the service. A trait seam so
/// request handlers and the generation pipeline can be tested against fakes.
#[async_trait]
pub trait CorpusStore: Send + Sync {
    /// Embed and durably store each text as a new corpus entry. Returns the
    /// stored entries once the write has been acknowledged.
    async fn add_documents(&self, texts: Vec<String>) -> Result<Vec<CorpusEntry>, AppError>;

    /// Nearest entries to the query text, closest first.
    async fn similar_entries(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CorpusEntry>, AppError>;
}

#[derive(Clone)]
pub struct SurrealCorpusStore {
    db: Arc<SurrealDbClient>,
    embeddings: Arc<EmbeddingProvider>,
}

impl SurrealCorpusStore {
    pub fn new(db: Arc<SurrealDbClient>, embeddings: Arc<EmbeddingProvider>) -> Self {
        Self { db, embeddings }
    }
}

#[async_trait]
impl CorpusStore for SurrealCorpusStore {
    async fn add_documents(&self, texts: Vec<String>) -> Result<Vec<CorpusEntry>, AppError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self.embeddings.embed_batch(texts.clone()).await?;
        if embeddings.len() != texts.len() {
            return Err(AppError::InternalError(format!(
                "embedding provider returned {} vectors for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }

        let mut stored = Vec::with_capacity(texts.len());
        for (text, embedding) in texts.into_iter().zip(embeddings) {
            let entry = CorpusEntry::new(text, embedding);
            let created = self.db.store_item(entry).await?.ok_or_else(|| {
                AppError::InternalError("corpus entry was not returned after create".to_string())
            })?;
            stored.push(created);
        }

        debug!(count = stored.len(), "Stored corpus entries");
        Ok(stored)
    }

    async fn similar_entries(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CorpusEntry>, AppError> {
        let embedding = self.embeddings.embed(query).await?;

        // KNN over the HNSW index, closest first
        let knn_query = format!(
            "SELECT *, vector::distance::knn() AS distance FROM {} WHERE embedding <|{},40|> $embedding ORDER BY distance",
            CorpusEntry::table_name(),
            limit.max(1)
        );

        let entries: Vec<CorpusEntry> = self
            .db
            .query(knn_query)
            .bind(("embedding", embedding))
            .await?
            .take(0)?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const TEST_DIMENSION: usize = 64;

    async fn setup_store() -> (Arc<SurrealDbClient>, SurrealCorpusStore) {
        let namespace = "test_ns";
        let database = &Uuid::new_v4().to_string();
        let db = Arc::new(
            SurrealDbClient::memory(namespace, database)
                .await
                .expect("Failed to start in-memory surrealdb"),
        );
        db.ensure_initialized(TEST_DIMENSION)
            .await
            .expect("Failed to initialize schema");

        let embeddings = Arc::new(
            EmbeddingProvider::new_hashed(TEST_DIMENSION).expect("Failed to create provider"),
        );
        let store = SurrealCorpusStore::new(db.clone(), embeddings);

        (db, store)
    }

    #[tokio::test]
    async fn test_add_documents_persists_entries() {
        let (db, store) = setup_store().await;

        let stored = store
            .add_documents(vec!["How are you".to_string(), "What is Rust".to_string()])
            .await
            .expect("Failed to add documents");
        assert_eq!(stored.len(), 2);

        let all = db
            .get_all_stored_items::<CorpusEntry>()
            .await
            .expect("Failed to fetch entries");
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|entry| entry.text == "How are you"));
        assert!(all.iter().any(|entry| entry.text == "What is Rust"));
    }

    #[tokio::test]
    async fn test_add_documents_with_no_texts_is_a_noop() {
        let (db, store) = setup_store().await;

        let stored = store
            .add_documents(Vec::new())
            .await
            .expect("Empty add should succeed");
        assert!(stored.is_empty());

        let all = db
            .get_all_stored_items::<CorpusEntry>()
            .await
            .expect("Failed to fetch entries");
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_similar_entries_ranks_exact_match_first() {
        let (_db, store) = setup_store().await;

        store
            .add_documents(vec![
                "the tokio runtime schedules async tasks".to_string(),
                "bread baking requires patient fermentation".to_string(),
            ])
            .await
            .expect("Failed to add documents");

        let results = store
            .similar_entries("the tokio runtime schedules async tasks", 2)
            .await
            .expect("Retrieval failed");

        assert!(!results.is_empty(), "Expected at least one result");
        assert_eq!(results[0].text, "the tokio runtime schedules async tasks");
    }
}
