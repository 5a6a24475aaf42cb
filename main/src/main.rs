use std::sync::Arc;

use api_router::{api_routes, api_state::ApiState};
use axum::Router;
use common::{
    storage::{
        corpus::{CorpusStore, SurrealCorpusStore},
        db::SurrealDbClient,
    },
    utils::{config::get_config, embedding::EmbeddingProvider},
};
use rag_pipeline::{ChainConfig, GenerationPipeline, RagChain};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get config
    let config = get_config()?;

    // Set up shared clients
    let db = Arc::new(
        SurrealDbClient::new(
            &config.surrealdb_address,
            &config.surrealdb_username,
            &config.surrealdb_password,
            &config.surrealdb_namespace,
            &config.surrealdb_database,
        )
        .await?,
    );

    let openai_client = Arc::new(async_openai::Client::with_config(
        async_openai::config::OpenAIConfig::new()
            .with_api_key(&config.openai_api_key)
            .with_api_base(&config.openai_base_url),
    ));

    let embedding_provider = Arc::new(EmbeddingProvider::from_config(
        &config,
        Some(openai_client.clone()),
    )?);
    info!(
        embedding_backend = embedding_provider.backend_label(),
        embedding_dimension = embedding_provider.dimension(),
        "Embedding provider initialized"
    );

    // Ensure db is initialized with an index matching the provider
    db.ensure_initialized(embedding_provider.dimension()).await?;

    let corpus: Arc<dyn CorpusStore> =
        Arc::new(SurrealCorpusStore::new(db.clone(), embedding_provider));
    let chain: Arc<dyn GenerationPipeline> = Arc::new(RagChain::new(
        corpus.clone(),
        openai_client,
        ChainConfig::from_app_config(&config),
    ));

    let api_state = ApiState::new(db, corpus, chain, config.clone());

    // Create Axum router
    let app = Router::new()
        .merge(api_routes(&api_state))
        .with_state(api_state);

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use common::{storage::types::corpus_entry::CorpusEntry, utils::config::AppConfig};
    use tower::ServiceExt;
    use uuid::Uuid;

    const TEST_DIMENSION: usize = 32;

    fn smoke_test_config(namespace: &str, database: &str) -> AppConfig {
        serde_json::from_value(serde_json::json!({
            "openai_api_key": "test-key",
            "surrealdb_address": "mem://",
            "surrealdb_username": "root",
            "surrealdb_password": "root",
            "surrealdb_namespace": namespace,
            "surrealdb_database": database,
            "http_port": 0,
            "openai_base_url": "https://example.com",
            "embedding_backend": "hashed",
            "embedding_dimensions": TEST_DIMENSION
        }))
        .expect("smoke test config should deserialize")
    }

    async fn smoke_app(config: &AppConfig) -> (Arc<SurrealDbClient>, Router) {
        let db = Arc::new(
            SurrealDbClient::memory(&config.surrealdb_namespace, &config.surrealdb_database)
                .await
                .expect("failed to start in-memory surrealdb"),
        );

        // Hashed embeddings keep the smoke test free of external dependencies
        let embedding_provider = Arc::new(
            EmbeddingProvider::new_hashed(TEST_DIMENSION)
                .expect("failed to create hashed embedding provider"),
        );
        db.ensure_initialized(embedding_provider.dimension())
            .await
            .expect("failed to initialize schema");

        let openai_client = Arc::new(async_openai::Client::with_config(
            async_openai::config::OpenAIConfig::new()
                .with_api_key(&config.openai_api_key)
                .with_api_base(&config.openai_base_url),
        ));

        let corpus: Arc<dyn CorpusStore> =
            Arc::new(SurrealCorpusStore::new(db.clone(), embedding_provider));
        let chain: Arc<dyn GenerationPipeline> = Arc::new(RagChain::new(
            corpus.clone(),
            openai_client,
            ChainConfig::from_app_config(config),
        ));

        let api_state = ApiState::new(db.clone(), corpus, chain, config.clone());

        let app = Router::new()
            .merge(api_routes(&api_state))
            .with_state(api_state);

        (db, app)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn smoke_startup_with_in_memory_surrealdb() {
        let namespace = "test_ns";
        let database = format!("test_db_{}", Uuid::new_v4());
        let config = smoke_test_config(namespace, &database);

        let (_db, app) = smoke_app(&config).await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::OK);

        let ready_response = app
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("ready response");
        assert_eq!(ready_response.status(), StatusCode::OK);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn smoke_invalid_chain_request_leaves_corpus_empty() {
        let namespace = "test_ns";
        let database = format!("test_db_{}", Uuid::new_v4());
        let config = smoke_test_config(namespace, &database);

        let (db, app) = smoke_app(&config).await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/chain")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert!(response.status().is_client_error());

        let entries = db
            .get_all_stored_items::<CorpusEntry>()
            .await
            .expect("failed to fetch entries");
        assert!(entries.is_empty());
    }
}
