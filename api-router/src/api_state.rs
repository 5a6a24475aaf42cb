use std::sync::Arc;

use common::{
    storage::{corpus::CorpusStore, db::SurrealDbClient},
    utils::config::AppConfig,
};
use rag_pipeline::GenerationPipeline;

/// Long-lived handles shared across all requests. Built once at startup and
/// injected; request handlers never construct their own clients.
#[derive(Clone)]
pub struct ApiState {
    pub db: Arc<SurrealDbClient>,
    pub corpus: Arc<dyn CorpusStore>,
    pub chain: Arc<dyn GenerationPipeline>,
    pub config: AppConfig,
}

impl ApiState {
    pub fn new(
        db: Arc<SurrealDbClient>,
        corpus: Arc<dyn CorpusStore>,
        chain: Arc<dyn GenerationPipeline>,
        config: AppConfig,
    ) -> Self {
        Self {
            db,
            corpus,
            chain,
            config,
        }
    }
}
