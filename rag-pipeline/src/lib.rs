use std::sync::Arc;

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
    Client,
};
use async_trait::async_trait;
use common::{
    error::AppError,
    storage::{corpus::CorpusStore, types::corpus_entry::CorpusEntry},
    utils::config::AppConfig,
};
use serde_json::{json, Value};
use tracing::{debug, instrument};

const SYSTEM_PROMPT: &str = "You are a helpful assistant. Answer the user's question using the \
    provided context when it is relevant. If the context does not help, answer from general \
    knowledge.";

/// The generation side of the service. Implementations perform their own
/// retrieval against the corpus; callers only hand over the question. The
/// output is an opaque serializable value forwarded to the caller verbatim.
#[async_trait]
pub trait GenerationPipeline: Send + Sync {
    async fn invoke(&self, question: &str) -> Result<Value, AppError>;
}

#[derive(Clone, Debug)]
pub struct ChainConfig {
    pub chat_model: String,
    pub retrieval_limit: usize,
}

impl ChainConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            chat_model: config.chat_model.clone(),
            retrieval_limit: config.retrieval_limit,
        }
    }
}

/// Retrieval-augmented chain: embed the question, pull the nearest corpus
/// entries, then ask the chat model with that context inlined.
pub struct RagChain {
    corpus: Arc<dyn CorpusStore>,
    openai_client: Arc<Client<OpenAIConfig>>,
    config: ChainConfig,
}

impl RagChain {
    pub fn new(
        corpus: Arc<dyn CorpusStore>,
        openai_client: Arc<Client<OpenAIConfig>>,
        config: ChainConfig,
    ) -> Self {
        Self {
            corpus,
            openai_client,
            config,
        }
    }
}

pub fn create_user_message(context_json: &Value, question: &str) -> String {
    format!(
        r"
        Context Information:
        ==================
        {context_json}

        User Question:
        ==================
        {question}
        "
    )
}

/// Convert retrieved corpus entries to JSON format for LLM context
fn entries_to_chat_context(entries: &[CorpusEntry]) -> Value {
    json!(entries
        .iter()
        .map(|entry| {
            json!({
                "id": entry.id,
                "content": entry.text,
            })
        })
        .collect::<Vec<_>>())
}

fn extract_answer(response: CreateChatCompletionResponse) -> Result<String, AppError> {
    response
        .choices
        .first()
        .and_then(|choice| choice.message.content.clone())
        .ok_or(AppError::LLMParsing(
            "No content found in LLM response".into(),
        ))
}

#[async_trait]
impl GenerationPipeline for RagChain {
    #[instrument(skip_all)]
    async fn invoke(&self, question: &str) -> Result<Value, AppError> {
        let entries = self
            .corpus
            .similar_entries(question, self.config.retrieval_limit)
            .await?;
        debug!(retrieved = entries.len(), "Retrieved corpus context");

        let context = entries_to_chat_context(&entries);
        let user_message = create_user_message(&context, question);

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.chat_model)
            .messages([
                ChatCompletionRequestSystemMessage::from(SYSTEM_PROMPT).into(),
                ChatCompletionRequestUserMessage::from(user_message).into(),
            ])
            .build()?;

        let response = self.openai_client.chat().create(request).await?;
        let answer = extract_answer(response)?;

        Ok(json!({
            "answer": answer,
            "sources": entries.iter().map(|entry| entry.id.clone()).collect::<Vec<_>>(),
        }))
    }
}
