use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ChainRequest {
    pub question: String,
}

/// Index the question in the corpus, then run the generation pipeline over
/// the corpus that now contains it. The write must be acknowledged before
/// generation starts; if it fails, the pipeline is never invoked. A committed
/// write is not rolled back when generation fails afterwards.
pub async fn answer_question(
    State(state): State<ApiState>,
    Json(input): Json<ChainRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if input.question.trim().is_empty() {
        return Err(ApiError::ValidationError(
            "question must not be empty".to_string(),
        ));
    }

    info!(
        question_bytes = input.question.len(),
        "Received chain request"
    );

    state
        .corpus
        .add_documents(vec![input.question.clone()])
        .await
        .map_err(ApiError::indexing)?;

    let answer = state
        .chain
        .invoke(&input.question)
        .await
        .map_err(ApiError::generation)?;

    Ok(Json(answer))
}
