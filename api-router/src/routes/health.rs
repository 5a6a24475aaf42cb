use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe: always returns 200 when the process can respond at all.
/// Deliberately consults neither the corpus store nor the generation pipeline,
/// so their outages never mask that the process itself is up.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "OK"})))
}
