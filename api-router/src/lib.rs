use api_state::ApiState;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
    Router,
};
use routes::{chain::answer_question, health::health, readiness::ready};

pub mod api_state;
pub mod error;
mod routes;

/// Router for the service's HTTP surface
pub fn api_routes<S>(app_state: &ApiState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route(
            "/chain",
            post(answer_question).layer(DefaultBodyLimit::max(
                app_state.config.chain_max_body_bytes,
            )),
        )
}
