use crate::{types::HealthResponse, AppState};
use axum::{extract::State, Json};

/// Liveness plus a summary of what is loaded.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let retriever = state.qa.retriever();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        chunks: retriever.store().len(),
        model: state.qa.llm().model_name().to_string(),
        embedding_model: retriever.embedder().model_name().to_string(),
    })
}
