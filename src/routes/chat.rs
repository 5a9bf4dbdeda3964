use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse, HealthResponse, iso_timestamp},
    services::relay::handle_chat,
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    // An unreadable body never reaches validation.
    let Json(payload) =
        payload.map_err(|rejection| AppError::internal(state.config.mode, rejection.body_text()))?;

    handle_chat(&state, payload).await.map(Json)
}

/// Liveness only; never touches the provider.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: iso_timestamp(),
    })
}
