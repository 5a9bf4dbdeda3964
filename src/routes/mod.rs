// src/routes/mod.rs
pub mod chat;
pub mod cors;

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::state::SharedState;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use chat::{chat_handler, health_handler};
use cors::{cors_layer, reject_unlisted_preflight};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;

pub fn create_router(config: &RelayConfig) -> Router<SharedState> {
    let origins = Arc::new(config.allowed_origins.clone());

    Router::new()
        .route("/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(cors_layer(&origins))
        .layer(middleware::from_fn_with_state(origins, reject_unlisted_preflight))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
}
