// src/error.rs
//! Relay error taxonomy and its HTTP mapping.

use std::fmt::Display;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{config::DeploymentMode, message::ErrorResponse};

pub const MESSAGE_REQUIRED: &str = "Message is required";
pub const INVALID_API_KEY: &str = "Invalid API key";
pub const GENERIC_UPSTREAM: &str = "An error occurred while processing your request";
pub const GENERIC_INTERNAL: &str = "Internal server error";

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// No usable message; fixed by resubmitting with content.
    #[error("{0}")]
    Validation(String),

    /// The provider rejected our credential. Operators need to see this.
    #[error("Invalid API key")]
    Auth,

    /// Transient or provider-side failure.
    #[error("{message}")]
    Upstream {
        message: String,
        details: Option<String>,
    },

    #[error("Internal server error")]
    Internal { details: Option<String> },
}

impl AppError {
    pub fn message_required() -> Self {
        Self::Validation(MESSAGE_REQUIRED.to_string())
    }

    /// Logs the fault in full and keeps the detail for the client only in development.
    pub fn internal(mode: DeploymentMode, fault: impl Display) -> Self {
        tracing::error!(error = %fault, "internal fault");
        Self::Internal {
            details: (!mode.is_production()).then(|| fault.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Auth => StatusCode::UNAUTHORIZED,
            Self::Upstream { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(self) -> ErrorResponse {
        match self {
            Self::Validation(error) => ErrorResponse { error, details: None },
            Self::Auth => ErrorResponse { error: INVALID_API_KEY.to_string(), details: None },
            Self::Upstream { message, details } => ErrorResponse { error: message, details },
            Self::Internal { details } => ErrorResponse {
                error: GENERIC_INTERNAL.to_string(),
                details,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            // Already logged with its full detail by `AppError::internal`.
            Self::Internal { .. } => {}
            _ if status.is_client_error() => {
                tracing::warn!(status = status.as_u16(), error = %self, "client error")
            }
            _ => tracing::error!(status = status.as_u16(), error = %self, "server error"),
        }

        (status, Json(self.body())).into_response()
    }
}
