// src/services/relay.rs
//! The chat relay: validate, call the provider once, normalize the reply.

use tracing::{error, info};

use super::completion::{CompletionRequest, ProviderError, PromptMessage};
use crate::{
    config::{DeploymentMode, ProviderSettings},
    error::{AppError, AppResult, GENERIC_UPSTREAM},
    message::{ChatRequest, ChatResponse, iso_timestamp},
    state::AppState,
};

/// System instruction first, then the single user message.
pub fn build_completion_request(
    settings: &ProviderSettings,
    system_instruction: &str,
    message: &str,
) -> CompletionRequest {
    CompletionRequest {
        model: settings.model.clone(),
        messages: vec![
            PromptMessage::system(system_instruction),
            PromptMessage::user(message),
        ],
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
    }
}

pub fn classify_provider_error(mode: DeploymentMode, err: &ProviderError) -> AppError {
    if err.is_unauthorized() {
        return AppError::Auth;
    }

    if mode.is_production() {
        return AppError::Upstream {
            message: GENERIC_UPSTREAM.to_string(),
            details: None,
        };
    }

    let details = match err {
        ProviderError::Status { status, .. } => Some(format!("provider status {status}")),
        ProviderError::Malformed(_) => Some("provider response could not be decoded".to_string()),
        _ => None,
    };
    AppError::Upstream {
        message: err.to_string(),
        details,
    }
}

/// Handles one chat turn. No state survives the call.
pub async fn handle_chat(state: &AppState, request: ChatRequest) -> AppResult<ChatResponse> {
    let message = request.trimmed_message().ok_or_else(AppError::message_required)?;

    let outbound = build_completion_request(
        &state.config.provider,
        &state.system_instruction,
        message,
    );

    info!(
        provider = state.provider.name(),
        model = %outbound.model,
        chars = message.chars().count(),
        "relaying chat message"
    );

    let completion = match state.provider.complete(&outbound).await {
        Ok(completion) => completion,
        Err(err) => {
            error!(
                provider = state.provider.name(),
                status = ?err.status(),
                message = %err,
                "completion provider error"
            );
            return Err(classify_provider_error(state.config.mode, &err));
        }
    };

    let Some(text) = completion.first_candidate() else {
        let err = ProviderError::NoCandidates;
        error!(provider = state.provider.name(), message = %err, "completion provider error");
        return Err(classify_provider_error(state.config.mode, &err));
    };

    Ok(ChatResponse {
        message: text.to_string(),
        timestamp: iso_timestamp(),
    })
}
