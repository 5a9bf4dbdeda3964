// src/services/completion.rs
//! Completion-provider seam: request/response types and the provider trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// One outbound call: role-tagged messages plus generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<PromptMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Candidates in the order the provider returned them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub candidates: Vec<String>,
}

impl Completion {
    pub fn first_candidate(&self) -> Option<&str> {
        self.candidates.first().map(String::as_str)
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider rejected the credential: {0}")]
    Unauthorized(String),

    #[error("provider returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("provider did not respond before the deadline")]
    Timeout,

    #[error("could not reach provider: {0}")]
    Transport(String),

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("provider returned no candidates")]
    NoCandidates,
}

impl ProviderError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// HTTP status reported by the provider, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// External language-model completion API.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError>;
}
