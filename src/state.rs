// src/state.rs
use std::sync::Arc;

use crate::config::RelayConfig;
use crate::services::completion::CompletionProvider;

pub type SharedState = Arc<AppState>;

/// Read-only after startup; shared by every request.
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub provider: Arc<dyn CompletionProvider>,
    pub system_instruction: String,
}

impl AppState {
    pub fn new(config: RelayConfig, provider: Arc<dyn CompletionProvider>) -> Self {
        let system_instruction = config.system_instruction();
        Self {
            config: Arc::new(config),
            provider,
            system_instruction,
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }
}
