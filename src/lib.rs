//! Customer-support chat relay: forwards one user message to a completion
//! provider under a fixed persona and returns the first candidate.

pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;

use tracing_subscriber::{EnvFilter, fmt};

use config::DeploymentMode;

/// JSON lines in production, human-readable otherwise. `RUST_LOG` overrides the `info` default.
pub fn init_tracing(mode: DeploymentMode) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match mode {
        DeploymentMode::Production => fmt().json().with_env_filter(filter).init(),
        DeploymentMode::Development => fmt().with_env_filter(filter).init(),
    }
}
