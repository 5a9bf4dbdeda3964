use anyhow::Context;
use support_relay::{
    config::{DeploymentMode, RelayConfig},
    init_tracing, server,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mode = DeploymentMode::from_env().context("invalid configuration")?;
    init_tracing(mode);

    // Refuse to start without a usable config; nothing is bound yet.
    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            return Err(e).context("invalid configuration");
        }
    };

    tracing::info!(
        mode = ?config.mode,
        origins = ?config.allowed_origins,
        model = %config.provider.model,
        "starting support relay"
    );

    server::start(config).await
}
