// src/server.rs
use std::{future::Future, io, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{
    config::RelayConfig,
    routes,
    services::{completion::CompletionProvider, openai::OpenAiProvider},
    state::AppState,
};

/// Builds the provider, binds, and serves until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the provider client cannot be built, no port could
/// be bound, or the server fails while running.
pub async fn start(config: RelayConfig) -> anyhow::Result<()> {
    let provider = OpenAiProvider::new(&config.provider).context("failed to build provider client")?;

    let listener = bind_with_fallback(&config.bind_host, config.port, config.port_fallback_attempts)
        .await
        .with_context(|| format!("failed to bind {}:{}", config.bind_host, config.port))?;

    serve(listener, config, Arc::new(provider), shutdown_signal()).await
}

/// Serves the relay on an already-bound listener. Stops accepting when
/// `shutdown` resolves and waits for in-flight requests.
pub async fn serve<F>(
    listener: TcpListener,
    config: RelayConfig,
    provider: Arc<dyn CompletionProvider>,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    let app = routes::create_router(&config).with_state(AppState::new(config, provider).shared());

    info!("🚀 Support relay running at http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(anyhow::Error::from)?;

    info!("Server shut down");
    Ok(())
}

/// Tries `port`, then up to `attempts` following ports while the address is taken.
pub async fn bind_with_fallback(host: &str, port: u16, attempts: u16) -> io::Result<TcpListener> {
    let mut port = port;
    let mut remaining = attempts;

    loop {
        match TcpListener::bind((host, port)).await {
            Ok(listener) => {
                info!("Bound {host}:{port}");
                return Ok(listener);
            }
            Err(e) if e.kind() == io::ErrorKind::AddrInUse && remaining > 0 && port < u16::MAX => {
                warn!("Port {port} is busy, trying {}", port + 1);
                port += 1;
                remaining -= 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Resolves on Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn busy_port_falls_through_to_next() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();
        if port == u16::MAX {
            return;
        }

        // The next port may itself be busy on a shared machine; allow a few.
        let listener = bind_with_fallback("127.0.0.1", port, 5).await.unwrap();
        assert!(listener.local_addr().unwrap().port() > port);
    }

    #[tokio::test]
    async fn busy_port_without_attempts_fails() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let err = bind_with_fallback("127.0.0.1", port, 0).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AddrInUse);
    }
}
