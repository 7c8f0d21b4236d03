use anyhow::Context;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::state::AppState;

pub async fn handle(mut config: AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }
    info!("Starting JobSeekers API in {:?} mode", config.environment);

    let tokens = TokenService::from_config(&config)
        .context("set JWT_SECRET (or SECRET) before starting the server")?;

    let store = super::open_store(&config).await?;
    match store.ping().await {
        Ok(()) => info!("Pinged document store; connection is healthy"),
        Err(e) => error!("Document store ping failed: {}", e),
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let app = crate::app(AppState::new(store, tokens, config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received");
}
