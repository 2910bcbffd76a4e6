//! Listener binding and graceful shutdown.

use axum::Router;
use tracing::info;

use crate::config::ServerConfig;

/// Bind the configured address and serve the router until ctrl-c.
pub async fn serve(config: &ServerConfig, app: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
