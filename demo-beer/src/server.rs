use axum::Router;
use std::env;
use tokio::net::TcpListener;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";

pub(crate) fn bind_addr() -> String {
    env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
}

pub(crate) async fn serve(addr: String, app: Router) -> std::io::Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutting down");
}
