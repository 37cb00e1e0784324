use crate::api::routes;
use crate::config::ServerConfig;
use crate::engine::SqlParserEngine;
use crate::errors::Result;
use tracing::info;

/// Starts and runs the HTTP server using Axum web framework
///
/// Serves until Ctrl-C or SIGTERM, then drains in-flight requests.
///
/// # Arguments
/// * `config` - Listener, prefix, CORS and timeout settings
///
/// # Returns
/// * `Result<()>` - Ok once the server has shut down, Error if it could not start
pub async fn launch_server(config: &ServerConfig) -> Result<()> {
    let timeout = config.timeout()?;
    let app = routes::app(SqlParserEngine::shared(), config, timeout);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!(
        "Listening on {} (routes under '{}')",
        listener.local_addr()?,
        if config.prefix.is_empty() { "/" } else { config.prefix.as_str() }
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
