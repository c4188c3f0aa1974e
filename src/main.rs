//! Vibewatch - HTTP server entry point

use std::net::SocketAddr;
use std::time::Duration;

use tokio::{net::TcpListener, signal};
use tokio_util::sync::CancellationToken;

use vibewatch::{create_app, init_tracing, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    let config = Config::load().map_err(|e| {
        std::io::Error::other(format!(
            "Failed to load configuration. Check config/ files and VIBEWATCH__* env vars: {}",
            e
        ))
    })?;

    init_tracing(&config.logging)?;

    let server_host = config.server.host.clone();
    let server_port = config.server.port;
    let enable_docs = config.server.enable_docs;

    let app_handle = create_app(config)
        .map_err(|e| std::io::Error::other(format!("Failed to create application: {}", e)))?;

    let addr = SocketAddr::new(server_host.parse()?, server_port);
    tracing::info!("Server listening on {}", addr);
    if enable_docs {
        tracing::info!("OpenAPI document available at http://{}/api-docs/openapi.json", addr);
    }

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app_handle.router)
        .with_graceful_shutdown(shutdown_signal(app_handle.shutdown_token))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals and cancel background workers
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        },
    }

    shutdown_token.cancel();
    // Give workers a moment to observe cancellation before the process exits.
    tokio::time::sleep(Duration::from_millis(200)).await;
}
