//! Framework integration: the request-side extractor and a serve convenience
//!
//! Routing, transport and lifecycle stay with axum; this module only attaches
//! a [`Converter`](crate::core::Converter) to a route and reads it back when
//! a request arrives.

pub mod extract;

pub use extract::Converted;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;

/// Serve a router with graceful shutdown
///
/// Binds the address, serves requests, and handles SIGTERM and Ctrl+C for
/// graceful shutdown. Purely a convenience around `axum::serve`.
///
/// # Example
///
/// ```ignore
/// let app = Router::new().route("/todos/{pk}", get(get_todo).layer(converter.layer()));
/// serve(app, "127.0.0.1:3000").await?;
/// ```
pub async fn serve(app: Router, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
