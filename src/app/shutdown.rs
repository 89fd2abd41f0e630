//! Signal-driven graceful shutdown with a bounded drain.

use std::future::{Future, IntoFuture};
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::domain::AppError;

/// How the server stopped after a shutdown signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// All in-flight requests finished within the drain timeout.
    Graceful,
    /// The drain timeout elapsed and the server task was aborted.
    TimedOut,
}

/// Resolves on SIGINT or SIGTERM (Ctrl+C only on non-Unix targets).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    warn!("Shutdown signal received");
}

/// Serve `router` until `signal` resolves, then drain for at most `timeout`.
///
/// # Errors
/// Returns an error if the server fails before the signal, or fails while
/// draining.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    router: Router,
    timeout: Duration,
    signal: F,
) -> Result<ShutdownOutcome, AppError>
where
    F: Future<Output = ()>,
{
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        let _ = shutdown_rx.wait_for(|stop| *stop).await;
    });
    let mut server = tokio::spawn(server.into_future());

    tokio::select! {
        result = &mut server => {
            return match result {
                Ok(Ok(())) => Ok(ShutdownOutcome::Graceful),
                Ok(Err(e)) => Err(AppError::Io(e)),
                Err(e) => Err(AppError::Internal(format!("server task failed: {e}"))),
            };
        }
        () = signal => {}
    }

    let _ = shutdown_tx.send(true);
    info!(timeout_ms = timeout.as_millis() as u64, "Draining in-flight requests");

    match tokio::time::timeout(timeout, &mut server).await {
        Ok(Ok(Ok(()))) => {
            info!("Server gracefully stopped");
            Ok(ShutdownOutcome::Graceful)
        }
        Ok(Ok(Err(e))) => Err(AppError::Io(e)),
        Ok(Err(e)) => Err(AppError::Internal(format!("server task failed: {e}"))),
        Err(_) => {
            server.abort();
            warn!(timeout_ms = timeout.as_millis() as u64, "Graceful shutdown timed out");
            Ok(ShutdownOutcome::TimedOut)
        }
    }
}
