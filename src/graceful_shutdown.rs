use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

/// Resolves on the first SIGTERM or SIGINT. Used as the shutdown future of
/// the HTTP server so in-flight requests finish before exit.
pub async fn wait_for_signal() {
    let (mut sigterm, mut sigint) = match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            error!("Unable to register shutdown handler, falling back to Ctrl-C: {}", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Unable to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Received Ctrl-C - shutting down gracefully.");
            return;
        }
    };
    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT"
    };
    info!("Received signal ({signal}) - shutting down gracefully.");
}
