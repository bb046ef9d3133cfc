//! Users service binary: loads configuration, connects to PostgreSQL and
//! serves the HTTP API until SIGTERM or ctrl+c.

use std::path::PathBuf;

use clinica_users::config::Configuration;
use clinica_users::{app, initialize_state, telemetry};
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::setup_logging();

    // read configuration file. let it in memory.
    let config = Configuration::default()
        .path(std::env::var("CONFIG_PATH").map(PathBuf::from).unwrap_or_default())
        .read();

    let mut state = initialize_state(config.clone()).await?;
    state.metrics = Some(telemetry::setup_metrics_recorder()?);

    let listener = TcpListener::bind(&config.address).await?;
    tracing::info!(address = %config.address, version = config.version(), "server started");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            },
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutting down");
}
