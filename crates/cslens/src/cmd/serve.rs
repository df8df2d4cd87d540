//! Serve command - Run the HTTP listener
//!
//! Point a telemetry client at `http://<address>:<port>/OneCollector/...`
//! and each upload is answered with its decoded records.

use anyhow::{Context, Result};
use clap::Args;
use cslens_config::Config;
use cslens_server::DecoderServer;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Serve command arguments
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen port. Overrides config file.
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Run the serve command
pub async fn run(args: ServeArgs, mut config: Config) -> Result<()> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate().context("invalid configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        address = %config.server.socket_addr(),
        "cslens starting"
    );

    let server = DecoderServer::new(config.server, config.decoder.to_options());
    let cancel = CancellationToken::new();

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        wait_for_shutdown().await;
        info!("shutdown signal received, stopping listener...");
        shutdown.cancel();
    });

    if let Err(e) = server.run(cancel).await {
        error!(error = %e, "server error");
        return Err(e.into());
    }

    info!("cslens shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C, or SIGTERM on unix
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
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
}
