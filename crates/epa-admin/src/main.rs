//! Event Processor Admin Daemon
//!
//! Runs the admin coordinator for the clients connected to this node and
//! serves operator requests over localhost IPC.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use epa_admin::ipc::IpcServer;
use epa_admin::AdminState;
use epa_core::config::{self, AdminConfig};

#[derive(Parser)]
#[command(name = "epa-admin")]
#[command(about = "Event processor admin daemon")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// IPC bind address (overrides config)
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| args.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Event processor admin daemon starting...");

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        config::load_config(config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        let default_path = config::default_config_path();
        if default_path.exists() {
            config::load_config(&default_path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {:?}: {}", default_path, e);
                AdminConfig::default()
            })
        } else {
            tracing::info!("Using default configuration");
            AdminConfig::default()
        }
    };

    if let Some(bind) = args.bind {
        config.ipc_address = bind;
    }
    config.validate().context("Invalid configuration")?;

    let state = Arc::new(AdminState::new(config.clone()));

    if state.requires_authentication() {
        tracing::info!("Access control enabled (static token)");
    } else {
        tracing::warn!("Access control disabled - any local process can issue admin commands");
    }

    // Create cancellation token for graceful shutdown
    let cancel = CancellationToken::new();

    // Setup signal handlers
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::warn!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                tracing::info!("Received Ctrl+C, initiating shutdown...");
            }
            _ = terminate => {
                tracing::info!("Received SIGTERM, initiating shutdown...");
            }
        }

        cancel_clone.cancel();
    });

    let server = IpcServer::new(config.ipc_address.clone(), Arc::clone(&state))
        .with_shutdown_token(cancel.clone());
    server.run().await?;

    tracing::info!(
        clients = state.clients.len(),
        "Admin daemon shutdown complete"
    );
    Ok(())
}
