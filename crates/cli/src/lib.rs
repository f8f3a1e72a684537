//! Process bootstrap: parses the config path, starts a [`node::Node`], and
//! blocks until SIGINT/SIGTERM before running its teardown hooks.

pub mod result;

use clap::Parser;
use node::{Node, NodeConfig};
use telemetry::info;

use crate::result::{CliError, Result};

#[derive(Parser, Debug)]
#[command(about = "Signaling and admission engine node")]
pub struct Args {
    /// Path to the node's config file (TOML, YAML or JSON).
    #[clap(short, long, value_parser, value_name = "FILE", env = "SIGNAL_NODE_CONFIG")]
    pub config: String,
}

pub async fn run() -> Result<()> {
    let args = Args::parse();
    run_with_config_path(&args.config).await
}

async fn run_with_config_path(config_path: &str) -> Result<()> {
    let config = NodeConfig::from_file(config_path)?;
    let node = Node::start(config).await?;

    info!(id = %node.id(), "node is up and running");

    wait_for_shutdown_signal().await?;

    info!("shutdown signal received, tearing node down");
    node.shutdown().await;

    info!("node stopped");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| CliError::Other(format!("failed to install SIGTERM handler: {e}")))?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.map_err(|e| CliError::Other(format!("failed to listen for SIGINT: {e}")))
        }
        _ = sigterm.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| CliError::Other(format!("failed to listen for SIGINT: {e}")))
}
