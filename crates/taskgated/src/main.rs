//! taskgated — the taskgate daemon.
//!
//! Serves `POST {prefix}/{id}` and triggers task `id` on the task platform
//! with the request body as payload.
//!
//! # Usage
//!
//! ```text
//! TRIGGER_SECRET_KEY=tr_dev_... taskgated serve --bind 0.0.0.0:3000 --prefix /api/trigger
//! taskgated check-config --config taskgate.toml
//! ```

mod app;
mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn};

use taskgate_client::HttpTaskTrigger;
use taskgate_core::SharedTrigger;

use crate::config::{Framework, GatewayConfig};

const DEFAULT_LOG_FILTER: &str = "info,taskgated=debug,taskgate_core=debug";

#[derive(Parser)]
#[command(name = "taskgated", about = "taskgate daemon", version)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the trigger endpoint.
    Serve {
        /// Path to taskgate.toml.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Address to listen on (overrides server.bind).
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Route prefix (overrides server.prefix).
        #[arg(long)]
        prefix: Option<String>,

        /// Adapter to serve with (overrides server.framework).
        #[arg(long, value_enum)]
        framework: Option<Framework>,
    },
    /// Parse the config and print the effective settings.
    CheckConfig {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Command::Serve {
            config,
            bind,
            prefix,
            framework,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(prefix) = prefix {
                config.server.prefix = prefix;
            }
            if let Some(framework) = framework {
                config.server.framework = framework;
            }
            run_serve(config).await
        }
        Command::CheckConfig { config } => {
            let config = load_config(config.as_deref())?;
            config
                .client_config(|key| std::env::var(key).ok())
                .context("client settings are invalid")?;
            print!("{}", config.to_redacted_toml()?);
            Ok(())
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<GatewayConfig> {
    match path {
        Some(path) => {
            let config = GatewayConfig::from_file(path)?;
            info!(path = ?path, "config loaded");
            Ok(config)
        }
        None => Ok(GatewayConfig::default()),
    }
}

async fn run_serve(config: GatewayConfig) -> anyhow::Result<()> {
    info!("taskgate daemon starting");

    let client_config = config.client_config(|key| std::env::var(key).ok())?;
    let trigger: SharedTrigger =
        Arc::new(HttpTaskTrigger::new(&client_config).context("failed to build task client")?);
    info!(api_url = %client_config.api_url, "task client initialized");

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                // Dropping the sender would stop the server.
                let _keep = shutdown_tx;
                warn!(error = %e, "failed to install ctrl-c handler");
                std::future::pending::<()>().await;
            }
        }
    });

    // ── Serve ──────────────────────────────────────────────────

    info!(
        framework = ?config.server.framework,
        addr = %config.server.bind,
        prefix = %config.server.prefix,
        "trigger endpoint starting"
    );
    app::serve(
        config.server.framework,
        config.server.bind,
        &config.server.prefix,
        trigger,
        config.handler.clone(),
        shutdown_rx,
    )
    .await?;

    info!("taskgate daemon stopped");
    Ok(())
}
