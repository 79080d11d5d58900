//! Server assembly for each supported framework.

use std::net::SocketAddr;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use taskgate_axum::AxumTrigger;
use taskgate_core::{HandlerOptions, SharedTrigger};
use taskgate_hyper::{HyperTrigger, TriggerServer};

use crate::config::Framework;

/// axum router with the trigger routes under `prefix`.
pub fn axum_app(prefix: &str, trigger: SharedTrigger, options: HandlerOptions) -> Router {
    AxumTrigger::new(trigger)
        .with_options(options)
        .router_at(prefix)
}

/// Serve the chosen adapter on `bind` until `shutdown` flips.
pub async fn serve(
    framework: Framework,
    bind: SocketAddr,
    prefix: &str,
    trigger: SharedTrigger,
    options: HandlerOptions,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    match framework {
        Framework::Axum => {
            let listener = TcpListener::bind(bind)
                .await
                .with_context(|| format!("failed to bind {bind}"))?;
            info!(addr = %bind, prefix, "axum trigger server listening");

            axum::serve(listener, axum_app(prefix, trigger, options))
                .with_graceful_shutdown(async move {
                    let _ = shutdown.changed().await;
                })
                .await
                .context("axum server failed")?;
        }
        Framework::Hyper => {
            let handler = HyperTrigger::new(trigger).with_options(options);
            TriggerServer::new(prefix, handler)
                .serve(bind, shutdown)
                .await?;
        }
    }
    Ok(())
}
