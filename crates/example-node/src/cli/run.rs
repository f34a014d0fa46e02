//! `run` subcommand: register, then publish presses until stopped.

use std::time::Duration;

use rd_domain::config::Config;
use rd_node_sdk::{NodeBuilder, NodeError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::resources::{default_table, Led, PressCounter};
use crate::triggers;

/// Which trigger sources feed the node.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerOptions {
    pub stdin: bool,
    pub press_every: Option<Duration>,
}

pub async fn run(config: Config, triggers_opts: TriggerOptions) -> anyhow::Result<()> {
    config.ensure_valid()?;

    let led = Led::default();
    let presses = PressCounter::default();

    let node = NodeBuilder::from_config(&config)?
        .resources(default_table(&led, &presses))
        .build()?;

    tracing::info!(
        endpoint = %node.endpoint_id(),
        directory = %config.directory.address,
        port = config.directory.port,
        resources = ?node.resources().paths(),
        "starting rd-node"
    );

    // ── Run ──────────────────────────────────────────────────────────
    let shutdown = CancellationToken::new();

    // Listen for Ctrl-C.
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Ctrl-C received, shutting down");
        shutdown_clone.cancel();
    });

    let (tx, rx) = mpsc::channel(config.node.event_queue);
    let mut sources = Vec::new();
    if triggers_opts.stdin {
        sources.push(triggers::spawn_stdin(
            tx.clone(),
            presses.clone(),
            shutdown.clone(),
        ));
    }
    if let Some(period) = triggers_opts.press_every {
        sources.push(triggers::spawn_interval(
            period,
            tx.clone(),
            presses.clone(),
            shutdown.clone(),
        ));
    }
    drop(tx);

    let result = node.run(rx, shutdown.clone()).await;

    shutdown.cancel();
    for source in sources {
        source.abort();
    }

    match result {
        Ok(()) => tracing::info!(presses = presses.get(), "node exited cleanly"),
        Err(NodeError::Shutdown) => tracing::info!("node shutdown"),
        Err(e) => {
            tracing::error!(error = %e, "node exited with error");
            return Err(e.into());
        }
    }

    Ok(())
}
