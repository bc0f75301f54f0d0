//! ecs-reload - sidecar that reloads a sibling ECS container
//!
//! Watches a file and sends a signal (SIGHUP by default) to another container
//! in the same ECS task whenever that file changes.

use anyhow::{Context, Result};
use ecs_reload_core::{Orchestrator, ReloadConfig};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod error;

use error::CliError;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("ecs_reload=info".parse()?)
                .add_directive("ecs_reload_core=info".parse()?),
        )
        .init();

    let config = match cli::parse(std::env::args_os()) {
        Ok(config) => config,
        Err(CliError::Display(e)) => e.exit(),
        Err(e) => return Err(e.into()),
    };

    run(config).await
}

async fn run(config: ReloadConfig) -> Result<()> {
    let self_id = match &config.container_id {
        Some(id) => id.clone(),
        None => hostname::get()
            .context("Failed to read hostname")?
            .to_string_lossy()
            .into_owned(),
    };

    info!("ecs-reload v{}", env!("CARGO_PKG_VERSION"));
    let mut orchestrator = Orchestrator::new(config, self_id)?;
    let mut session = orchestrator.run().await?;

    shutdown_signal().await?;
    info!(stats = ?session.stats(), "Shutting down...");
    session.close();

    Ok(())
}

/// Resolve on ctrl-c or SIGTERM
async fn shutdown_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.context("Failed to listen for ctrl-c")?,
        _ = terminate.recv() => {}
    }
    Ok(())
}
