//! CLI argument definitions using clap derive macros.
//!
//! A fresh parser is built on every call to [`parse`]; there is no shared
//! parser state between invocations.

use clap::Parser;
use ecs_reload_core::config::{DEFAULT_RETRY_DELAY_MS, DEFAULT_WAIT_MS};
use ecs_reload_core::runtime::DEFAULT_DOCKER_SOCKET;
use ecs_reload_core::watch::DEFAULT_SIGNAL;
use ecs_reload_core::ReloadConfig;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CliError;

/// Signal a sibling ECS container whenever a file changes
///
/// Finds the container named by --reload in the same ECS task as this
/// container and sends it a signal each time the --watch file is modified.
#[derive(Parser, Debug)]
#[command(name = "ecs-reload")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// File to watch
    #[arg(short, long, value_name = "FILE", env = "ECS_RELOAD_WATCH")]
    pub watch: PathBuf,

    /// ECS container to reload
    #[arg(short, long, value_name = "CONTAINER", env = "ECS_RELOAD_TARGET")]
    pub reload: String,

    /// Wait a number of milliseconds before locating the container
    #[arg(short = 't', long, value_name = "MS", default_value_t = DEFAULT_WAIT_MS, env = "ECS_RELOAD_WAIT_MS")]
    pub wait: u64,

    /// Path to the Docker socket
    #[arg(short, long, value_name = "SOCKET", default_value = DEFAULT_DOCKER_SOCKET, env = "ECS_RELOAD_DOCKER_SOCKET")]
    pub docker: PathBuf,

    /// Signal to send on change
    #[arg(short, long, default_value = DEFAULT_SIGNAL, env = "ECS_RELOAD_SIGNAL")]
    pub signal: String,

    /// Id of this container (defaults to the hostname)
    #[arg(long, value_name = "ID", env = "ECS_RELOAD_CONTAINER_ID")]
    pub container_id: Option<String>,

    /// Retry locating the container this many times before giving up
    #[arg(long, default_value_t = 0, env = "ECS_RELOAD_RETRIES")]
    pub retries: u32,

    /// Milliseconds between retries
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_RETRY_DELAY_MS, env = "ECS_RELOAD_RETRY_DELAY_MS")]
    pub retry_delay: u64,
}

impl Cli {
    /// Convert parsed arguments into the reloader configuration
    pub fn into_config(self) -> ReloadConfig {
        ReloadConfig {
            reload: self.reload,
            file_to_watch: self.watch,
            wait: Duration::from_millis(self.wait),
            docker_socket: self.docker,
            signal: self.signal,
            container_id: self.container_id,
            resolve_retries: self.retries,
            retry_delay: Duration::from_millis(self.retry_delay),
        }
    }
}

/// Parse `argv` (including the program name) into a validated configuration.
pub fn parse<I, T>(argv: I) -> Result<ReloadConfig, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let config = Cli::try_parse_from(argv)?.into_config();
    config.validate()?;
    Ok(config)
}
