//! Reloader configuration record.
//!
//! Built by the CLI layer and handed to the orchestrator as plain data.

use crate::error::{Error, Result};
use crate::runtime::DEFAULT_DOCKER_SOCKET;
use crate::watch::DEFAULT_SIGNAL;
use std::path::PathBuf;
use std::time::Duration;

/// Default startup grace period in milliseconds.
pub const DEFAULT_WAIT_MS: u64 = 5000;

/// Default delay between resolution attempts in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Reloader configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadConfig {
    /// ECS container name of the container to signal
    pub reload: String,
    /// File whose changes trigger a signal
    pub file_to_watch: PathBuf,
    /// Grace period before resolving the target
    pub wait: Duration,
    /// Container runtime socket
    pub docker_socket: PathBuf,
    /// Signal delivered on change
    pub signal: String,
    /// Id of this container; the hostname is used when unset
    pub container_id: Option<String>,
    /// Extra resolution attempts after the first one fails
    pub resolve_retries: u32,
    /// Delay between resolution attempts
    pub retry_delay: Duration,
}

impl ReloadConfig {
    /// Configuration with defaults for everything but the required fields.
    pub fn new(reload: impl Into<String>, file_to_watch: impl Into<PathBuf>) -> Self {
        Self {
            reload: reload.into(),
            file_to_watch: file_to_watch.into(),
            wait: Duration::from_millis(DEFAULT_WAIT_MS),
            docker_socket: PathBuf::from(DEFAULT_DOCKER_SOCKET),
            signal: DEFAULT_SIGNAL.to_string(),
            container_id: None,
            resolve_retries: 0,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }

    /// Check the required fields are usable.
    pub fn validate(&self) -> Result<()> {
        if self.reload.trim().is_empty() {
            return Err(Error::ConfigInvalid("--reload property is required.".into()));
        }
        if self.file_to_watch.as_os_str().is_empty() {
            return Err(Error::ConfigInvalid("--watch property is required.".into()));
        }
        if self.signal.trim().is_empty() {
            return Err(Error::ConfigInvalid("--signal must not be empty.".into()));
        }
        if matches!(&self.container_id, Some(id) if id.trim().is_empty()) {
            return Err(Error::ConfigInvalid("--container-id must not be empty.".into()));
        }
        Ok(())
    }
}
