//! Reloader orchestration.
//!
//! Runs the startup sequence strictly in order:
//!
//! ```text
//! Init → ConfigLoaded → RuntimeReady → Delayed → TargetResolved → Watching
//! ```
//!
//! Any failure before `Watching` is returned to the caller, which treats it as
//! fatal. Once watching, delivery failures stay inside the watch session.

use crate::config::ReloadConfig;
use crate::error::Result;
use crate::resolve::resolve_target;
use crate::runtime::{ContainerRuntime, DockerRuntime};
use crate::watch::{watch, WatchSession};
use std::fmt;
use tracing::{debug, info, warn};

/// Startup phase of the reloader
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Init,
    ConfigLoaded,
    RuntimeReady,
    Delayed,
    TargetResolved,
    Watching,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Init => "init",
            Phase::ConfigLoaded => "config-loaded",
            Phase::RuntimeReady => "runtime-ready",
            Phase::Delayed => "delayed",
            Phase::TargetResolved => "target-resolved",
            Phase::Watching => "watching",
        };
        f.write_str(name)
    }
}

/// Drives the reloader from configuration to an active watch.
#[derive(Debug)]
pub struct Orchestrator {
    config: ReloadConfig,
    self_id: String,
    phase: Phase,
}

impl Orchestrator {
    /// Validate `config` for the container identified by `self_id`.
    pub fn new(config: ReloadConfig, self_id: impl Into<String>) -> Result<Self> {
        let mut orchestrator = Self {
            config,
            self_id: self_id.into(),
            phase: Phase::Init,
        };
        orchestrator.config.validate()?;
        orchestrator.advance(Phase::ConfigLoaded);
        Ok(orchestrator)
    }

    /// Phase reached so far
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &ReloadConfig {
        &self.config
    }

    /// Connect to the Docker socket from the configuration and run.
    pub async fn run(&mut self) -> Result<WatchSession> {
        let docker = DockerRuntime::connect(&self.config.docker_socket)?;
        self.run_with(docker).await
    }

    /// Run the remaining phases against `runtime`.
    pub async fn run_with<R>(&mut self, runtime: R) -> Result<WatchSession>
    where
        R: ContainerRuntime,
    {
        self.advance(Phase::RuntimeReady);

        if !self.config.wait.is_zero() {
            info!("Waiting {}ms for task containers to start", self.config.wait.as_millis());
            tokio::time::sleep(self.config.wait).await;
        }
        self.advance(Phase::Delayed);

        let target = self.resolve(&runtime).await?;
        self.advance(Phase::TargetResolved);

        let session = watch(target, &self.config.file_to_watch, self.config.signal.as_str()).await?;
        self.advance(Phase::Watching);
        Ok(session)
    }

    /// Resolve the target, retrying transient failures if configured.
    async fn resolve<R>(&self, runtime: &R) -> Result<R::Handle>
    where
        R: ContainerRuntime,
    {
        let retries = self.config.resolve_retries;
        let mut attempt = 0;
        loop {
            match resolve_target(runtime, &self.self_id, &self.config.reload).await {
                Ok(target) => return Ok(target),
                Err(e) if e.is_transient() && attempt < retries => {
                    attempt += 1;
                    warn!(
                        attempt = attempt,
                        retries = retries,
                        "Target resolution failed: {}; retrying in {}ms",
                        e,
                        self.config.retry_delay.as_millis()
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn advance(&mut self, next: Phase) {
        debug!(from = %self.phase, to = %next, "Phase transition");
        self.phase = next;
    }
}
