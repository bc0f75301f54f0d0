//! ecs-reload-core - Core library for ecs-reload
//!
//! Locates a sibling container in the same ECS task and signals it whenever a
//! watched file changes:
//!
//! - **labels**: Label lookup over container descriptor shapes
//! - **runtime**: Container runtime traits and the Docker socket client
//! - **resolve**: Task → siblings → target resolution
//! - **watch**: Signal-on-change file watcher
//! - **orchestrator**: Startup sequencing from configuration to watching

pub mod config;
pub mod error;
pub mod labels;
pub mod orchestrator;
pub mod resolve;
pub mod runtime;
pub mod watch;

// Re-export commonly used types
pub use config::ReloadConfig;
pub use error::{Error, Result};
pub use orchestrator::{Orchestrator, Phase};
pub use watch::{WatchSession, WatchStats};
