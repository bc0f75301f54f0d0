//! Error types for the ecs-reload binary.

use ecs_reload_core::Error;
use thiserror::Error;

/// Errors produced while turning the command line into a configuration.
#[derive(Error, Debug)]
pub enum CliError {
    /// Help or version output was requested; not a failure.
    #[error("{0}")]
    Display(clap::Error),

    #[error(transparent)]
    Core(#[from] Error),
}

impl From<clap::Error> for CliError {
    fn from(e: clap::Error) -> Self {
        if e.use_stderr() {
            CliError::Core(Error::ConfigInvalid(e.render().to_string().trim().to_string()))
        } else {
            CliError::Display(e)
        }
    }
}
