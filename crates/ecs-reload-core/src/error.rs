//! Error types for ecs-reload-core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using ecs-reload-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for discovery and reload operations
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    // Runtime connection errors
    #[error("Docker socket {} was not found or is not a socket", .0.display())]
    RuntimeUnavailable(PathBuf),

    #[error("Docker API error {status}: {message}")]
    Runtime { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("Invalid HTTP request: {0}")]
    Request(#[from] hyper::http::Error),

    // Resolution errors
    #[error(
        "Could not find THIS container [{0}]. Is this running in Docker? It can't be run in host-networking mode."
    )]
    SelfNotFound(String),

    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    #[error("Container [{container}] is missing the label \"{label}\"")]
    MissingLabel { container: String, label: String },

    #[error("Expecting 2 or more task containers for task {task_id}, found {found}")]
    InsufficientSiblings { task_id: String, found: usize },

    #[error("Could not find target container with name \"{0}\"")]
    TargetNotFound(String),

    // Watch errors
    #[error("File to watch {} was not found or is not a file", .0.display())]
    NotAFile(PathBuf),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Failed to send {signal} to container [{container}]: {reason}")]
    SignalDeliveryFailed {
        container: String,
        signal: String,
        reason: String,
    },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create an error from a non-success runtime API response
    pub fn runtime(status: u16, message: impl Into<String>) -> Self {
        Self::Runtime {
            status,
            message: message.into(),
        }
    }

    /// Create a missing-label error
    pub fn missing_label(container: impl Into<String>, label: impl Into<String>) -> Self {
        Self::MissingLabel {
            container: container.into(),
            label: label.into(),
        }
    }

    /// Whether retrying target resolution could plausibly succeed.
    ///
    /// Missing labels and invalid configuration will not fix themselves by
    /// waiting; sibling containers that have not started yet might.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::InsufficientSiblings { .. }
                | Self::TargetNotFound(_)
                | Self::ContainerNotFound(_)
                | Self::Runtime { .. }
                | Self::Http(_)
                | Self::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::TargetNotFound("haproxy".into()).is_transient());
        assert!(
            Error::InsufficientSiblings {
                task_id: "t".into(),
                found: 1
            }
            .is_transient()
        );
        assert!(!Error::missing_label("abc", "com.amazonaws.ecs.task-arn").is_transient());
        assert!(!Error::SelfNotFound("abc".into()).is_transient());
        assert!(!Error::ConfigInvalid("x".into()).is_transient());
    }

    #[test]
    fn test_messages_name_the_subject() {
        let err = Error::NotAFile(PathBuf::from("/tmp/missing"));
        assert!(err.to_string().contains("/tmp/missing"));

        let err = Error::runtime(500, "boom");
        assert_eq!(err.to_string(), "Docker API error 500: boom");
    }
}
