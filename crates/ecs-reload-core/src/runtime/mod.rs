//! Container runtime interface.
//!
//! The resolver and watcher only talk to the runtime through
//! [`ContainerRuntime`] and [`ContainerHandle`]. [`docker::DockerRuntime`] is
//! the production implementation; tests use an in-memory fake.

use crate::error::Result;
use crate::labels::Labelled;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

pub mod docker;

#[cfg(test)]
pub(crate) mod fake;

pub use docker::{DockerContainer, DockerRuntime};

/// Default path of the Docker engine socket.
pub const DEFAULT_DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Access to the container engine.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Handle type used to inspect and signal a single container.
    type Handle: ContainerHandle + 'static;

    /// Get a handle for a container, or `None` if the runtime does not know it.
    async fn container(&self, id: &str) -> Result<Option<Self::Handle>>;

    /// List containers carrying the given label.
    async fn list_containers(&self, filter: &LabelFilter) -> Result<Vec<ContainerSummary>>;
}

/// A live reference to a runtime-managed container.
#[async_trait]
pub trait ContainerHandle: Send + Sync {
    /// Runtime identifier of the container.
    fn id(&self) -> &str;

    /// Fetch the full container descriptor.
    async fn inspect(&self) -> Result<ContainerDetails>;

    /// Send a signal (e.g. `SIGHUP`) to the container's main process.
    async fn signal(&self, signal: &str) -> Result<()>;
}

/// Label equality filter for container listing (`key=value`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFilter {
    pub key: String,
    pub value: String,
}

impl LabelFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for LabelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Descriptor Types
// ─────────────────────────────────────────────────────────────────────────────

/// Container as reported by the list endpoint (labels at the top level).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSummary {
    pub id: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl Labelled for ContainerSummary {
    fn id(&self) -> &str {
        &self.id
    }

    fn labels(&self) -> Option<&HashMap<String, String>> {
        Some(&self.labels)
    }
}

/// Container as reported by the inspect endpoint.
///
/// Docker nests labels under `Config.Labels`; some compatible engines report
/// them at the top level instead.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerDetails {
    pub id: String,
    #[serde(default)]
    pub config: Option<ContainerConfig>,
    #[serde(default)]
    pub labels: Option<HashMap<String, String>>,
}

/// The `Config` block of an inspected container.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerConfig {
    #[serde(default)]
    pub labels: Option<HashMap<String, String>>,
}

impl Labelled for ContainerDetails {
    fn id(&self) -> &str {
        &self.id
    }

    fn labels(&self) -> Option<&HashMap<String, String>> {
        self.config
            .as_ref()
            .and_then(|config| config.labels.as_ref())
            .or(self.labels.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{get_label, ECS_CONTAINER_NAME_KEY, ECS_TASK_ARN_KEY};

    #[test]
    fn test_label_filter_display() {
        let filter = LabelFilter::new(ECS_TASK_ARN_KEY, "arn:aws:ecs:task/1");
        assert_eq!(
            filter.to_string(),
            "com.amazonaws.ecs.task-arn=arn:aws:ecs:task/1"
        );
    }

    #[test]
    fn test_deserialize_inspect_payload() {
        let json = r#"{
            "Id": "a786fa987ds6",
            "Name": "/ecs-web-1",
            "Config": {
                "Hostname": "a786fa987ds6",
                "Labels": { "com.amazonaws.ecs.task-arn": "arn:task/1" }
            }
        }"#;
        let details: ContainerDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.id, "a786fa987ds6");
        assert_eq!(get_label(&details, ECS_TASK_ARN_KEY), Some("arn:task/1"));
    }

    #[test]
    fn test_deserialize_inspect_payload_with_null_labels() {
        let json = r#"{ "Id": "abc", "Config": { "Labels": null } }"#;
        let details: ContainerDetails = serde_json::from_str(json).unwrap();
        assert_eq!(get_label(&details, ECS_TASK_ARN_KEY), None);
    }

    #[test]
    fn test_deserialize_list_payload() {
        let json = r#"[
            { "Id": "a1", "Names": ["/edr"], "Labels": { "com.amazonaws.ecs.container-name": "edr" } },
            { "Id": "b2", "Names": ["/proxy"] }
        ]"#;
        let containers: Vec<ContainerSummary> = serde_json::from_str(json).unwrap();
        assert_eq!(containers.len(), 2);
        assert_eq!(get_label(&containers[0], ECS_CONTAINER_NAME_KEY), Some("edr"));
        assert_eq!(get_label(&containers[1], ECS_CONTAINER_NAME_KEY), None);
    }
}
