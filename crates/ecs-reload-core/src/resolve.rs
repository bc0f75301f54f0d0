//! Sibling container resolution.
//!
//! Finds the container to reload by walking from this container to its ECS
//! task and from the task to the sibling carrying the requested name:
//! - [`resolve_task_id`]: this container → task ARN
//! - [`list_siblings`]: task ARN → containers in the task
//! - [`select_target`]: siblings → handle of the named container

use crate::error::{Error, Result};
use crate::labels::{get_label, short_id, ECS_CONTAINER_NAME_KEY, ECS_TASK_ARN_KEY};
use crate::runtime::{ContainerHandle, ContainerRuntime, ContainerSummary, LabelFilter};
use std::fmt;
use tracing::{debug, info};

/// Identifier shared by every container of an orchestrated task.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve the task ARN of the container identified by `self_id`.
pub async fn resolve_task_id<R>(runtime: &R, self_id: &str) -> Result<TaskId>
where
    R: ContainerRuntime + ?Sized,
{
    let this = runtime
        .container(self_id)
        .await?
        .ok_or_else(|| Error::SelfNotFound(self_id.to_string()))?;

    let details = this.inspect().await?;
    let task_arn = get_label(&details, ECS_TASK_ARN_KEY)
        .ok_or_else(|| Error::missing_label(self_id, ECS_TASK_ARN_KEY))?;

    debug!(container = %short_id(self_id), task = %task_arn, "Resolved task ARN");
    Ok(TaskId::new(task_arn))
}

/// List every container belonging to `task_id`, including this one.
///
/// At least two containers are required: this one plus the target.
pub async fn list_siblings<R>(runtime: &R, task_id: &TaskId) -> Result<Vec<ContainerSummary>>
where
    R: ContainerRuntime + ?Sized,
{
    let filter = LabelFilter::new(ECS_TASK_ARN_KEY, task_id.as_str());
    let containers = runtime.list_containers(&filter).await?;

    if containers.len() < 2 {
        return Err(Error::InsufficientSiblings {
            task_id: task_id.to_string(),
            found: containers.len(),
        });
    }

    debug!(task = %task_id, count = containers.len(), "Listed task containers");
    Ok(containers)
}

/// Pick the first sibling whose container-name label equals `target_name`.
///
/// Order is whatever the runtime returned; with duplicate names the first
/// enumerated container wins.
pub fn find_target<'a>(
    siblings: &'a [ContainerSummary],
    target_name: &str,
) -> Option<&'a ContainerSummary> {
    siblings
        .iter()
        .find(|c| get_label(*c, ECS_CONTAINER_NAME_KEY) == Some(target_name))
}

/// Select the target among `siblings` and acquire a handle for it.
pub async fn select_target<R>(
    runtime: &R,
    siblings: &[ContainerSummary],
    target_name: &str,
) -> Result<R::Handle>
where
    R: ContainerRuntime + ?Sized,
{
    let target = find_target(siblings, target_name)
        .ok_or_else(|| Error::TargetNotFound(target_name.to_string()))?;

    info!(
        "Found target container \"{}\" [{}]",
        target_name,
        short_id(&target.id)
    );

    runtime
        .container(&target.id)
        .await?
        .ok_or_else(|| Error::ContainerNotFound(target.id.clone()))
}

/// Full resolution: this container → task → siblings → named target.
pub async fn resolve_target<R>(runtime: &R, self_id: &str, target_name: &str) -> Result<R::Handle>
where
    R: ContainerRuntime + ?Sized,
{
    let task_id = resolve_task_id(runtime, self_id).await?;
    let siblings = list_siblings(runtime, &task_id).await?;
    let target = select_target(runtime, &siblings, target_name).await?;
    debug!(target = %target.id(), "Target resolved");
    Ok(target)
}
