//! Container label lookup.
//!
//! Runtime APIs report labels in different places: the list endpoint puts
//! them at the top level, inspect nests them under `Config.Labels`. Each
//! descriptor shape implements [`Labelled`] so lookups never inspect fields
//! directly.

use std::collections::HashMap;

/// Label carrying the ECS task ARN shared by every container in a task.
pub const ECS_TASK_ARN_KEY: &str = "com.amazonaws.ecs.task-arn";

/// Label carrying the container name from the ECS task definition.
pub const ECS_CONTAINER_NAME_KEY: &str = "com.amazonaws.ecs.container-name";

/// A container descriptor that carries labels.
pub trait Labelled {
    /// Runtime identifier of the container.
    fn id(&self) -> &str;

    /// The label map, if the descriptor reports one.
    fn labels(&self) -> Option<&HashMap<String, String>>;
}

/// Look up a label on a container descriptor.
///
/// Returns `None` when the key is absent; a missing label is not an error here.
pub fn get_label<'a, D>(descriptor: &'a D, key: &str) -> Option<&'a str>
where
    D: Labelled + ?Sized,
{
    descriptor
        .labels()
        .and_then(|labels| labels.get(key))
        .map(String::as_str)
}

/// Shorten a container id the way `docker ps` does.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(12) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}
