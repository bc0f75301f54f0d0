//! In-memory container runtime for tests.

use super::{ContainerDetails, ContainerHandle, ContainerRuntime, ContainerSummary, LabelFilter};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct State {
    details: HashMap<String, ContainerDetails>,
    /// Successive `list_containers` results; the last one repeats.
    listings: VecDeque<Result<Vec<ContainerSummary>>>,
    list_calls: Vec<LabelFilter>,
    signals: Vec<(String, String)>,
    failing_signals: usize,
    inspect_fails: bool,
}

/// Scriptable runtime that records what was asked of it.
#[derive(Clone, Default)]
pub(crate) struct FakeRuntime {
    state: Arc<Mutex<State>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a container that `container()` and `inspect()` know about.
    pub fn with_container(self, details: ContainerDetails) -> Self {
        self.state
            .lock()
            .unwrap()
            .details
            .insert(details.id.clone(), details);
        self
    }

    /// Queue a listing result.
    pub fn with_listing(self, listing: Result<Vec<ContainerSummary>>) -> Self {
        self.state.lock().unwrap().listings.push_back(listing);
        self
    }

    pub fn with_failing_inspect(self) -> Self {
        self.state.lock().unwrap().inspect_fails = true;
        self
    }

    /// Make the next `count` signal deliveries fail.
    pub fn fail_next_signals(&self, count: usize) {
        self.state.lock().unwrap().failing_signals = count;
    }

    pub fn signals(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().signals.clone()
    }

    pub fn list_calls(&self) -> Vec<LabelFilter> {
        self.state.lock().unwrap().list_calls.clone()
    }

    pub fn handle(&self, id: &str) -> FakeContainer {
        FakeContainer {
            id: id.to_string(),
            state: Arc::clone(&self.state),
        }
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    type Handle = FakeContainer;

    async fn container(&self, id: &str) -> Result<Option<FakeContainer>> {
        let known = self.state.lock().unwrap().details.contains_key(id);
        Ok(known.then(|| self.handle(id)))
    }

    async fn list_containers(&self, filter: &LabelFilter) -> Result<Vec<ContainerSummary>> {
        let mut state = self.state.lock().unwrap();
        state.list_calls.push(filter.clone());
        let next = if state.listings.len() > 1 {
            state.listings.pop_front()
        } else {
            state.listings.front().map(|listing| match listing {
                Ok(containers) => Ok(containers.clone()),
                Err(e) => Err(Error::runtime(500, e.to_string())),
            })
        };
        next.unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Handle produced by [`FakeRuntime`].
pub(crate) struct FakeContainer {
    id: String,
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl ContainerHandle for FakeContainer {
    fn id(&self) -> &str {
        &self.id
    }

    async fn inspect(&self) -> Result<ContainerDetails> {
        let state = self.state.lock().unwrap();
        if state.inspect_fails {
            return Err(Error::runtime(500, "inspect failed"));
        }
        state
            .details
            .get(&self.id)
            .cloned()
            .ok_or_else(|| Error::ContainerNotFound(self.id.clone()))
    }

    async fn signal(&self, signal: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.signals.push((self.id.clone(), signal.to_string()));
        if state.failing_signals > 0 {
            state.failing_signals -= 1;
            return Err(Error::runtime(409, "container is not running"));
        }
        Ok(())
    }
}

/// Inspect-shaped descriptor with labels under `Config.Labels`.
pub(crate) fn details(id: &str, labels: &[(&str, &str)]) -> ContainerDetails {
    ContainerDetails {
        id: id.to_string(),
        config: Some(super::ContainerConfig {
            labels: Some(to_map(labels)),
        }),
        labels: None,
    }
}

/// List-shaped descriptor with top-level labels.
pub(crate) fn summary(id: &str, labels: &[(&str, &str)]) -> ContainerSummary {
    ContainerSummary {
        id: id.to_string(),
        labels: to_map(labels),
    }
}

fn to_map(labels: &[(&str, &str)]) -> HashMap<String, String> {
    labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
