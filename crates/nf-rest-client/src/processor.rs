//! Processor lifecycle operations

use nf_rest_api_contract::{
    validate_processor_component, ComponentRequest, Position, ProcessorComponent, ProcessorConfig,
    ProcessorEntity, ProcessorState, ProcessorsEntity, Revision, RunStatusEntity,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::client::NifiClient;
use crate::error::RestClientResult;

pub const DEFAULT_SCHEDULING_PERIOD: &str = "60 sec";
pub const DEFAULT_POSITION: Position = Position { x: 300.0, y: 200.0 };
/// Alias the server accepts in place of the root process group ID
pub const ROOT_GROUP_ALIAS: &str = "root";

/// Description of a processor to create
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorSpec {
    pub processor_type: String,
    pub name: String,
    pub position: Position,
    pub properties: BTreeMap<String, String>,
    pub scheduling_period: String,
    pub auto_terminated_relationships: Vec<String>,
}

impl ProcessorSpec {
    pub fn new(processor_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            processor_type: processor_type.into(),
            name: name.into(),
            position: DEFAULT_POSITION,
            properties: BTreeMap::new(),
            scheduling_period: DEFAULT_SCHEDULING_PERIOD.to_string(),
            auto_terminated_relationships: Vec::new(),
        }
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn scheduling_period(mut self, period: impl Into<String>) -> Self {
        self.scheduling_period = period.into();
        self
    }

    pub fn auto_terminate(mut self, relationship: impl Into<String>) -> Self {
        self.auto_terminated_relationships.push(relationship.into());
        self
    }

    /// Component payload sent to the server
    pub fn into_component(self) -> ProcessorComponent {
        let auto_terminated = if self.auto_terminated_relationships.is_empty() {
            None
        } else {
            Some(self.auto_terminated_relationships)
        };

        ProcessorComponent {
            id: None,
            parent_group_id: None,
            processor_type: self.processor_type,
            name: self.name,
            position: Some(self.position),
            config: Some(ProcessorConfig {
                properties: self
                    .properties
                    .into_iter()
                    .map(|(k, v)| (k, Some(v)))
                    .collect(),
                scheduling_period: Some(self.scheduling_period),
                auto_terminated_relationships: auto_terminated,
            }),
            state: None,
        }
    }
}

/// Result classification of a start or stop call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatusChange {
    Started,
    AlreadyRunning,
    Stopped,
    AlreadyStopped,
}

impl RunStatusChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatusChange::Started => "started",
            RunStatusChange::AlreadyRunning => "already_running",
            RunStatusChange::Stopped => "stopped",
            RunStatusChange::AlreadyStopped => "already_stopped",
        }
    }

    /// Whether a run-status update was sent
    pub fn changed(&self) -> bool {
        matches!(self, RunStatusChange::Started | RunStatusChange::Stopped)
    }

    fn for_target(target: ProcessorState, changed: bool) -> Self {
        match (target, changed) {
            (ProcessorState::Running, true) => RunStatusChange::Started,
            (ProcessorState::Running, false) => RunStatusChange::AlreadyRunning,
            (_, true) => RunStatusChange::Stopped,
            (_, false) => RunStatusChange::AlreadyStopped,
        }
    }
}

/// Outcome of [`ProcessorManager::start`] or [`ProcessorManager::stop`]
#[derive(Debug, Clone)]
pub struct RunStatusOutcome {
    pub status: RunStatusChange,
    /// The fetched entity when unchanged, the updated entity otherwise
    pub processor: ProcessorEntity,
}

/// Creates, inspects and transitions processors
#[derive(Debug, Clone, Copy)]
pub struct ProcessorManager<'a> {
    client: &'a NifiClient,
}

impl<'a> ProcessorManager<'a> {
    pub fn new(client: &'a NifiClient) -> Self {
        Self { client }
    }

    /// Create a processor in a process group (root when `None`)
    pub async fn create(
        &self,
        spec: ProcessorSpec,
        process_group_id: Option<&str>,
    ) -> RestClientResult<ProcessorEntity> {
        let component = spec.into_component();
        validate_processor_component(&component)?;

        let group_id = match process_group_id {
            Some(id) => id.to_string(),
            None => self.client.root_process_group_id().await?,
        };

        let request = ComponentRequest::create(component);
        let entity: ProcessorEntity = self
            .client
            .post(&format!("/process-groups/{}/processors", group_id), &request)
            .await?;

        info!(id = %entity.id, name = %entity.name(), group = %group_id, "processor created");
        Ok(entity)
    }

    /// Fetch the current state and revision of a processor
    pub async fn get(&self, processor_id: &str) -> RestClientResult<ProcessorEntity> {
        self.client.get(&format!("/processors/{}", processor_id)).await
    }

    pub async fn start(&self, processor_id: &str) -> RestClientResult<RunStatusOutcome> {
        self.transition(processor_id, ProcessorState::Running).await
    }

    pub async fn stop(&self, processor_id: &str) -> RestClientResult<RunStatusOutcome> {
        self.transition(processor_id, ProcessorState::Stopped).await
    }

    /// Read the processor, then update its run status with the revision just read.
    /// A concurrent writer makes the update fail with a server error; it is not retried.
    async fn transition(
        &self,
        processor_id: &str,
        target: ProcessorState,
    ) -> RestClientResult<RunStatusOutcome> {
        let current = self.get(processor_id).await?;

        if current.state() == target {
            debug!(id = %processor_id, state = %target, "processor already in target state");
            return Ok(RunStatusOutcome {
                status: RunStatusChange::for_target(target, false),
                processor: current,
            });
        }

        let request = RunStatusEntity {
            revision: Revision::at(current.revision.version),
            state: target,
        };
        let updated: ProcessorEntity = self
            .client
            .put(&format!("/processors/{}/run-status", processor_id), &request)
            .await?;

        info!(id = %processor_id, state = %target, "processor run status updated");
        Ok(RunStatusOutcome {
            status: RunStatusChange::for_target(target, true),
            processor: updated,
        })
    }

    /// List the processors of a process group (the `root` alias when `None`)
    pub async fn list_all(
        &self,
        process_group_id: Option<&str>,
    ) -> RestClientResult<Vec<ProcessorEntity>> {
        let group_id = process_group_id.unwrap_or(ROOT_GROUP_ALIAS);
        let response: ProcessorsEntity = self
            .client
            .get(&format!("/process-groups/{}/processors", group_id))
            .await?;
        Ok(response.processors)
    }

    /// Stop a processor and delete it at its current revision
    pub async fn delete(&self, processor_id: &str) -> RestClientResult<ProcessorEntity> {
        self.stop(processor_id).await?;

        let current = self.get(processor_id).await?;
        let deleted: ProcessorEntity = self
            .client
            .delete(&format!(
                "/processors/{}?version={}",
                processor_id, current.revision.version
            ))
            .await?;

        info!(id = %processor_id, "processor deleted");
        Ok(deleted)
    }
}
