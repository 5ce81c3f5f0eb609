//! Flow composition: the sample pipeline and bulk start/stop

use nf_rest_api_contract::{
    validate_connection_component, ComponentRequest, Connectable, ConnectionComponent,
    ConnectionEntity, ProcessorState,
};
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::client::NifiClient;
use crate::error::RestClientResult;
use crate::processor::{ProcessorManager, ProcessorSpec};

pub const GENERATE_FLOW_FILE_TYPE: &str = "org.apache.nifi.processors.standard.GenerateFlowFile";
pub const LOG_ATTRIBUTE_TYPE: &str = "org.apache.nifi.processors.standard.LogAttribute";
pub const SUCCESS_RELATIONSHIP: &str = "success";

/// IDs of the components created by [`FlowManager::create_sample_flow`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleFlow {
    pub generate_id: String,
    pub log_id: String,
    pub connection_id: String,
    pub process_group_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessorRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedProcessor {
    pub id: String,
    pub error: String,
}

/// Result of a bulk run-status change for one processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProcessorOutcome {
    /// The processor was moved to the target state
    Changed(ProcessorRef),
    /// The processor was already in the target state; nothing was sent
    Unchanged(ProcessorRef),
    Failed(FailedProcessor),
}

fn changed(outcomes: &[ProcessorOutcome]) -> Vec<&ProcessorRef> {
    outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            ProcessorOutcome::Changed(processor) => Some(processor),
            _ => None,
        })
        .collect()
}

fn unchanged(outcomes: &[ProcessorOutcome]) -> Vec<&ProcessorRef> {
    outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            ProcessorOutcome::Unchanged(processor) => Some(processor),
            _ => None,
        })
        .collect()
}

fn failed(outcomes: &[ProcessorOutcome]) -> Vec<&FailedProcessor> {
    outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            ProcessorOutcome::Failed(failure) => Some(failure),
            _ => None,
        })
        .collect()
}

/// Per-processor results of [`FlowManager::start_all_processors`], in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StartSummary {
    pub outcomes: Vec<ProcessorOutcome>,
}

impl StartSummary {
    pub fn started(&self) -> Vec<&ProcessorRef> {
        changed(&self.outcomes)
    }

    pub fn already_running(&self) -> Vec<&ProcessorRef> {
        unchanged(&self.outcomes)
    }

    pub fn failed(&self) -> Vec<&FailedProcessor> {
        failed(&self.outcomes)
    }
}

impl fmt::Display for StartSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} started, {} already running, {} failed",
            self.started().len(),
            self.already_running().len(),
            self.failed().len()
        )
    }
}

/// Per-processor results of [`FlowManager::stop_all_processors`], in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StopSummary {
    pub outcomes: Vec<ProcessorOutcome>,
}

impl StopSummary {
    pub fn stopped(&self) -> Vec<&ProcessorRef> {
        changed(&self.outcomes)
    }

    pub fn already_stopped(&self) -> Vec<&ProcessorRef> {
        unchanged(&self.outcomes)
    }

    pub fn failed(&self) -> Vec<&FailedProcessor> {
        failed(&self.outcomes)
    }
}

impl fmt::Display for StopSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} stopped, {} already stopped, {} failed",
            self.stopped().len(),
            self.already_stopped().len(),
            self.failed().len()
        )
    }
}

/// Builds flows and runs bulk operations over the processors it tracks
///
/// The tracked IDs live only in this instance and are not authoritative.
#[derive(Debug)]
pub struct FlowManager<'a> {
    client: &'a NifiClient,
    processors: ProcessorManager<'a>,
    created_processors: Vec<String>,
    created_connections: Vec<String>,
}

impl<'a> FlowManager<'a> {
    pub fn new(client: &'a NifiClient) -> Self {
        Self {
            client,
            processors: ProcessorManager::new(client),
            created_processors: Vec::new(),
            created_connections: Vec::new(),
        }
    }

    pub fn processors(&self) -> &ProcessorManager<'a> {
        &self.processors
    }

    pub fn created_processors(&self) -> &[String] {
        &self.created_processors
    }

    pub fn created_connections(&self) -> &[String] {
        &self.created_connections
    }

    /// Add a processor ID to the bulk start/stop scope
    pub fn track_processor(&mut self, processor_id: impl Into<String>) {
        let processor_id = processor_id.into();
        if !self.created_processors.contains(&processor_id) {
            self.created_processors.push(processor_id);
        }
    }

    /// Track every processor currently in a process group (root when `None`)
    ///
    /// Returns the number of processors listed in the group.
    pub async fn track_processors_in_group(
        &mut self,
        process_group_id: Option<&str>,
    ) -> RestClientResult<usize> {
        let processors = self.processors.list_all(process_group_id).await?;
        let count = processors.len();
        for processor in processors {
            self.track_processor(processor.id);
        }
        Ok(count)
    }

    /// Create GenerateFlowFile -> LogAttribute connected on `success`
    pub async fn create_sample_flow(
        &mut self,
        process_group_id: Option<&str>,
    ) -> RestClientResult<SampleFlow> {
        let group_id = match process_group_id {
            Some(id) => id.to_string(),
            None => self.client.root_process_group_id().await?,
        };

        info!(group = %group_id, "creating sample flow");

        let generate = ProcessorSpec::new(GENERATE_FLOW_FILE_TYPE, "Generate Sample Data")
            .position(300.0, 200.0)
            .property("File Size", "1KB")
            .property("Batch Size", "1")
            .scheduling_period("60 sec");
        let generate_id = self
            .processors
            .create(generate, Some(group_id.as_str()))
            .await?
            .id;
        self.created_processors.push(generate_id.clone());

        let log = ProcessorSpec::new(LOG_ATTRIBUTE_TYPE, "Log Sample Data")
            .position(300.0, 400.0)
            .property("Log Level", "info")
            .property("Log Payload", "true")
            .auto_terminate(SUCCESS_RELATIONSHIP);
        let log_id = self
            .processors
            .create(log, Some(group_id.as_str()))
            .await?
            .id;
        self.created_processors.push(log_id.clone());

        let connection_id = self
            .create_connection(
                &generate_id,
                &log_id,
                [SUCCESS_RELATIONSHIP],
                Some(group_id.as_str()),
            )
            .await?
            .id;
        self.created_connections.push(connection_id.clone());

        info!(%generate_id, %log_id, %connection_id, "sample flow created");
        Ok(SampleFlow {
            generate_id,
            log_id,
            connection_id,
            process_group_id: group_id,
        })
    }

    /// Connect two processors of the same group on the given relationships
    pub async fn create_connection<I, S>(
        &self,
        source_id: &str,
        destination_id: &str,
        relationships: I,
        process_group_id: Option<&str>,
    ) -> RestClientResult<ConnectionEntity>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let group_id = match process_group_id {
            Some(id) => id.to_string(),
            None => self.client.root_process_group_id().await?,
        };

        let component = ConnectionComponent {
            id: None,
            source: Connectable::processor(source_id, group_id.as_str()),
            destination: Connectable::processor(destination_id, group_id.as_str()),
            selected_relationships: relationships.into_iter().map(Into::into).collect(),
        };
        validate_connection_component(&component)?;

        let entity: ConnectionEntity = self
            .client
            .post(
                &format!("/process-groups/{}/connections", group_id),
                &ComponentRequest::create(component),
            )
            .await?;

        info!(
            id = %entity.id,
            source = %source_id,
            destination = %destination_id,
            "connection created"
        );
        Ok(entity)
    }

    /// Start every tracked processor; per-item failures are tallied, not returned
    pub async fn start_all_processors(&self) -> StartSummary {
        StartSummary {
            outcomes: self.run_all(ProcessorState::Running).await,
        }
    }

    /// Stop every tracked processor; per-item failures are tallied, not returned
    pub async fn stop_all_processors(&self) -> StopSummary {
        StopSummary {
            outcomes: self.run_all(ProcessorState::Stopped).await,
        }
    }

    async fn run_all(&self, target: ProcessorState) -> Vec<ProcessorOutcome> {
        info!(
            count = self.created_processors.len(),
            state = %target,
            "changing run status of tracked processors"
        );

        let mut outcomes = Vec::with_capacity(self.created_processors.len());
        for processor_id in &self.created_processors {
            let result = match target {
                ProcessorState::Running => self.processors.start(processor_id).await,
                _ => self.processors.stop(processor_id).await,
            };

            let outcome = match result {
                Ok(outcome) => {
                    let processor = ProcessorRef {
                        id: processor_id.clone(),
                        name: outcome.processor.name().to_string(),
                    };
                    if outcome.status.changed() {
                        ProcessorOutcome::Changed(processor)
                    } else {
                        ProcessorOutcome::Unchanged(processor)
                    }
                }
                Err(e) => {
                    warn!(id = %processor_id, error = %e, "failed to change processor run status");
                    ProcessorOutcome::Failed(FailedProcessor {
                        id: processor_id.clone(),
                        error: e.to_string(),
                    })
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;

    fn processor_ref(id: &str) -> ProcessorRef {
        ProcessorRef {
            id: id.into(),
            name: format!("proc {}", id),
        }
    }

    #[test]
    fn test_summary_display() {
        let summary = StartSummary {
            outcomes: vec![
                ProcessorOutcome::Changed(processor_ref("a")),
                ProcessorOutcome::Unchanged(processor_ref("c")),
                ProcessorOutcome::Changed(processor_ref("b")),
            ],
        };
        assert_eq!(
            summary.to_string(),
            "2 started, 1 already running, 0 failed"
        );
        assert_eq!(summary.started()[1].id, "b");

        let summary = StopSummary {
            outcomes: vec![ProcessorOutcome::Failed(FailedProcessor {
                id: "x".into(),
                error: "boom".into(),
            })],
        };
        assert_eq!(
            summary.to_string(),
            "0 stopped, 0 already stopped, 1 failed"
        );
    }

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(
            serde_json::to_value(ProcessorOutcome::Unchanged(processor_ref("a"))).unwrap(),
            serde_json::json!({"outcome": "unchanged", "id": "a", "name": "proc a"})
        );
    }

    #[test]
    fn test_track_processor_deduplicates() {
        let client =
            NifiClient::from_url("https://localhost:8443", Credentials::default()).unwrap();
        let mut flow = FlowManager::new(&client);

        flow.track_processor("a");
        flow.track_processor("b");
        flow.track_processor("a");

        assert_eq!(
            flow.created_processors().to_vec(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(flow.created_connections().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_over_empty_tracking_sends_nothing() {
        let client =
            NifiClient::from_url("https://localhost:8443", Credentials::default()).unwrap();
        let flow = FlowManager::new(&client);

        assert_eq!(flow.start_all_processors().await, StartSummary::default());
        assert_eq!(flow.stop_all_processors().await, StopSummary::default());
        assert!(client.cached_token().is_none());
    }
}
