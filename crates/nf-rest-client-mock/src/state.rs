//! In-memory model of the mocked NiFi instance

use axum::http::{Method, StatusCode};
use nf_rest_api_contract::{
    ConnectionEntity, Position, ProcessorComponent, ProcessorConfig, ProcessorEntity,
    ProcessorState, Revision,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{MockError, MockResult};

pub(crate) type SharedState = Arc<Mutex<MockState>>;

pub(crate) fn lock(state: &SharedState) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Identity and metadata of the mocked instance
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub username: String,
    pub password: String,
    pub token: String,
    pub root_group_id: String,
    pub version: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            username: "admin".into(),
            password: "adminadminadmin".into(),
            token: format!("mock-token-{}", uuid::Uuid::new_v4().simple()),
            root_group_id: uuid::Uuid::new_v4().to_string(),
            version: "2.0.0".into(),
        }
    }
}

/// A request as seen by the mock server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
}

impl RecordedRequest {
    /// Request under the API root other than the token endpoint
    pub fn is_resource(&self) -> bool {
        self.path.starts_with("/nifi-api/") && self.path != "/nifi-api/access/token"
    }

    pub fn is_mutating(&self) -> bool {
        self.is_resource() && self.method != Method::GET
    }
}

#[derive(Debug)]
pub(crate) struct MockState {
    pub config: MockConfig,
    pub token_rejection: Option<StatusCode>,
    pub ready: bool,
    pub processors: Vec<ProcessorEntity>,
    pub connections: Vec<ConnectionEntity>,
    pub failing: HashSet<String>,
    pub modified_after_read: HashSet<String>,
    pub requests: Vec<RecordedRequest>,
}

impl MockState {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            token_rejection: None,
            ready: true,
            processors: Vec::new(),
            connections: Vec::new(),
            failing: HashSet::new(),
            modified_after_read: HashSet::new(),
            requests: Vec::new(),
        }
    }

    /// Map the `root` alias or the root ID onto the root ID
    pub fn resolve_group(&self, group_id: &str) -> MockResult<String> {
        if group_id == "root" || group_id == self.config.root_group_id {
            Ok(self.config.root_group_id.clone())
        } else {
            Err(MockError::NotFound(format!(
                "Unable to find process group with id '{}'.",
                group_id
            )))
        }
    }

    fn check_failing(&self, processor_id: &str) -> MockResult<()> {
        if self.failing.contains(processor_id) {
            return Err(MockError::Internal(format!(
                "Injected failure for processor '{}'.",
                processor_id
            )));
        }
        Ok(())
    }

    pub fn processor(&self, processor_id: &str) -> MockResult<&ProcessorEntity> {
        self.check_failing(processor_id)?;
        self.processors
            .iter()
            .find(|p| p.id == processor_id)
            .ok_or_else(|| not_found(processor_id))
    }

    pub fn processor_mut(&mut self, processor_id: &str) -> MockResult<&mut ProcessorEntity> {
        self.check_failing(processor_id)?;
        self.processors
            .iter_mut()
            .find(|p| p.id == processor_id)
            .ok_or_else(|| not_found(processor_id))
    }

    /// Store a new processor in the root group and return it
    pub fn insert_processor(
        &mut self,
        mut component: ProcessorComponent,
        state: ProcessorState,
    ) -> ProcessorEntity {
        let id = uuid::Uuid::new_v4().to_string();
        component.id = Some(id.clone());
        component.parent_group_id = Some(self.config.root_group_id.clone());
        component.state = Some(state);
        if component.position.is_none() {
            component.position = Some(Position::new(0.0, 0.0));
        }
        if component.config.is_none() {
            component.config = Some(ProcessorConfig::default());
        }

        let entity = ProcessorEntity {
            id,
            revision: Revision::at(1),
            component,
        };
        self.processors.push(entity.clone());
        entity
    }

    pub fn is_connected(&self, processor_id: &str) -> bool {
        self.connections.iter().any(|c| {
            c.source_id.as_deref() == Some(processor_id)
                || c.destination_id.as_deref() == Some(processor_id)
        })
    }
}

fn not_found(processor_id: &str) -> MockError {
    MockError::NotFound(format!(
        "Unable to find processor with id '{}'.",
        processor_id
    ))
}
