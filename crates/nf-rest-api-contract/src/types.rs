//! API contract types for the NiFi management REST service

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::error::ApiContractError;

/// Processor run states as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessorState {
    Running,
    Stopped,
    Disabled,
    #[serde(other)]
    Unknown,
}

impl ProcessorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessorState::Running => "RUNNING",
            ProcessorState::Stopped => "STOPPED",
            ProcessorState::Disabled => "DISABLED",
            ProcessorState::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ProcessorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessorState {
    type Err = ApiContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RUNNING" => Ok(ProcessorState::Running),
            "STOPPED" => Ok(ProcessorState::Stopped),
            "DISABLED" => Ok(ProcessorState::Disabled),
            _ => Err(ApiContractError::InvalidProcessorState(s.to_string())),
        }
    }
}

/// Kinds of components a connection can attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectableType {
    Processor,
    InputPort,
    OutputPort,
    Funnel,
    RemoteInputPort,
    RemoteOutputPort,
}

/// Optimistic-concurrency revision attached to every mutating request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub version: i64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub client_id: Option<String>,
}

impl Revision {
    /// Revision sent when creating a component; the server assigns the rest
    pub fn initial() -> Self {
        Self::at(0)
    }

    pub fn at(version: i64) -> Self {
        Self {
            version,
            client_id: None,
        }
    }
}

/// Canvas position of a component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Processor configuration block
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorConfig {
    #[serde(default)]
    pub properties: BTreeMap<String, Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub scheduling_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub auto_terminated_relationships: Option<Vec<String>>,
}

/// Processor component as sent on create and returned on read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorComponent {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent_group_id: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "Processor type cannot be empty"))]
    pub processor_type: String,
    #[validate(length(min = 1, message = "Processor name cannot be empty"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub config: Option<ProcessorConfig>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub state: Option<ProcessorState>,
}

impl ProcessorComponent {
    /// Type name without its package prefix
    pub fn short_type(&self) -> &str {
        self.processor_type
            .rsplit('.')
            .next()
            .unwrap_or(&self.processor_type)
    }
}

/// Processor entity returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorEntity {
    pub id: String,
    pub revision: Revision,
    pub component: ProcessorComponent,
}

impl ProcessorEntity {
    /// Current run state, `Unknown` if the server omitted it
    pub fn state(&self) -> ProcessorState {
        self.component.state.unwrap_or(ProcessorState::Unknown)
    }

    pub fn name(&self) -> &str {
        &self.component.name
    }
}

/// Processor list response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessorsEntity {
    #[serde(default)]
    pub processors: Vec<ProcessorEntity>,
}

/// Generic `{revision, component}` envelope for create requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRequest<T> {
    pub revision: Revision,
    pub component: T,
}

impl<T> ComponentRequest<T> {
    /// Envelope with the initial revision used for creation
    pub fn create(component: T) -> Self {
        Self {
            revision: Revision::initial(),
            component,
        }
    }
}

/// Run-status update request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatusEntity {
    pub revision: Revision,
    pub state: ProcessorState,
}

/// One end of a connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Connectable {
    #[validate(length(min = 1, message = "Connectable id cannot be empty"))]
    pub id: String,
    pub group_id: String,
    #[serde(rename = "type")]
    pub connectable_type: ConnectableType,
}

impl Connectable {
    pub fn processor(id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group_id: group_id.into(),
            connectable_type: ConnectableType::Processor,
        }
    }
}

/// Connection component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionComponent {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    #[validate(nested)]
    pub source: Connectable,
    #[validate(nested)]
    pub destination: Connectable,
    #[validate(length(min = 1, message = "At least one relationship must be selected"))]
    pub selected_relationships: Vec<String>,
}

/// Connection entity returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionEntity {
    pub id: String,
    pub revision: Revision,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub destination_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub component: Option<ConnectionComponent>,
}

/// Root (or any) process group flow lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessGroupFlowEntity {
    pub process_group_flow: ProcessGroupFlow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessGroupFlow {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent_group_id: Option<String>,
}

/// Server about information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AboutEntity {
    pub about: About,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct About {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_processor_entity_parsing() {
        let value = json!({
            "id": "abc",
            "uri": "https://localhost:8443/nifi-api/processors/abc",
            "revision": {"version": 3, "clientId": "c1"},
            "component": {
                "id": "abc",
                "parentGroupId": "root-id",
                "type": "org.apache.nifi.processors.standard.LogAttribute",
                "name": "Log Sample Data",
                "state": "RUNNING",
                "config": {
                    "properties": {"Log Level": "info", "Attributes to Log": null},
                    "autoTerminatedRelationships": ["success"]
                }
            }
        });

        let entity: ProcessorEntity = serde_json::from_value(value).unwrap();
        assert_eq!(entity.revision.version, 3);
        assert_eq!(entity.state(), ProcessorState::Running);
        assert_eq!(entity.component.short_type(), "LogAttribute");
        let config = entity.component.config.unwrap();
        assert_eq!(config.properties.get("Attributes to Log"), Some(&None));
    }

    #[test]
    fn test_unrecognised_state_is_unknown() {
        let state: ProcessorState = serde_json::from_str("\"RUN_ONCE\"").unwrap();
        assert_eq!(state, ProcessorState::Unknown);
        assert!("RUN_ONCE".parse::<ProcessorState>().is_err());
        let parsed: ProcessorState = "running".parse().unwrap();
        assert_eq!(parsed, ProcessorState::Running);
    }

    #[test]
    fn test_run_status_request_shape() {
        let request = RunStatusEntity {
            revision: Revision::at(7),
            state: ProcessorState::Stopped,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"revision": {"version": 7}, "state": "STOPPED"})
        );
    }

    #[test]
    fn test_connection_request_shape() {
        let request = ComponentRequest::create(ConnectionComponent {
            id: None,
            source: Connectable::processor("a", "g"),
            destination: Connectable::processor("b", "g"),
            selected_relationships: vec!["success".into()],
        });
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "revision": {"version": 0},
                "component": {
                    "source": {"id": "a", "groupId": "g", "type": "PROCESSOR"},
                    "destination": {"id": "b", "groupId": "g", "type": "PROCESSOR"},
                    "selectedRelationships": ["success"]
                }
            })
        );
    }

    #[test]
    fn test_auto_terminated_relationships_omitted_when_unset() {
        let config = ProcessorConfig {
            properties: BTreeMap::new(),
            scheduling_period: Some("60 sec".into()),
            auto_terminated_relationships: None,
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value,
            json!({"properties": {}, "schedulingPeriod": "60 sec"})
        );
    }
}
