use serde::{Deserialize, Serialize};

use super::ConnectorConfig;

/// Body of `POST /connectors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateConnectorRequest {
    pub name: String,
    pub config: ConnectorConfig,
}

/// Connector descriptor returned by `GET /connectors/{name}`, `POST /connectors` and
/// `PUT /connectors/{name}/config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorInfo {
    pub name: String,
    pub config: ConnectorConfig,
    #[serde(default)]
    pub tasks: Vec<TaskInfo>,
    /// `source` or `sink`. Absent on freshly created connectors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

/// Task descriptor.
///
/// Status payloads carry `id`/`state`/`worker_id`; descriptor payloads carry
/// `connector`/`task`. Both decode into this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    #[serde(alias = "task")]
    pub id: u32,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub worker_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorState {
    pub state: String,
    pub worker_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

/// Body of `GET /connectors/{name}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorStatus {
    pub name: String,
    pub connector: ConnectorState,
    #[serde(default)]
    pub tasks: Vec<TaskInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

/// One value of the `GET /connectors?expand=...` map, keyed by connector name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorExpanded {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ConnectorStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<ConnectorInfo>,
}
