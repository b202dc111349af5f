//! Client for the Kafka Connect REST API that manages Debezium connectors.
//!
//! Library surface only: no HTTP route of this service calls it.

mod client;

pub use client::ConnectClient;
pub use debez_schema::connect::{
    ConnectErrorBody, ConnectorConfig, ConnectorExpanded, ConnectorInfo, ConnectorState,
    ConnectorStatus, CreateConnectorRequest, TaskInfo,
};
