//! Kafka Connect REST API shapes (`/connectors` resource family).

mod config;
mod connector;
mod error;

pub use config::ConnectorConfig;
pub use connector::{
    ConnectorExpanded, ConnectorInfo, ConnectorState, ConnectorStatus, CreateConnectorRequest,
    TaskInfo,
};
pub use error::ConnectErrorBody;
