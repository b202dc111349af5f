pub mod connect;
pub mod users;

pub use connect::{
    ConnectErrorBody, ConnectorConfig, ConnectorExpanded, ConnectorInfo, ConnectorState,
    ConnectorStatus, CreateConnectorRequest, TaskInfo,
};
pub use users::{CreateUserDto, UpdateUserDto, UserDto};
