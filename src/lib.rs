pub mod config;
pub mod connect;
pub mod db;
pub mod error;
pub mod server;
pub mod service;
pub(crate) mod utils;

pub use config::Config;
pub use connect::ConnectClient;
pub use error::{ApiError, ConfigError, ConnectError, ServerError, StoreError};
pub use server::{AppState, HttpServer, ServerHandle, ServerState, app_router};
