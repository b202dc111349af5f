mod api;
mod config;
mod connect;
mod server;
mod store;

pub use api::ApiError;
pub use config::ConfigError;
pub use connect::ConnectError;
pub use server::ServerError;
pub use store::StoreError;
