use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Relational store settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database URL for SQLite.
    /// TOML: `database.url`. Env: `DEBEZ_DATABASE__URL`. Default: `sqlite://data.db`.
    #[serde(default = "default_url")]
    pub url: String,

    /// Upper bound of pooled connections.
    /// TOML: `database.max_connections`. Default: `10`.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connections kept open while idle.
    /// TOML: `database.min_connections`. Default: `5`.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// How long a request waits for a pooled connection, in seconds.
    /// TOML: `database.acquire_timeout_secs`. Default: `5`.
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

impl DatabaseConfig {
    /// Config for a given URL with the default pool bounds.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

fn default_url() -> String {
    "sqlite://data.db".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    5
}
