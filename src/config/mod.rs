mod basic;
mod connect;
mod database;

pub use basic::BasicConfig;
pub use connect::ConnectConfig;
pub use database::DatabaseConfig;

use crate::error::ConfigError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Relational store and pool settings (see `database` table in config.toml).
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Kafka Connect REST client settings (see `connect` table in config.toml).
    #[serde(default)]
    pub connect: ConnectConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "DEBEZ_";

impl Config {
    /// Builds a Figment that merges defaults, an optional config TOML file and the environment.
    ///
    /// Environment keys use the `DEBEZ_` prefix and `__` as the table separator, e.g.
    /// `DEBEZ_DATABASE__MAX_CONNECTIONS=20`.
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        };
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extracts the merged configuration and validates it.
    pub fn load() -> Result<Self, ConfigError> {
        let cfg: Self = Self::figment().extract().map_err(Box::new)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let db = &self.database;
        if db.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url must be non-empty".into()));
        }
        if db.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than zero".into(),
            ));
        }
        if db.min_connections > db.max_connections {
            return Err(ConfigError::Invalid(format!(
                "database.min_connections ({}) exceeds database.max_connections ({})",
                db.min_connections, db.max_connections
            )));
        }
        let timeouts = [
            ("basic.shutdown_timeout_secs", self.basic.shutdown_timeout_secs),
            ("basic.request_timeout_secs", self.basic.request_timeout_secs),
            ("connect.connect_timeout_secs", self.connect.connect_timeout_secs),
            ("connect.request_timeout_secs", self.connect.request_timeout_secs),
        ];
        if let Some((key, _)) = timeouts.iter().find(|(_, secs)| *secs == 0) {
            return Err(ConfigError::Invalid(format!("{key} must be greater than zero")));
        }
        Ok(())
    }
}
