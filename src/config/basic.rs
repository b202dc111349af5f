use serde::{Deserialize, Serialize};
use std::{
    net::{IpAddr, Ipv4Addr},
    time::Duration,
};

const DEVELOPMENT: &str = "development";

/// Basic (core) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    /// Deployment environment name (e.g., "development", "production").
    /// TOML: `basic.environment`. Env: `DEBEZ_BASIC__ENVIRONMENT`. Default: `development`.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// HTTP server listen address (e.g., "0.0.0.0", "127.0.0.1").
    /// TOML: `basic.listen_addr`. Default: `0.0.0.0`.
    #[serde(default = "default_listen_ip")]
    pub listen_addr: IpAddr,

    /// HTTP server listen port.
    /// TOML: `basic.listen_port`. Env: `DEBEZ_BASIC__LISTEN_PORT`. Default: `8080`.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug").
    /// TOML: `basic.loglevel`. Empty means `debug` in development and `info` elsewhere.
    #[serde(default)]
    pub loglevel: String,

    /// Upper bound for draining in-flight requests on shutdown, in seconds.
    /// TOML: `basic.shutdown_timeout_secs`. Default: `30`.
    #[serde(default = "default_timeout_secs")]
    pub shutdown_timeout_secs: u64,

    /// Per-request deadline, in seconds. Expired requests are answered with 408.
    /// TOML: `basic.request_timeout_secs`. Default: `30`.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            listen_addr: default_listen_ip(),
            listen_port: default_listen_port(),
            loglevel: String::new(),
            shutdown_timeout_secs: default_timeout_secs(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl BasicConfig {
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case(DEVELOPMENT)
            || self.environment.eq_ignore_ascii_case("dev")
    }

    /// Level used when `RUST_LOG` is not set.
    pub fn effective_loglevel(&self) -> &str {
        match self.loglevel.trim() {
            "" if self.is_development() => "debug",
            "" => "info",
            level => level,
        }
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_environment() -> String {
    DEVELOPMENT.to_string()
}

/// Default IP address for the HTTP server listen address.
fn default_listen_ip() -> IpAddr {
    Ipv4Addr::new(0, 0, 0, 0).into()
}

/// Default port for the HTTP server.
fn default_listen_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}
