use serde::{Deserialize, Serialize};
use std::{sync::LazyLock, time::Duration};
use url::Url;

static DEFAULT_BASE_URL: LazyLock<Url> =
    LazyLock::new(|| Url::parse("http://localhost:8083").expect("valid default Kafka Connect URL"));

/// Kafka Connect REST endpoint settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectConfig {
    /// Base URL of the Kafka Connect REST API.
    /// TOML: `connect.base_url`. Env: `DEBEZ_CONNECT__BASE_URL`. Default: `http://localhost:8083`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// TCP connect timeout, in seconds.
    /// TOML: `connect.connect_timeout_secs`. Default: `10`.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Whole-exchange timeout for one REST call, in seconds.
    /// TOML: `connect.request_timeout_secs`. Default: `30`.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ConnectConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_base_url() -> Url {
    DEFAULT_BASE_URL.clone()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}
