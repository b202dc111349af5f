use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

const REDACTED: &str = "******";

/// Connector configuration.
///
/// The well-known Debezium keys are typed fields; everything else a connector plugin accepts
/// lands in `extra` and is written back verbatim at the top level of the config object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    #[serde(rename = "connector.class", default)]
    pub connector_class: String,

    #[serde(rename = "tasks.max", default, skip_serializing_if = "Option::is_none")]
    pub tasks_max: Option<String>,

    #[serde(
        rename = "database.hostname",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub database_hostname: Option<String>,

    #[serde(
        rename = "database.port",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub database_port: Option<String>,

    #[serde(
        rename = "database.user",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub database_user: Option<String>,

    #[serde(
        rename = "database.password",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub database_password: Option<String>,

    #[serde(
        rename = "database.dbname",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub database_dbname: Option<String>,

    #[serde(
        rename = "database.server.name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub database_server_name: Option<String>,

    /// Free-form plugin parameters (`topic.prefix`, `plugin.name`, `table.include.list`, ...).
    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl ConnectorConfig {
    pub fn new(connector_class: impl Into<String>) -> Self {
        Self {
            connector_class: connector_class.into(),
            ..Default::default()
        }
    }

    /// Sets a free-form parameter, returning the previous value if any.
    pub fn insert_extra(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.extra.insert(key.into(), value.into())
    }

    /// Copy with secrets masked, for logging.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.database_password.is_some() {
            copy.database_password = Some(REDACTED.to_string());
        }
        for (key, value) in &mut copy.extra {
            if key.contains("password") || key.contains("secret") {
                *value = Value::String(REDACTED.to_string());
            }
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn well_known_keys_and_extras_share_one_object() {
        let mut cfg = ConnectorConfig::new("io.debezium.connector.postgresql.PostgresConnector");
        cfg.tasks_max = Some("1".to_string());
        cfg.database_hostname = Some("db".to_string());
        cfg.database_port = Some("5432".to_string());
        cfg.insert_extra("topic.prefix", "users");

        let value = serde_json::to_value(&cfg).expect("serialize config");
        assert_eq!(
            value,
            json!({
                "connector.class": "io.debezium.connector.postgresql.PostgresConnector",
                "tasks.max": "1",
                "database.hostname": "db",
                "database.port": "5432",
                "topic.prefix": "users"
            })
        );

        let back: ConnectorConfig = serde_json::from_value(value).expect("deserialize config");
        assert_eq!(back, cfg);
    }

    #[test]
    fn unknown_keys_land_in_extra() {
        let cfg: ConnectorConfig = serde_json::from_value(json!({
            "connector.class": "C",
            "database.user": "postgres",
            "plugin.name": "pgoutput",
            "snapshot.mode": "initial"
        }))
        .expect("deserialize config");

        assert_eq!(cfg.database_user.as_deref(), Some("postgres"));
        assert_eq!(cfg.extra.len(), 2);
        assert_eq!(cfg.extra.get("plugin.name"), Some(&json!("pgoutput")));
    }

    #[test]
    fn redacted_masks_passwords() {
        let mut cfg = ConnectorConfig::new("C");
        cfg.database_password = Some("hunter2".to_string());
        cfg.insert_extra("database.history.kafka.sasl.password", "s3cr3t");
        cfg.insert_extra("topic.prefix", "users");

        let redacted = cfg.redacted();
        assert_eq!(redacted.database_password.as_deref(), Some(REDACTED));
        assert_eq!(
            redacted.extra.get("database.history.kafka.sasl.password"),
            Some(&json!(REDACTED))
        );
        assert_eq!(redacted.extra.get("topic.prefix"), Some(&json!("users")));
        assert_eq!(cfg.database_password.as_deref(), Some("hunter2"));
    }
}
