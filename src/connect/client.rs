use crate::config::ConnectConfig;
use crate::error::ConnectError;
use crate::utils::logging::{body_preview, with_pretty_json_debug};
use debez_schema::connect::{
    ConnectErrorBody, ConnectorConfig, ConnectorExpanded, ConnectorInfo, ConnectorStatus,
    CreateConnectorRequest,
};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::{debug, info};
use url::Url;

const CONNECTORS: &str = "connectors";

/// Stateless Kafka Connect REST client.
///
/// One HTTP exchange per call, no retries. Connection reuse is left to the shared
/// `reqwest::Client`, so clones are cheap and safe to use concurrently.
#[derive(Debug, Clone)]
pub struct ConnectClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ConnectClient {
    pub fn new(base_url: Url, client: reqwest::Client) -> Result<Self, ConnectError> {
        if base_url.cannot_be_a_base() {
            return Err(ConnectError::Url(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    /// Builds a client with its own connection pool and the configured timeouts.
    pub fn from_config(cfg: &ConnectConfig) -> Result<Self, ConnectError> {
        let client = reqwest::Client::builder()
            .connect_timeout(cfg.connect_timeout())
            .timeout(cfg.request_timeout())
            .build()
            .map_err(ConnectError::Client)?;
        Self::new(cfg.base_url.clone(), client)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET /connectors
    pub async fn list_connectors(&self) -> Result<Vec<String>, ConnectError> {
        let req = self.client.get(self.endpoint(&[CONNECTORS]));
        fetch_json("list_connectors", req, &[StatusCode::OK]).await
    }

    /// GET /connectors/{name}
    pub async fn get_connector(&self, name: &str) -> Result<ConnectorInfo, ConnectError> {
        let req = self.client.get(self.endpoint(&[CONNECTORS, name]));
        fetch_json("get_connector", req, &[StatusCode::OK]).await
    }

    /// GET /connectors?expand=status, keyed by connector name.
    pub async fn get_connector_statuses(
        &self,
    ) -> Result<BTreeMap<String, ConnectorStatus>, ConnectError> {
        let mut url = self.endpoint(&[CONNECTORS]);
        url.query_pairs_mut().append_pair("expand", "status");

        let expanded: BTreeMap<String, ConnectorExpanded> =
            fetch_json("get_connector_statuses", self.client.get(url), &[StatusCode::OK]).await?;

        Ok(expanded
            .into_iter()
            .filter_map(|(name, entry)| entry.status.map(|status| (name, status)))
            .collect())
    }

    /// GET /connectors/{name}/status
    pub async fn get_connector_status(&self, name: &str) -> Result<ConnectorStatus, ConnectError> {
        let req = self.client.get(self.endpoint(&[CONNECTORS, name, "status"]));
        fetch_json("get_connector_status", req, &[StatusCode::OK]).await
    }

    /// POST /connectors. Only `201 Created` is success.
    pub async fn create_connector(
        &self,
        request: &CreateConnectorRequest,
    ) -> Result<ConnectorInfo, ConnectError> {
        with_pretty_json_debug(
            &CreateConnectorRequest {
                name: request.name.clone(),
                config: request.config.redacted(),
            },
            |body| debug!(connector = %request.name, body = %body, "creating connector"),
        );

        let req = self.client.post(self.endpoint(&[CONNECTORS])).json(request);
        let info: ConnectorInfo =
            fetch_json("create_connector", req, &[StatusCode::CREATED]).await?;

        info!(connector = %info.name, tasks = info.tasks.len(), "connector created");
        Ok(info)
    }

    /// PUT /connectors/{name}/config. Creates the connector when it does not exist yet.
    pub async fn update_connector_config(
        &self,
        name: &str,
        config: &ConnectorConfig,
    ) -> Result<ConnectorInfo, ConnectError> {
        with_pretty_json_debug(&config.redacted(), |body| {
            debug!(connector = %name, body = %body, "updating connector config");
        });

        let req = self
            .client
            .put(self.endpoint(&[CONNECTORS, name, "config"]))
            .json(config);
        fetch_json(
            "update_connector_config",
            req,
            &[StatusCode::OK, StatusCode::CREATED],
        )
        .await
    }

    /// PUT /connectors/{name}/pause
    pub async fn pause_connector(&self, name: &str) -> Result<(), ConnectError> {
        let req = self.client.put(self.endpoint(&[CONNECTORS, name, "pause"]));
        execute("pause_connector", req, &[StatusCode::ACCEPTED]).await?;
        info!(connector = %name, "connector pause requested");
        Ok(())
    }

    /// PUT /connectors/{name}/resume
    pub async fn resume_connector(&self, name: &str) -> Result<(), ConnectError> {
        let req = self.client.put(self.endpoint(&[CONNECTORS, name, "resume"]));
        execute("resume_connector", req, &[StatusCode::ACCEPTED]).await?;
        info!(connector = %name, "connector resume requested");
        Ok(())
    }

    /// POST /connectors/{name}/restart
    pub async fn restart_connector(
        &self,
        name: &str,
        include_tasks: bool,
        only_failed: bool,
    ) -> Result<(), ConnectError> {
        let mut url = self.endpoint(&[CONNECTORS, name, "restart"]);
        url.query_pairs_mut()
            .append_pair("includeTasks", bool_param(include_tasks))
            .append_pair("onlyFailed", bool_param(only_failed));

        execute(
            "restart_connector",
            self.client.post(url),
            &[StatusCode::OK, StatusCode::ACCEPTED, StatusCode::NO_CONTENT],
        )
        .await?;
        info!(connector = %name, include_tasks, only_failed, "connector restart requested");
        Ok(())
    }

    /// DELETE /connectors/{name}. Only `204 No Content` is success.
    pub async fn delete_connector(&self, name: &str) -> Result<(), ConnectError> {
        let req = self.client.delete(self.endpoint(&[CONNECTORS, name]));
        execute("delete_connector", req, &[StatusCode::NO_CONTENT]).await?;
        info!(connector = %name, "connector deleted");
        Ok(())
    }

    /// Base URL with `segments` appended as percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejected cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn bool_param(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

async fn fetch_json<T: DeserializeOwned>(
    op: &'static str,
    req: RequestBuilder,
    expected: &[StatusCode],
) -> Result<T, ConnectError> {
    let resp = execute(op, req, expected).await?;
    resp.json::<T>()
        .await
        .map_err(|source| ConnectError::Decode { op, source })
}

async fn execute(
    op: &'static str,
    req: RequestBuilder,
    expected: &[StatusCode],
) -> Result<Response, ConnectError> {
    let resp = req
        .send()
        .await
        .map_err(|source| ConnectError::Transport { op, source })?;

    let status = resp.status();
    debug!(op, %status, url = %resp.url(), "kafka connect response");
    if expected.contains(&status) {
        Ok(resp)
    } else {
        Err(remote_error(op, resp).await)
    }
}

/// Best-effort decode of the structured error body of a non-success response.
async fn remote_error(op: &'static str, resp: Response) -> ConnectError {
    let status = resp.status();
    let text = match resp.text().await {
        Ok(text) => text,
        Err(err) => {
            debug!(op, %status, error = %err, "failed to read kafka connect error body");
            return ConnectError::UnexpectedStatus { op, status };
        }
    };

    match serde_json::from_str::<ConnectErrorBody>(&text) {
        Ok(body) => ConnectError::Api { op, status, body },
        Err(err) => {
            debug!(
                op,
                %status,
                error = %err,
                body = %body_preview(&text),
                "kafka connect error body is not structured"
            );
            ConnectError::UnexpectedStatus { op, status }
        }
    }
}
