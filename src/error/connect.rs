use debez_schema::ConnectErrorBody;
use reqwest::StatusCode;
use thiserror::Error as ThisError;

/// Failures of the Kafka Connect REST client. Every variant names the client operation.
#[derive(Debug, ThisError)]
pub enum ConnectError {
    #[error("invalid Kafka Connect base URL: {0}")]
    Url(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{op}: request failed: {source}")]
    Transport {
        op: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{op}: failed to decode response: {source}")]
    Decode {
        op: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status with a structured error body.
    #[error("{op}: {} (status {status}, error_code {})", .body.message, .body.error_code)]
    Api {
        op: &'static str,
        status: StatusCode,
        body: ConnectErrorBody,
    },

    /// Non-success status whose body could not be decoded.
    #[error("{op}: unexpected status {status}")]
    UnexpectedStatus { op: &'static str, status: StatusCode },
}

impl ConnectError {
    /// Remote `message`, when the server sent a structured error body.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            ConnectError::Api { body, .. } => Some(body.message.as_str()),
            _ => None,
        }
    }

    /// HTTP status of the failed exchange, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ConnectError::Api { status, .. } | ConnectError::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            ConnectError::Transport { source, .. } | ConnectError::Decode { source, .. } => {
                source.status()
            }
            ConnectError::Url(_) | ConnectError::Client(_) => None,
        }
    }
}
