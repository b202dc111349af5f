use serde::{Deserialize, Serialize};

/// Error envelope returned by Kafka Connect on non-success responses.
///
/// `{ "error_code": 409, "message": "Connector users-cdc already exists" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectErrorBody {
    pub error_code: u16,
    pub message: String,
}
