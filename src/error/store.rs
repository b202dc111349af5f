use thiserror::Error as ThisError;

/// Failures of the persistence gateway.
#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("user with id {id} not found")]
    NotFound { id: i64 },

    /// More than one row answered a lookup by primary identifier.
    #[error("multiple users ({rows}) found with id {id}")]
    Integrity { id: i64, rows: usize },

    #[error("{op}: {source}")]
    Query {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("database connect failed: {0}")]
    Connect(#[source] sqlx::Error),
}

impl StoreError {
    /// Adapter for `map_err` that tags a sqlx failure with the gateway operation.
    pub(crate) fn query(op: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| StoreError::Query { op, source }
    }
}
