use std::{io, net::SocketAddr, time::Duration};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server is not running")]
    AlreadyStopped,

    /// In-flight connections outlived the shutdown deadline and were aborted.
    #[error("graceful shutdown exceeded {deadline:?}; remaining connections aborted")]
    ShutdownTimeout { deadline: Duration },
}
