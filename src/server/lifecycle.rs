//! Listening socket ownership and graceful shutdown.
//!
//! `HttpServer::bind` moves the server from Stopped to Starting, `serve` runs the accept loop
//! (Running) until a `ServerHandle::stop` request arrives, then drains open connections
//! (Stopping) within the caller's deadline and settles in Stopped.

use crate::error::ServerError;
use axum::Router;
use hyper_util::{
    rt::{TokioExecutor, TokioIo, TokioTimer},
    server::{conn::auto::Builder, graceful::GracefulShutdown},
    service::TowerToHyperService,
};
use std::{future::Future, io, net::SocketAddr, time::Duration};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::{mpsc, oneshot, watch},
    task::JoinSet,
};
use tracing::{debug, error, info, warn};

/// Bound on receiving a complete request head, independent of the shutdown deadline.
pub const HEADER_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause before accepting again after a listener-level error such as fd exhaustion.
pub const ACCEPT_BACKOFF: Duration = Duration::from_secs(1);

/// Source of inbound TCP connections.
pub trait Acceptor: Send + 'static {
    fn accept(&mut self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send;

    fn local_addr(&self) -> io::Result<SocketAddr>;
}

impl Acceptor for TcpListener {
    fn accept(&mut self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send {
        TcpListener::accept(self)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpListener::local_addr(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

struct StopRequest {
    deadline: Duration,
    reply: oneshot::Sender<Result<(), ServerError>>,
}

pub struct HttpServer<A = TcpListener> {
    listener: A,
    local_addr: SocketAddr,
    router: Router,
    state: watch::Sender<ServerState>,
    stop_tx: mpsc::Sender<StopRequest>,
    stop_rx: mpsc::Receiver<StopRequest>,
}

/// Cloneable remote control for an [`HttpServer`].
#[derive(Clone)]
pub struct ServerHandle {
    state: watch::Receiver<ServerState>,
    stop_tx: mpsc::Sender<StopRequest>,
}

impl HttpServer {
    pub async fn bind(addr: SocketAddr, router: Router) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        Self::with_acceptor(listener, router).map_err(|source| ServerError::Bind { addr, source })
    }
}

impl<A: Acceptor> HttpServer<A> {
    /// Wraps an already listening acceptor.
    pub fn with_acceptor(listener: A, router: Router) -> io::Result<Self> {
        let local_addr = listener.local_addr()?;
        let (state, _) = watch::channel(ServerState::Starting);
        let (stop_tx, stop_rx) = mpsc::channel(1);

        Ok(Self {
            listener,
            local_addr,
            router,
            state,
            stop_tx,
            stop_rx,
        })
    }

    /// Actual bound address (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            state: self.state.subscribe(),
            stop_tx: self.stop_tx.clone(),
        }
    }

    /// Serves until stopped through a [`ServerHandle`].
    ///
    /// Accept errors never end the loop: per-connection failures are skipped and listener-level
    /// ones (fd exhaustion) are retried after [`ACCEPT_BACKOFF`]. The outcome of the stop,
    /// including a missed deadline, is reported to the caller of `stop`.
    pub async fn serve(self) {
        let HttpServer {
            mut listener,
            local_addr,
            router,
            state,
            stop_tx,
            mut stop_rx,
        } = self;

        let mut builder = Builder::new(TokioExecutor::new());
        builder
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(HEADER_READ_TIMEOUT);

        let graceful = GracefulShutdown::new();
        let mut connections = JoinSet::new();

        state.send_replace(ServerState::Running);
        info!(%local_addr, "http server running");

        let StopRequest { deadline, reply } = loop {
            tokio::select! {
                Some(request) = stop_rx.recv() => break request,
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let service = TowerToHyperService::new(router.clone());
                        let conn = builder
                            .serve_connection_with_upgrades(TokioIo::new(stream), service);
                        let watched = graceful.watch(conn.into_owned());
                        connections.spawn(async move {
                            if let Err(err) = watched.await {
                                debug!(%remote_addr, error = %err, "connection closed with error");
                            }
                        });
                    }
                    Err(err) if is_connection_error(&err) => {
                        debug!(error = %err, "accept failed for one connection");
                    }
                    Err(err) => {
                        error!(error = %err, backoff = ?ACCEPT_BACKOFF, "accept error");
                        tokio::select! {
                            Some(request) = stop_rx.recv() => break request,
                            () = tokio::time::sleep(ACCEPT_BACKOFF) => {}
                        }
                    }
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        };

        // Stop accepting before draining.
        drop(listener);
        drop(stop_tx);
        state.send_replace(ServerState::Stopping);

        info!(open = connections.len(), ?deadline, "shutting down http server");
        let outcome = match tokio::time::timeout(deadline, graceful.shutdown()).await {
            Ok(()) => Ok(()),
            Err(_) => {
                warn!(
                    open = connections.len(),
                    ?deadline,
                    "graceful shutdown deadline exceeded; aborting connections"
                );
                connections.abort_all();
                Err(ServerError::ShutdownTimeout { deadline })
            }
        };
        while connections.join_next().await.is_some() {}
        state.send_replace(ServerState::Stopped);
        info!("http server stopped");
        let _ = reply.send(outcome);
    }
}

impl ServerHandle {
    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    /// Stops accepting, waits for in-flight requests up to `deadline`, aborts the rest.
    ///
    /// Returns once the server reached Stopped.
    pub async fn stop(&self, deadline: Duration) -> Result<(), ServerError> {
        let (reply, outcome) = oneshot::channel();
        self.stop_tx
            .send(StopRequest { deadline, reply })
            .await
            .map_err(|_| ServerError::AlreadyStopped)?;
        outcome.await.map_err(|_| ServerError::AlreadyStopped)?
    }
}

/// Errors tied to a single connection; the listener itself is still usable.
fn is_connection_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}
