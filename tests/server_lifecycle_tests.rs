use axum::{Router, routing::get};
use debez::error::ServerError;
use debez::server::{Acceptor, HttpServer, ServerHandle, ServerState};
use std::{
    io,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};

/// `EMFILE` on Linux and macOS.
const EMFILE: i32 = 24;

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_millis(300)).await;
    "done"
}

async fn drain() -> &'static str {
    tokio::time::sleep(Duration::from_secs(1)).await;
    "drained"
}

async fn hang() -> &'static str {
    tokio::time::sleep(Duration::from_secs(30)).await;
    "too late"
}

fn test_router() -> Router {
    Router::new()
        .route("/fast", get(|| async { "ok" }))
        .route("/slow", get(slow))
        .route("/drain", get(drain))
        .route("/hang", get(hang))
}

async fn wait_for(handle: &ServerHandle, wanted: ServerState) {
    for _ in 0..200 {
        if handle.state() == wanted {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(handle.state(), wanted);
}

async fn run<A: Acceptor>(server: HttpServer<A>) -> (SocketAddr, ServerHandle, JoinHandle<()>) {
    let addr = server.local_addr();
    let handle = server.handle();
    assert_eq!(handle.state(), ServerState::Starting);

    let task = tokio::spawn(server.serve());
    wait_for(&handle, ServerState::Running).await;
    (addr, handle, task)
}

async fn start() -> (SocketAddr, ServerHandle, JoinHandle<()>) {
    let server = HttpServer::bind(SocketAddr::from(([127, 0, 0, 1], 0)), test_router())
        .await
        .expect("bind");
    run(server).await
}

/// Listener that reports "too many open files" for its first `failures` accepts.
struct ExhaustedListener {
    inner: TcpListener,
    failures: Arc<AtomicUsize>,
}

impl Acceptor for ExhaustedListener {
    async fn accept(&mut self) -> io::Result<(TcpStream, SocketAddr)> {
        let left = self.failures.load(Ordering::SeqCst);
        if left > 0 {
            self.failures.store(left - 1, Ordering::SeqCst);
            return Err(io::Error::from_raw_os_error(EMFILE));
        }
        self.inner.accept().await
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }
}

async fn start_exhausted(
    failures: usize,
) -> (SocketAddr, ServerHandle, JoinHandle<()>, Arc<AtomicUsize>) {
    let inner = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let failures = Arc::new(AtomicUsize::new(failures));
    let listener = ExhaustedListener {
        inner,
        failures: failures.clone(),
    };
    let server = HttpServer::with_acceptor(listener, test_router()).expect("wrap listener");
    let (addr, handle, task) = run(server).await;
    (addr, handle, task, failures)
}

#[tokio::test]
async fn stop_waits_for_in_flight_requests() {
    let (addr, handle, task) = start().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("http://{addr}/fast"))
        .send()
        .await
        .expect("fast request");
    assert_eq!(resp.text().await.expect("body"), "ok");

    let slow_client = reqwest::Client::new();
    let in_flight = tokio::spawn(async move {
        slow_client
            .get(format!("http://{addr}/slow"))
            .send()
            .await?
            .text()
            .await
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    handle
        .stop(Duration::from_secs(5))
        .await
        .expect("graceful stop within deadline");
    assert_eq!(handle.state(), ServerState::Stopped);

    let body = in_flight
        .await
        .expect("join in-flight request")
        .expect("in-flight request completes");
    assert_eq!(body, "done");

    task.await.expect("join serve task");

    // Listener is closed.
    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn stop_aborts_connections_past_the_deadline() {
    let (addr, handle, task) = start().await;

    let client = reqwest::Client::new();
    let in_flight = tokio::spawn(async move {
        client.get(format!("http://{addr}/hang")).send().await
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let err = handle
        .stop(Duration::from_millis(200))
        .await
        .expect_err("deadline must be exceeded");
    assert!(
        matches!(err, ServerError::ShutdownTimeout { .. }),
        "got {err:?}"
    );
    assert_eq!(handle.state(), ServerState::Stopped);

    let outcome = tokio::time::timeout(Duration::from_secs(5), in_flight)
        .await
        .expect("aborted request resolves promptly")
        .expect("join in-flight request");
    assert!(outcome.is_err(), "aborted request must not succeed");

    task.await.expect("join serve task");
}

#[tokio::test]
async fn second_stop_reports_already_stopped() {
    let (_addr, handle, task) = start().await;

    handle
        .stop(Duration::from_secs(1))
        .await
        .expect("first stop");
    task.await.expect("join serve task");

    let err = handle
        .stop(Duration::from_secs(1))
        .await
        .expect_err("second stop must fail");
    assert!(matches!(err, ServerError::AlreadyStopped), "got {err:?}");
}

#[tokio::test]
async fn incomplete_request_head_is_cut_off() {
    let (addr, handle, _task) = start().await;

    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream
        .write_all(b"GET /fast HTTP/1.1\r\nHost: localhost\r\n")
        .await
        .expect("write partial head");

    let mut buf = Vec::new();
    let read = tokio::time::timeout(Duration::from_secs(10), stream.read_to_end(&mut buf))
        .await
        .expect("server must close a stalled connection");
    // Either a bare close or a 408 before closing.
    if read.is_ok() && !buf.is_empty() {
        let head = String::from_utf8_lossy(&buf);
        assert!(head.starts_with("HTTP/1.1 408"), "got {head}");
    }

    handle.stop(Duration::from_secs(1)).await.expect("stop");
}

#[tokio::test]
async fn bind_to_a_busy_port_fails() {
    let (addr, handle, _task) = start().await;

    let err = HttpServer::bind(addr, test_router())
        .await
        .err()
        .expect("port is taken");
    assert!(matches!(err, ServerError::Bind { .. }), "got {err:?}");

    handle.stop(Duration::from_secs(1)).await.expect("stop");
}

#[tokio::test]
async fn new_connections_are_refused_while_draining() {
    let (addr, handle, task) = start().await;

    let client = reqwest::Client::new();
    let in_flight = tokio::spawn(async move {
        client
            .get(format!("http://{addr}/drain"))
            .send()
            .await?
            .text()
            .await
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let stopper = handle.clone();
    let stop = tokio::spawn(async move { stopper.stop(Duration::from_secs(5)).await });

    wait_for(&handle, ServerState::Stopping).await;
    assert!(
        TcpStream::connect(addr).await.is_err(),
        "listener must be closed while draining"
    );
    assert_eq!(handle.state(), ServerState::Stopping);

    let body = in_flight
        .await
        .expect("join in-flight request")
        .expect("in-flight request completes");
    assert_eq!(body, "drained");

    stop.await.expect("join stop").expect("drain within deadline");
    assert_eq!(handle.state(), ServerState::Stopped);
    task.await.expect("join serve task");
}

#[tokio::test]
async fn listener_errors_back_off_and_keep_serving() {
    let (addr, handle, task, failures) = start_exhausted(2).await;

    // Both injected errors are consumed by the accept loop, with a backoff after each.
    let resp = tokio::time::timeout(
        Duration::from_secs(10),
        reqwest::get(format!("http://{addr}/fast")),
    )
    .await
    .expect("server answers after the backoff")
    .expect("fast request");
    assert_eq!(resp.text().await.expect("body"), "ok");
    assert_eq!(failures.load(Ordering::SeqCst), 0);
    assert_eq!(handle.state(), ServerState::Running);
    assert!(!task.is_finished());

    handle.stop(Duration::from_secs(1)).await.expect("stop");
    task.await.expect("join serve task");
}

#[tokio::test]
async fn stop_is_honored_during_accept_backoff() {
    let (_addr, handle, task, _failures) = start_exhausted(usize::MAX).await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(handle.state(), ServerState::Running);

    tokio::time::timeout(Duration::from_millis(900), handle.stop(Duration::from_secs(1)))
        .await
        .expect("stop must not wait out the backoff")
        .expect("stop");
    assert_eq!(handle.state(), ServerState::Stopped);
    task.await.expect("join serve task");
}
