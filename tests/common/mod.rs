//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use webhook_fanout::{BackgroundTasks, HttpServer, RelayConfig, Shutdown};

/// What a mock destination saw.
#[derive(Debug)]
pub struct Received {
    pub method: Method,
    /// Path and query.
    pub target: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A destination that records every request it receives.
pub struct MockDestination {
    pub addr: SocketAddr,
    rx: mpsc::UnboundedReceiver<Received>,
}

#[allow(dead_code)]
impl MockDestination {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Wait for the next recorded request.
    pub async fn next(&mut self) -> Received {
        tokio::time::timeout(Duration::from_secs(5), self.rx.recv())
            .await
            .expect("destination received nothing within 5s")
            .expect("destination channel closed")
    }

    /// Assert nothing arrives within `wait`.
    pub async fn expect_nothing(&mut self, wait: Duration) {
        if let Ok(Some(received)) = tokio::time::timeout(wait, self.rx.recv()).await {
            panic!("unexpected delivery: {received:?}");
        }
    }
}

/// Start a destination that records requests on arrival, then waits
/// `delay` and answers with `status`.
pub async fn start_destination(status: StatusCode, delay: Duration) -> MockDestination {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    let app = Router::new().fallback(move |request: Request<Body>| {
        let tx = tx.clone();
        async move {
            let (parts, body) = request.into_parts();
            let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
            let target = parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_default();
            let _ = tx.send(Received {
                method: parts.method,
                target,
                headers: parts.headers,
                body,
            });
            tokio::time::sleep(delay).await;
            status
        }
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockDestination { addr, rx }
}

/// A healthy, instant destination.
#[allow(dead_code)]
pub async fn start_ok_destination() -> MockDestination {
    start_destination(StatusCode::OK, Duration::ZERO).await
}

/// A relay running on an ephemeral port.
#[allow(dead_code)]
pub struct TestRelay {
    pub addr: SocketAddr,
    pub tasks: BackgroundTasks,
    pub shutdown: Shutdown,
    pub config_updates: mpsc::UnboundedSender<RelayConfig>,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

#[allow(dead_code)]
impl TestRelay {
    /// URL of the relay with `path` appended verbatim.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server (and its drain) to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(10), self.handle)
            .await
            .expect("relay did not stop")
            .unwrap()
            .unwrap();
    }
}

pub async fn start_relay(mut config: RelayConfig) -> TestRelay {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let server = HttpServer::new(config).unwrap();
    let tasks = server.background_tasks();
    let shutdown = Shutdown::new();
    let (config_updates, updates_rx) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();

    let handle = tokio::spawn(async move { server.run(listener, updates_rx, server_shutdown).await });

    TestRelay {
        addr,
        tasks,
        shutdown,
        config_updates,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
