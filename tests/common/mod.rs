//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use product_relay::config::RelayConfig;
use product_relay::{HttpServer, ProductClient, Shutdown};
use tokio::net::TcpListener;
use url::Url;

/// Path of the product collection on the mock product service.
pub const PRODUCTS_PATH: &str = "/api/products";

/// One request as seen by the mock product service.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

/// Requests received by a mock product service, in arrival order.
#[allow(dead_code)]
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Recorded>>>);

#[allow(dead_code)]
impl Journal {
    pub fn record(&self, entry: Recorded) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }
}

/// Wrap a mock product service so every request it receives lands in `journal`.
///
/// JSON bodies are captured; other bodies pass through untouched.
#[allow(dead_code)]
pub fn recording(router: Router, journal: Journal) -> Router {
    router.layer(middleware::from_fn_with_state(journal, record))
}

#[allow(dead_code)]
async fn record(State(journal): State<Journal>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let is_json = parts
        .headers
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"));

    let (body, captured) = if is_json {
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).ok();
        (Body::from(bytes), value)
    } else {
        (body, None)
    };

    journal.record(Recorded {
        method: parts.method.clone(),
        path: parts.uri.path().to_string(),
        headers: parts.headers.clone(),
        body: captured,
    });

    next.run(Request::from_parts(parts, body)).await
}

/// A running relay in front of a mock product service.
pub struct Harness {
    pub relay: SocketAddr,
    pub http: reqwest::Client,
    shutdown: Shutdown,
}

impl Harness {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.relay, path)
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Serve `router` as the mock product service on an ephemeral port.
pub async fn start_downstream(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Start the relay pointed at the product collection on `downstream`.
pub async fn start_relay(downstream: SocketAddr) -> Harness {
    start_relay_with(downstream, RelayConfig::default()).await
}

pub async fn start_relay_with(downstream: SocketAddr, mut config: RelayConfig) -> Harness {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let relay = listener.local_addr().unwrap();

    config.listener.bind_address = relay.to_string();
    config.downstream.base_url = format!("http://{downstream}{PRODUCTS_PATH}");

    let client = ProductClient::new(
        reqwest::Client::builder().no_proxy().build().unwrap(),
        Url::parse(&config.downstream.base_url).unwrap(),
    );
    let server = HttpServer::new(config, client);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Harness {
        relay,
        http: reqwest::Client::builder().no_proxy().build().unwrap(),
        shutdown,
    }
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// A product as the mock product service would return it.
#[allow(dead_code)]
pub fn product_json(id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "nombre": "Hewlett Packard Multifuncional",
        "precio": 2600.0,
        "createAt": "2024-05-01T10:15:30Z",
        "foto": null,
        "categoria": {"id": "cat-1", "nombre": "Electrónico"}
    })
}
