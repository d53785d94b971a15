//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): inbound requests by operation, status
//! - `relay_request_duration_seconds` (histogram): inbound latency by operation
//! - `relay_downstream_requests_total` (counter): product service calls by operation, outcome
//!
//! Without an installed exporter every record is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    http::Method,
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter, serving scrapes on `addr`.
///
/// Must be called from within the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one completed inbound request.
pub fn record_request(operation: &'static str, status: u16, start: Instant) {
    let duration = start.elapsed().as_secs_f64();

    counter!(
        "relay_requests_total",
        "operation" => operation,
        "status" => status.to_string()
    )
    .increment(1);

    histogram!("relay_request_duration_seconds", "operation" => operation).record(duration);
}

/// Product operation served by a method on a matched route.
pub fn operation_of(method: &Method, route: Option<&str>) -> &'static str {
    match (method.as_str(), route) {
        ("GET", Some("/api/client")) => "list",
        ("POST", Some("/api/client")) => "create",
        ("GET", Some("/api/client/{id}")) => "get",
        ("PUT", Some("/api/client/{id}")) => "update",
        ("DELETE", Some("/api/client/{id}")) => "delete",
        ("POST", Some("/api/client/upload/{id}")) => "upload",
        _ => "other",
    }
}

/// Record one call to the product service.
pub fn record_downstream(operation: &'static str, outcome: &'static str) {
    counter!(
        "relay_downstream_requests_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

/// Middleware recording [`record_request`] for every routed request.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let operation = operation_of(
        request.method(),
        request.extensions().get::<MatchedPath>().map(MatchedPath::as_str),
    );

    let response = next.run(request).await;
    record_request(operation, response.status().as_u16(), start);
    response
}
