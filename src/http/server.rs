//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the product routes
//! - Wire up middleware (request ID, tracing, body limits, metrics)
//! - Serve on a listener until the shutdown signal fires

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{LimitsConfig, RelayConfig};
use crate::downstream::ProductClient;
use crate::http::handlers;
use crate::http::request::{request_id_of, MakeRequestUuid, X_REQUEST_ID};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Shared client for the product service.
    pub client: ProductClient,
}

/// HTTP server for the product relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server relaying to the product service behind `client`.
    pub fn new(config: RelayConfig, client: ProductClient) -> Self {
        tracing::info!(downstream = %client.base_url(), "Relaying product API");

        let state = AppState { client };
        let router = Self::build_router(&config.limits, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(limits: &LimitsConfig, state: AppState) -> Router {
        let upload_limit = match limits.max_upload_size {
            Some(max) => DefaultBodyLimit::max(max),
            None => DefaultBodyLimit::disable(),
        };

        Router::new()
            .route(
                "/api/client",
                get(handlers::list_products).post(handlers::create_product),
            )
            .route(
                "/api/client/{id}",
                get(handlers::get_product)
                    .put(handlers::update_product)
                    .delete(handlers::delete_product),
            )
            .route(
                "/api/client/upload/{id}",
                post(handlers::upload_photo).layer(upload_limit),
            )
            .route_layer(middleware::from_fn(metrics::track_requests))
            .layer(DefaultBodyLimit::max(limits.max_json_body))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(request_span))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            configured = %self.config.listener.bind_address,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The assembled router, for serving it some other way.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

fn request_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = request_id_of(request.headers()).unwrap_or("-"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;
    use url::Url;

    fn server() -> HttpServer {
        let client = ProductClient::new(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:9/api/products").unwrap(),
        );
        HttpServer::new(RelayConfig::default(), client)
    }

    #[tokio::test]
    async fn test_unknown_route_gets_request_id() {
        let response = server()
            .into_router()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let id = response.headers()[X_REQUEST_ID].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn test_client_request_id_is_echoed() {
        let request = Request::get("/nope")
            .header(X_REQUEST_ID, "abc-123")
            .body(Body::empty())
            .unwrap();
        let response = server().into_router().oneshot(request).await.unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "abc-123");
    }

    #[tokio::test]
    async fn test_malformed_create_body_is_rejected_locally() {
        let request = Request::post("/api/client")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = server().into_router().oneshot(request).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_json_body_limit() {
        let mut config = RelayConfig::default();
        config.limits.max_json_body = 16;
        let client = ProductClient::new(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:9/api/products").unwrap(),
        );

        let request = Request::post("/api/client")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"nombre": "a rather long product name"}"#))
            .unwrap();
        let response = HttpServer::new(config, client)
            .into_router()
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
