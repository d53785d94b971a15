//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a request ID (UUID v4) when the client did not send one
//! - Hand handlers a downstream client tagged with that ID
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The inbound ID is forwarded unchanged to the product service

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderName, HeaderValue, Request},
};
use tower_http::request_id::{MakeRequestId, RequestId};

use crate::downstream::ProductClient;
use crate::http::server::AppState;

/// Header carrying the request ID in both directions.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Read the request ID from a header map, if it is valid text.
pub fn request_id_of(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok())
}

/// Extractor yielding the shared product client, tagged with the request ID.
#[derive(Debug, Clone)]
pub struct Downstream(pub ProductClient);

impl FromRequestParts<AppState> for Downstream {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let request_id = parts.headers.get(X_REQUEST_ID).cloned();
        Ok(Downstream(state.client.with_request_id(request_id)))
    }
}
