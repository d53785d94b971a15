//! Response builders.
//!
//! # Responsibilities
//! - Build `201 Created` answers with a `Location` under `/api/client`
//! - Stream a product sequence out as one JSON array
//!
//! # Design Decisions
//! - The list body is written element by element, never collected
//! - A failure after the status line has gone out aborts the body

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    BoxError, Json,
};
use futures_util::stream::{self, Stream, StreamExt};
use serde::Serialize;

/// Path prefix of the inbound product API.
pub const API_PREFIX: &str = "/api/client";

/// `201 Created` with the product as body and `Location` pointing at `id`.
///
/// Without an id the `Location` header is left out.
pub fn created<T: Serialize>(id: Option<&str>, body: T) -> Response {
    let mut response = (StatusCode::CREATED, Json(body)).into_response();

    match id.map(location_for) {
        Some(Ok(location)) => {
            response.headers_mut().insert(header::LOCATION, location);
        }
        Some(Err(_)) => {
            tracing::warn!(id = ?id, "Product id is not usable in a Location header");
        }
        None => {
            tracing::warn!("Product service returned no id, omitting Location");
        }
    }

    response
}

fn location_for(id: &str) -> Result<HeaderValue, header::InvalidHeaderValue> {
    HeaderValue::from_str(&format!("{API_PREFIX}/{id}"))
}

/// `200 OK` whose body is a JSON array written as `items` yields.
pub fn json_array<S, T, E>(items: S) -> Response
where
    S: Stream<Item = Result<T, E>> + Send + 'static,
    T: Serialize + Send + 'static,
    E: Into<BoxError> + 'static,
{
    let mut first = true;
    let elements = items.map(move |item| -> Result<Vec<u8>, BoxError> {
        let item = item.map_err(Into::<BoxError>::into)?;
        let mut chunk = if first { Vec::new() } else { vec![b','] };
        first = false;
        serde_json::to_writer(&mut chunk, &item)?;
        Ok(chunk)
    });

    let open = stream::once(async { Ok::<_, BoxError>(b"[".to_vec()) });
    let close = stream::once(async { Ok::<_, BoxError>(b"]".to_vec()) });
    let body = Body::from_stream(open.chain(elements).chain(close));

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_created_sets_location() {
        let response = created(Some("42"), serde_json::json!({"id": "42"}));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::LOCATION], "/api/client/42");
        assert_eq!(body_text(response).await, r#"{"id":"42"}"#);
    }

    #[test]
    fn test_created_without_id() {
        let response = created(None, serde_json::json!({}));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.headers().get(header::LOCATION).is_none());
    }

    #[tokio::test]
    async fn test_json_array_body() {
        let items = stream::iter(vec![Ok::<_, io::Error>(1), Ok(2), Ok(3)]);
        let response = json_array(items);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_text(response).await, "[1,2,3]");

        let empty = stream::iter(Vec::<Result<u8, io::Error>>::new());
        assert_eq!(body_text(json_array(empty)).await, "[]");
    }

    #[tokio::test]
    async fn test_json_array_aborts_on_error() {
        let items = stream::iter(vec![Ok(1), Err(io::Error::other("boom"))]);
        let response = json_array(items);
        let result = axum::body::to_bytes(response.into_body(), usize::MAX).await;
        assert!(result.is_err());
    }
}
