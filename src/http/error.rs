//! Mapping of downstream failures to client responses.
//!
//! Only two failures get a bespoke shape: a NOT-FOUND from the product
//! service (structured 404) and a BAD-REQUEST on create (body relayed
//! verbatim). Everything else takes the general fault path.

use axum::{
    extract::multipart::MultipartError,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::downstream::ClientError;

/// JSON body of relay-generated error responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub timestamp: DateTime<Utc>,
    pub status: u16,
}

impl ErrorBody {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            timestamp: Utc::now(),
            status: status.as_u16(),
        }
    }
}

/// Errors returned by the product handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The product service reported the product as absent.
    NotFound(ClientError),

    /// The product service rejected a create; its body goes back unchanged.
    Rejected { body: String },

    /// Upload request without a `file` part.
    MissingFile,

    /// The inbound multipart stream could not be read.
    Multipart(MultipartError),

    /// Failure with no dedicated mapping.
    Unhandled(ClientError),
}

impl ApiError {
    /// Mapping shared by list, get, delete and upload: only NOT-FOUND is shaped.
    pub fn not_found_or_raise(err: ClientError) -> Self {
        if err.is_not_found() {
            ApiError::NotFound(err)
        } else {
            ApiError::Unhandled(err)
        }
    }

    /// Mapping used by create: only BAD-REQUEST is shaped.
    pub fn bad_request_or_raise(err: ClientError) -> Self {
        match err {
            ClientError::Status {
                status: StatusCode::BAD_REQUEST,
                body,
                ..
            } => ApiError::Rejected { body },
            other => ApiError::Unhandled(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(err) => {
                tracing::warn!(error = %err, "Product not found downstream");
                let body = ErrorBody::new(StatusCode::NOT_FOUND, format!("product not found: {err}"));
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
            ApiError::Rejected { body } => {
                tracing::warn!("Product service rejected the request");
                (
                    StatusCode::BAD_REQUEST,
                    [(header::CONTENT_TYPE, "application/json")],
                    body,
                )
                    .into_response()
            }
            ApiError::MissingFile => {
                let body = ErrorBody::new(StatusCode::BAD_REQUEST, "missing multipart field: file");
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::Multipart(err) => {
                tracing::warn!(error = %err, "Unreadable multipart upload");
                err.into_response()
            }
            ApiError::Unhandled(err) => {
                tracing::error!(error = %err, status = ?err.status(), "Unhandled downstream failure");
                let body = ErrorBody::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}
