//! Failures surfaced by the downstream client.

use reqwest::{Method, StatusCode};
use thiserror::Error;

use crate::downstream::decode::FramingError;

/// Errors that can occur while talking to the product service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The product service answered with a non-2xx status.
    #[error("{status} from {method} {url}")]
    Status {
        status: StatusCode,
        method: Method,
        url: String,
        /// Response body text as sent by the product service.
        body: String,
    },

    /// Connection, I/O or protocol failure before a status was received.
    #[error("downstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx body that does not decode into a product.
    #[error("invalid product payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A product list body that is not a well-formed JSON array.
    #[error("malformed product list: {0}")]
    Framing(#[from] FramingError),
}

impl ClientError {
    /// HTTP status reported by the product service, if it answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(_) | ClientError::Decode(_) | ClientError::Framing(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Short label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            ClientError::Status { status, .. } if status.is_client_error() => "client_error",
            ClientError::Status { .. } => "server_error",
            ClientError::Transport(_) => "transport_error",
            ClientError::Decode(_) | ClientError::Framing(_) => "decode_error",
        }
    }
}

/// Result type for downstream calls.
pub type ClientResult<T> = Result<T, ClientError>;
