//! Downstream product service subsystem.
//!
//! # Data Flow
//! ```text
//! handler
//!     → client.rs (build request, forward request ID)
//!     → product service
//!     → client.rs (status check, typed failures in error.rs)
//!     → decode.rs (products, lazily for the list)
//!     → handler
//! ```
//!
//! # Design Decisions
//! - One shared `reqwest::Client`; no retries, no timeouts
//! - Non-2xx answers keep their status and body for the handler to map
//! - Transport failures stay distinct from HTTP failures

pub mod client;
pub mod decode;
pub mod error;

pub use client::{ProductClient, UploadFile};
pub use decode::{ArrayDecoder, FramingError, ProductStream};
pub use error::{ClientError, ClientResult};
