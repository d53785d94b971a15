//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, downstream client per request)
//!     → handlers.rs (one product service call per request)
//!     → error.rs / response.rs (shape the answer)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use error::{ApiError, ErrorBody};
pub use request::{Downstream, MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
