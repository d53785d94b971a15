//! Product API relay library.
//!
//! Exposes `/api/client` product routes and forwards each call to the
//! downstream product service, translating bodies and error codes.

pub mod config;
pub mod downstream;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod products;

pub use config::RelayConfig;
pub use downstream::ProductClient;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use products::Product;
