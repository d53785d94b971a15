//! Product resource shared by the inbound API and the downstream service.
//!
//! The relay never owns products: a [`Product`] is decoded from an inbound
//! body or a downstream response, relayed, and dropped.

pub mod model;

pub use model::{Category, Product};
