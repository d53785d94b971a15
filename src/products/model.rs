//! Product record and its JSON shape.
//!
//! Field names on the wire follow the downstream service's contract, so a
//! product received from either side can be relayed without reshaping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product as exchanged with clients and the downstream service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Server-assigned identifier. Absent on create.
    #[serde(default)]
    pub id: Option<String>,

    /// Relayed as given: a missing name stays `null` for the downstream to judge.
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,

    #[serde(rename = "precio", default)]
    pub price: Option<f64>,

    /// Creation time, RFC 3339 on the wire.
    #[serde(rename = "createAt", default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Reference to the uploaded photo, set by the downstream after an upload.
    #[serde(rename = "foto", default)]
    pub photo: Option<String>,

    #[serde(rename = "categoria", default)]
    pub category: Option<Category>,
}

impl Product {
    /// Fill in the creation time if the client left it out.
    ///
    /// A timestamp supplied by the client is kept as is.
    pub fn stamped(mut self, now: DateTime<Utc>) -> Self {
        if self.created_at.is_none() {
            self.created_at = Some(now);
        }
        self
    }
}

/// Category reference attached to a product.
///
/// Kept as raw JSON: the relay forwards it without looking inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(pub serde_json::Value);
