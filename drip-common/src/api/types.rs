//! Wire types for the wardrobe catalog service
//!
//! The catalog service owns all garment data; Drip services hold
//! references and never mutate them. These types mirror the catalog's
//! JSON shapes exactly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A single wardrobe item as served by the catalog service.
///
/// `details` is an opaque bag (name, color, brand, free-form notes);
/// nothing in the matching engine looks inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Garment {
    /// Stable unique identifier
    pub id: Uuid,
    /// Category label; the set of categories is open and discovered at
    /// runtime from the catalog listing
    pub category: String,
    /// Opaque image reference (storage path or absolute URL)
    #[serde(default)]
    pub image: String,
    /// Absolute storage URL, present when the image lives in hosted
    /// storage rather than behind the catalog's image endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Opaque item details (name, color, brand, free-form)
    #[serde(default)]
    pub details: serde_json::Value,
}

/// Catalog listing response: the full wardrobe grouped by category
/// (`GET /items/grouped`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupedItemsResponse {
    pub items_by_category: BTreeMap<String, Vec<Garment>>,
}

/// Health check response returned by every Drip service.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}
