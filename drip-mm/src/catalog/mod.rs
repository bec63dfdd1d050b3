//! Wardrobe catalog accessor
//!
//! The catalog service owns garment CRUD and image storage; the matching
//! engine only needs the full wardrobe grouped by category and a way to
//! turn a garment's opaque image reference into a presentable URL.

use async_trait::async_trait;
use drip_common::api::types::{Garment, GroupedItemsResponse};
use reqwest::StatusCode;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Placeholder shown when a garment has no usable image reference.
const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml;base64,PHN2ZyB3aWR0aD0iMjQiIGhlaWdodD0iMjQiIGZpbGw9Im5vbmUiIHN0cm9rZT0iY3VycmVudENvbG9yIiBzdHJva2Utd2lkdGg9IjIiIHN0cm9rZS1saW5lY2FwPSJyb3VuZCIgc3Ryb2tlLWxpbmVqb2luPSJyb3VuZCIgdmlld0JveD0iMCAwIDI0IDI0Ij48cGF0aCBkPSJtMyAzIDMgOSAxMy0xMHoiLz48cGF0aCBkPSJNNiAxMWgxMSIvPjwvc3ZnPg==";

/// Catalog failure. Listing failures are fatal to a match invocation:
/// without the candidate universe there is nothing to rank.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Request-level failure (connect, timeout, body read)
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status from the catalog service
    #[error("catalog service returned {0}")]
    Status(StatusCode),

    /// Service not reachable or not configured
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// External wardrobe catalog capability.
#[async_trait]
pub trait CatalogAccessor: Send + Sync {
    /// Fetch a user's full wardrobe, grouped by category.
    async fn list_garments(
        &self,
        user_id: &str,
    ) -> Result<BTreeMap<String, Vec<Garment>>, CatalogError>;

    /// Resolve a garment's image reference to an absolute URL.
    /// Presentation only; the matching algorithm never reads images.
    fn resolve_image(&self, garment: &Garment) -> String;
}

/// HTTP client for the catalog service.
pub struct HttpCatalog {
    base_url: String,
    client: reqwest::Client,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client (system error)"),
        }
    }
}

#[async_trait]
impl CatalogAccessor for HttpCatalog {
    async fn list_garments(
        &self,
        user_id: &str,
    ) -> Result<BTreeMap<String, Vec<Garment>>, CatalogError> {
        debug!(user_id, "listing wardrobe from catalog");

        let response = self
            .client
            .get(format!("{}/items/grouped", self.base_url))
            .query(&[("user_id", user_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status()));
        }

        let body: GroupedItemsResponse = response.json().await?;
        Ok(body.items_by_category)
    }

    fn resolve_image(&self, garment: &Garment) -> String {
        // Hosted storage URL takes priority over the catalog-served path
        let reference = garment
            .image_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(&garment.image);

        if reference.is_empty() {
            return PLACEHOLDER_IMAGE.to_string();
        }
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return reference.to_string();
        }
        format!("{}/images/{}", self.base_url, reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn garment(image: &str, image_url: Option<&str>) -> Garment {
        Garment {
            id: Uuid::new_v4(),
            category: "Tops".to_string(),
            image: image.to_string(),
            image_url: image_url.map(str::to_string),
            details: serde_json::Value::Null,
        }
    }

    #[test]
    fn resolve_image_prefers_storage_url() {
        let catalog = HttpCatalog::new("http://localhost:8000");
        let g = garment("local.jpg", Some("https://cdn.example.com/a.jpg"));
        assert_eq!(catalog.resolve_image(&g), "https://cdn.example.com/a.jpg");
    }

    #[test]
    fn resolve_image_joins_relative_paths() {
        let catalog = HttpCatalog::new("http://localhost:8000/");
        let g = garment("user/Tops/shirt.jpg", None);
        assert_eq!(
            catalog.resolve_image(&g),
            "http://localhost:8000/images/user/Tops/shirt.jpg"
        );
    }

    #[test]
    fn resolve_image_passes_absolute_references_through() {
        let catalog = HttpCatalog::new("http://localhost:8000");
        let g = garment("http://elsewhere/x.jpg", None);
        assert_eq!(catalog.resolve_image(&g), "http://elsewhere/x.jpg");
    }

    #[test]
    fn resolve_image_falls_back_to_placeholder() {
        let catalog = HttpCatalog::new("http://localhost:8000");
        let g = garment("", None);
        assert!(catalog.resolve_image(&g).starts_with("data:image/svg+xml"));
    }
}
