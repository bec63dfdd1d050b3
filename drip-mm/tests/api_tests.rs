//! Integration tests for drip-mm API endpoints
//!
//! Tests cover:
//! - Health endpoint shape
//! - Category and full-outfit match endpoints end-to-end
//! - Anchor-not-found and catalog-unavailable error mapping
//! - Clear endpoint and the results snapshot

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method
use uuid::Uuid;

use drip_common::api::types::Garment;
use drip_mm::catalog::{CatalogAccessor, CatalogError};
use drip_mm::matching::MatchEngine;
use drip_mm::scoring::{CompatibilityScorer, ScoreError};
use drip_mm::{build_router, AppState};

/// Catalog serving a fixed wardrobe.
struct FixtureCatalog {
    groups: BTreeMap<String, Vec<Garment>>,
}

#[async_trait]
impl CatalogAccessor for FixtureCatalog {
    async fn list_garments(
        &self,
        _user_id: &str,
    ) -> Result<BTreeMap<String, Vec<Garment>>, CatalogError> {
        Ok(self.groups.clone())
    }

    fn resolve_image(&self, garment: &Garment) -> String {
        format!("http://catalog.test/images/{}", garment.image)
    }
}

/// Catalog that is down.
struct DownCatalog;

#[async_trait]
impl CatalogAccessor for DownCatalog {
    async fn list_garments(
        &self,
        _user_id: &str,
    ) -> Result<BTreeMap<String, Vec<Garment>>, CatalogError> {
        Err(CatalogError::Unavailable("connection refused".to_string()))
    }

    fn resolve_image(&self, garment: &Garment) -> String {
        garment.image.clone()
    }
}

/// Deterministic scorer keyed by candidate id.
struct TableScorer {
    scores: HashMap<Uuid, f64>,
}

#[async_trait]
impl CompatibilityScorer for TableScorer {
    async fn score(&self, _anchor: Uuid, candidate: Uuid) -> Result<f64, ScoreError> {
        self.scores
            .get(&candidate)
            .copied()
            .ok_or_else(|| ScoreError::Unavailable(format!("no score for {candidate}")))
    }
}

fn garment(category: &str, image: &str) -> Garment {
    Garment {
        id: Uuid::new_v4(),
        category: category.to_string(),
        image: image.to_string(),
        image_url: None,
        details: json!({"name": image}),
    }
}

/// Test helper: wardrobe with an anchor shirt, two pants, one shoe.
struct Fixture {
    shirt: Garment,
    pants_strong: Garment,
    pants_weak: Garment,
    shoe: Garment,
    app: axum::Router,
}

fn setup_fixture() -> Fixture {
    let shirt = garment("Tops", "shirt.jpg");
    let pants_strong = garment("Bottoms", "pants-strong.jpg");
    let pants_weak = garment("Bottoms", "pants-weak.jpg");
    let shoe = garment("Shoes", "shoe.jpg");

    let mut groups = BTreeMap::new();
    groups.insert("Tops".to_string(), vec![shirt.clone()]);
    groups.insert(
        "Bottoms".to_string(),
        vec![pants_strong.clone(), pants_weak.clone()],
    );
    groups.insert("Shoes".to_string(), vec![shoe.clone()]);

    let scores = HashMap::from([
        (pants_strong.id, 0.9),
        (pants_weak.id, 0.2),
        (shoe.id, 0.85),
    ]);

    let catalog = Arc::new(FixtureCatalog { groups });
    let engine = Arc::new(MatchEngine::new(
        Arc::new(TableScorer { scores }),
        Duration::from_secs(5),
    ));
    let app = build_router(AppState::new(catalog, engine));

    Fixture {
        shirt,
        pants_strong,
        pants_weak,
        shoe,
        app,
    }
}

fn setup_down_catalog_app() -> axum::Router {
    let engine = Arc::new(MatchEngine::new(
        Arc::new(TableScorer {
            scores: HashMap::new(),
        }),
        Duration::from_secs(5),
    ));
    build_router(AppState::new(Arc::new(DownCatalog), engine))
}

/// Test helper: GET request
fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: POST request with JSON body
fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Health endpoint
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = setup_fixture();

    let response = fixture.app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "drip-mm");
    assert!(body["version"].is_string());
}

// =============================================================================
// Category match endpoint
// =============================================================================

#[tokio::test]
async fn test_category_match_returns_ranked_results() {
    let fixture = setup_fixture();

    let request = post_json(
        "/api/match/category",
        json!({
            "user_id": "user-1",
            "anchor_id": fixture.shirt.id,
            "category": "Bottoms",
        }),
    );
    let response = fixture.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["match_type"], "category");
    assert_eq!(body["anchor_id"], fixture.shirt.id.to_string());

    let results = body["results"].as_array().unwrap();
    // pants_weak (confidence 20) is filtered out
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], fixture.pants_strong.id.to_string());
    assert_eq!(results[0]["confidence"], 90);
    assert_eq!(results[0]["reason"], "Excellent match");
    assert_eq!(
        results[0]["image"],
        "http://catalog.test/images/pants-strong.jpg"
    );
}

#[tokio::test]
async fn test_category_match_unknown_anchor_is_404() {
    let fixture = setup_fixture();

    let request = post_json(
        "/api/match/category",
        json!({
            "user_id": "user-1",
            "anchor_id": Uuid::new_v4(),
            "category": "Bottoms",
        }),
    );
    let response = fixture.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_catalog_down_is_retryable_bad_gateway() {
    let app = setup_down_catalog_app();

    let request = post_json(
        "/api/match/category",
        json!({
            "user_id": "user-1",
            "anchor_id": Uuid::new_v4(),
            "category": "Bottoms",
        }),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "CATALOG_UNAVAILABLE");
    assert_eq!(body["error"]["retryable"], true);
}

// =============================================================================
// Full outfit endpoint
// =============================================================================

#[tokio::test]
async fn test_outfit_match_picks_one_per_category() {
    let fixture = setup_fixture();

    let request = post_json(
        "/api/match/outfit",
        json!({
            "user_id": "user-1",
            "anchor_id": fixture.shirt.id,
        }),
    );
    let response = fixture.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["match_type"], "outfit");

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    // Sorted descending: pants (90) then shoe (85); the weak pants lost
    // its category reduction
    assert_eq!(results[0]["id"], fixture.pants_strong.id.to_string());
    assert_eq!(results[0]["reason"], "Perfect complement");
    assert_eq!(results[1]["id"], fixture.shoe.id.to_string());
    assert_eq!(results[1]["confidence"], 85);
    let ids: Vec<&str> = results.iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert!(!ids.contains(&fixture.pants_weak.id.to_string().as_str()));
    assert!(!ids.contains(&fixture.shirt.id.to_string().as_str()));
}

// =============================================================================
// Results snapshot and clear
// =============================================================================

#[tokio::test]
async fn test_results_snapshot_and_clear() {
    let fixture = setup_fixture();

    let request = post_json(
        "/api/match/category",
        json!({
            "user_id": "user-1",
            "anchor_id": fixture.shirt.id,
            "category": "Shoes",
        }),
    );
    let response = fixture.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = fixture
        .app
        .clone()
        .oneshot(get_request("/api/match/results"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["matching"], false);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(
        body["results"][0]["id"],
        fixture.shoe.id.to_string()
    );

    let response = fixture
        .app
        .clone()
        .oneshot(post_json("/api/match/clear", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = fixture
        .app
        .oneshot(get_request("/api/match/results"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["matching"], false);
    assert_eq!(body["match_type"], Value::Null);
    assert!(body["results"].as_array().unwrap().is_empty());
}
