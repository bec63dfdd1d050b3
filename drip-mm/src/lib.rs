//! drip-mm library - Mix & Match matching service
//!
//! Hosts the outfit compatibility matching engine behind an HTTP API.
//! The wardrobe catalog and the pairwise compatibility scorer are
//! external collaborators, injected as trait objects so the engine can
//! be driven with synthetic implementations in tests.

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod matching;
pub mod scoring;

use catalog::CatalogAccessor;
use matching::MatchEngine;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Wardrobe catalog collaborator
    pub catalog: Arc<dyn CatalogAccessor>,
    /// Matching engine (selection state + orchestrator + published results)
    pub engine: Arc<MatchEngine>,
}

impl AppState {
    /// Create new application state
    pub fn new(catalog: Arc<dyn CatalogAccessor>, engine: Arc<MatchEngine>) -> Self {
        Self { catalog, engine }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/match/category", post(api::matching::match_by_category))
        .route("/api/match/outfit", post(api::matching::match_full_outfit))
        .route("/api/match/results", get(api::matching::current_results))
        .route("/api/match/clear", post(api::matching::clear_matches))
        .merge(api::health::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
