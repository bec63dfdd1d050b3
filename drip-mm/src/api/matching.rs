//! Match endpoints
//!
//! The handlers own the invocation lifecycle: list the wardrobe from the
//! catalog (fatal if unavailable), locate the anchor, update selection
//! state, run the engine, and serialize the ranking with resolved image
//! URLs.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use drip_common::api::types::Garment;

use crate::catalog::CatalogAccessor;
use crate::error::ApiError;
use crate::matching::{MatchMode, MatchResult};
use crate::AppState;

/// Request body for POST /api/match/category
#[derive(Debug, Deserialize)]
pub struct CategoryMatchRequest {
    /// Owner of the wardrobe; forwarded to the catalog service
    pub user_id: String,
    /// Anchor garment id
    pub anchor_id: Uuid,
    /// Target category to rank candidates from
    pub category: String,
}

/// Request body for POST /api/match/outfit
#[derive(Debug, Deserialize)]
pub struct OutfitMatchRequest {
    pub user_id: String,
    pub anchor_id: Uuid,
}

/// One ranked match in a response
#[derive(Debug, Serialize)]
pub struct MatchResultDto {
    pub id: Uuid,
    pub category: String,
    /// Resolved absolute image URL
    pub image: String,
    pub details: serde_json::Value,
    pub confidence: u8,
    pub reason: String,
    pub score: f64,
}

/// Response body for the match endpoints
#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub match_type: MatchMode,
    pub anchor_id: Uuid,
    pub results: Vec<MatchResultDto>,
}

/// Response body for GET /api/match/results
#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    /// Whether a match batch is currently in flight
    pub matching: bool,
    pub match_type: Option<MatchMode>,
    pub results: Vec<MatchResultDto>,
}

/// POST /api/match/category
///
/// Rank the garments of one category against the anchor garment.
pub async fn match_by_category(
    State(state): State<AppState>,
    Json(request): Json<CategoryMatchRequest>,
) -> Result<Json<MatchResponse>, ApiError> {
    let (anchor, garments) = load_universe(&state, &request.user_id, request.anchor_id).await?;

    info!(
        anchor = %anchor.id,
        category = %request.category,
        "category match requested"
    );

    state.engine.select_item(anchor.clone());
    state.engine.select_category(&request.category);

    let results = state
        .engine
        .match_by_category(&anchor, &request.category, &garments)
        .await;

    Ok(Json(MatchResponse {
        match_type: MatchMode::Category,
        anchor_id: anchor.id,
        results: to_dtos(state.catalog.as_ref(), results),
    }))
}

/// POST /api/match/outfit
///
/// Assemble a full outfit around the anchor garment.
pub async fn match_full_outfit(
    State(state): State<AppState>,
    Json(request): Json<OutfitMatchRequest>,
) -> Result<Json<MatchResponse>, ApiError> {
    let (anchor, garments) = load_universe(&state, &request.user_id, request.anchor_id).await?;

    info!(anchor = %anchor.id, "full outfit match requested");

    state.engine.select_item(anchor.clone());

    let results = state.engine.match_full_outfit(&anchor, &garments).await;

    Ok(Json(MatchResponse {
        match_type: MatchMode::Outfit,
        anchor_id: anchor.id,
        results: to_dtos(state.catalog.as_ref(), results),
    }))
}

/// GET /api/match/results
///
/// Current committed result set and in-flight status, for UI polling.
pub async fn current_results(State(state): State<AppState>) -> Json<ResultsResponse> {
    let phase = state.engine.phase();
    Json(ResultsResponse {
        matching: phase.is_matching(),
        match_type: phase.mode(),
        results: to_dtos(state.catalog.as_ref(), state.engine.results()),
    })
}

/// POST /api/match/clear
///
/// Drop the selection and any published results.
pub async fn clear_matches(State(state): State<AppState>) -> StatusCode {
    state.engine.clear();
    StatusCode::NO_CONTENT
}

/// List the wardrobe and locate the anchor garment in it.
async fn load_universe(
    state: &AppState,
    user_id: &str,
    anchor_id: Uuid,
) -> Result<(Garment, Vec<Garment>), ApiError> {
    let grouped = state.catalog.list_garments(user_id).await?;
    let garments: Vec<Garment> = grouped.into_values().flatten().collect();

    let anchor = garments
        .iter()
        .find(|g| g.id == anchor_id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("garment {anchor_id}")))?;

    Ok((anchor, garments))
}

fn to_dtos(catalog: &dyn CatalogAccessor, results: Vec<MatchResult>) -> Vec<MatchResultDto> {
    results
        .into_iter()
        .map(|result| MatchResultDto {
            image: catalog.resolve_image(&result.garment),
            id: result.garment.id,
            category: result.garment.category,
            details: result.garment.details,
            confidence: result.confidence,
            reason: result.reason.to_string(),
            score: result.score,
        })
        .collect()
}
