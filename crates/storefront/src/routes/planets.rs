//! Planet promotion route handlers.
//!
//! Bodies and responses use camelCase field names so existing browser
//! clients keep working.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use spacegoods_core::{ClaimerId, NewPlanet, Planet, PlanetId};
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAdmin;
use crate::planets::ClaimOutcome;
use crate::state::AppState;

/// Claim request body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    #[serde(default)]
    pub claimer_id: Option<ClaimerId>,
}

/// Claim response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub message: &'static str,
    pub outcome: ClaimOutcome,
    pub planet: Planet,
}

/// Claim reset response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub message: String,
    pub reset_count: usize,
}

/// List all planets.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Json<Vec<Planet>> {
    Json(state.planets().list().await)
}

/// Create a planet.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<NewPlanet>, JsonRejection>,
) -> Result<(StatusCode, Json<Planet>)> {
    let Json(body) = body?;
    let planet = state.planets().create(body, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(planet)))
}

/// Claim a planet.
#[instrument(skip(state, body))]
pub async fn claim(
    State(state): State<AppState>,
    Path(id): Path<PlanetId>,
    body: std::result::Result<Json<ClaimRequest>, JsonRejection>,
) -> Result<Json<ClaimResponse>> {
    let Json(body) = body?;
    let claimer = body.claimer_id.unwrap_or_else(|| ClaimerId::new(""));
    add_breadcrumb(
        "planets",
        "Claim requested",
        Some(&[("planet_id", id.as_str())]),
    );

    let result = state.planets().claim(&id, &claimer, Utc::now()).await?;

    Ok(Json(ClaimResponse {
        message: result.outcome.message(),
        outcome: result.outcome,
        planet: result.planet,
    }))
}

/// Clear every lapsed claim.
#[instrument(skip(state, _admin))]
pub async fn reset_claims(_admin: RequireAdmin, State(state): State<AppState>) -> Json<ResetResponse> {
    let summary = state.planets().reset_expired(Utc::now()).await;
    Json(ResetResponse {
        message: summary.message(),
        reset_count: summary.reset_count,
    })
}
