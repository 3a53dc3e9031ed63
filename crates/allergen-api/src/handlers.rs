//! REST API endpoint handlers.
//!
//! Every handler reads "now" from the state's clock, builds an engine over the
//! shared source, and returns the engine's result as JSON.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/health` | Liveness, timestamp, version |
//! | `GET` | `/api/users/{user_id}/allergy-analysis` | Ranked potential allergies (`?threshold=`) |
//! | `GET` | `/api/users/{user_id}/food-risk/{food_id}` | Single-food assessment (`?days=`) |
//! | `GET` | `/api/users/{user_id}/foods/{food_id}/score` | Raw risk score (`?days=`) |
//! | `GET` | `/api/users/{user_id}/dashboard` | Statistics and patterns (`?days=`) |
//! | `GET` | `/api/users/{user_id}/recommendations` | Personalised recommendations |
//! | `GET` | `/api/export/{user_id}/data` | History and current analysis |

use std::sync::Arc;

use allergen_core::{EventStore, FoodCatalog};
use allergen_types::{
    AllergyReport, DashboardSummary, FoodId, RiskAssessment, UserDataExport, UserId,
};
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/users/{user_id}/allergy-analysis`.
#[derive(Debug, serde::Deserialize)]
pub struct AnalysisQuery {
    /// Minimum risk score to report (default from configuration).
    pub threshold: Option<f64>,
}

/// Query parameters for endpoints that analyse a trailing period.
#[derive(Debug, serde::Deserialize)]
pub struct PeriodQuery {
    /// Days to look back (default from configuration).
    pub days: Option<u32>,
}

// ---------------------------------------------------------------------------
// GET /api/health
// ---------------------------------------------------------------------------

/// Report that the server is up.
pub async fn health<S>(State(state): State<Arc<AppState<S>>>) -> Json<serde_json::Value>
where
    S: EventStore + FoodCatalog + 'static,
{
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": state.now(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ---------------------------------------------------------------------------
// GET /api/users/{user_id}/allergy-analysis
// ---------------------------------------------------------------------------

/// Rank every catalog food by risk for a user.
pub async fn allergy_analysis<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
    query: Result<Query<AnalysisQuery>, QueryRejection>,
) -> Result<Json<AllergyReport>, ApiError>
where
    S: EventStore + FoodCatalog + 'static,
{
    let user_id = UserId::from(parse_uuid(&user_id)?);
    let Query(params) = query.map_err(|e| ApiError::InvalidQuery(e.body_text()))?;
    let threshold = params.threshold.unwrap_or(state.config.default_threshold);

    let report = state
        .engine()?
        .report(user_id, threshold, state.now())
        .await?;
    Ok(Json(report))
}

// ---------------------------------------------------------------------------
// GET /api/users/{user_id}/food-risk/{food_id}
// ---------------------------------------------------------------------------

/// Assess a single food for a user.
pub async fn food_risk<S>(
    State(state): State<Arc<AppState<S>>>,
    Path((user_id, food_id)): Path<(String, String)>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Json<RiskAssessment>, ApiError>
where
    S: EventStore + FoodCatalog + 'static,
{
    let user_id = UserId::from(parse_uuid(&user_id)?);
    let food_id = FoodId::from(parse_uuid(&food_id)?);
    let days = period_days(query, &state)?;

    let assessment = state
        .engine()?
        .risk_for(user_id, food_id, days, state.now())
        .await?;
    Ok(Json(assessment))
}

// ---------------------------------------------------------------------------
// GET /api/users/{user_id}/foods/{food_id}/score
// ---------------------------------------------------------------------------

/// Raw risk score of a single food for a user.
pub async fn food_score<S>(
    State(state): State<Arc<AppState<S>>>,
    Path((user_id, food_id)): Path<(String, String)>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    S: EventStore + FoodCatalog + 'static,
{
    let user_id = UserId::from(parse_uuid(&user_id)?);
    let food_id = FoodId::from(parse_uuid(&food_id)?);
    let days = period_days(query, &state)?;

    let risk_score = state
        .engine()?
        .score(user_id, food_id, days, state.now())
        .await?;
    Ok(Json(serde_json::json!({
        "user_id": user_id,
        "food_id": food_id,
        "days_analyzed": days,
        "risk_score": risk_score,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/users/{user_id}/dashboard
// ---------------------------------------------------------------------------

/// Dashboard statistics for a user.
pub async fn dashboard<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Json<DashboardSummary>, ApiError>
where
    S: EventStore + FoodCatalog + 'static,
{
    let user_id = UserId::from(parse_uuid(&user_id)?);
    let days = period_days(query, &state)?;

    let summary = state
        .engine()?
        .dashboard(user_id, days, state.now())
        .await?;
    Ok(Json(summary))
}

// ---------------------------------------------------------------------------
// GET /api/users/{user_id}/recommendations
// ---------------------------------------------------------------------------

/// Personalised recommendations for a user.
pub async fn recommendations<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    S: EventStore + FoodCatalog + 'static,
{
    let user_id = UserId::from(parse_uuid(&user_id)?);
    let now = state.now();

    let recommendations = state.engine()?.recommendations(user_id, now).await?;
    Ok(Json(serde_json::json!({
        "user_id": user_id,
        "total_recommendations": recommendations.len(),
        "recommendations": recommendations,
        "generated_at": now,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/export/{user_id}/data
// ---------------------------------------------------------------------------

/// Export a user's history along with the current allergy analysis.
pub async fn export_data<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserDataExport>, ApiError>
where
    S: EventStore + FoodCatalog + 'static,
{
    let user_id = UserId::from(parse_uuid(&user_id)?);
    let export = state.engine()?.export(user_id, state.now()).await?;
    Ok(Json(export))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a UUID from a string, returning an [`ApiError`] on failure.
fn parse_uuid(s: &str) -> Result<Uuid, ApiError> {
    s.parse::<Uuid>()
        .map_err(|e| ApiError::InvalidUuid(format!("{s}: {e}")))
}

/// The `days` parameter, or the configured default when absent.
fn period_days<S>(
    query: Result<Query<PeriodQuery>, QueryRejection>,
    state: &AppState<S>,
) -> Result<u32, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::InvalidQuery(e.body_text()))?;
    Ok(params.days.unwrap_or(state.config.default_days_back))
}
