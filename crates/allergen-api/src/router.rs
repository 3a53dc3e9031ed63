//! Axum router construction for the API.
//!
//! Assembles all routes into a single [`Router`] with request tracing and
//! CORS enabled.

use std::sync::Arc;

use allergen_core::{EventStore, FoodCatalog};
use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router over `state`.
///
/// The router includes:
/// - `GET /api/health`
/// - `GET /api/users/{user_id}/allergy-analysis`
/// - `GET /api/users/{user_id}/food-risk/{food_id}`
/// - `GET /api/users/{user_id}/foods/{food_id}/score`
/// - `GET /api/users/{user_id}/dashboard`
/// - `GET /api/users/{user_id}/recommendations`
/// - `GET /api/export/{user_id}/data`
pub fn build_router<S>(state: Arc<AppState<S>>) -> Router
where
    S: EventStore + FoodCatalog + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(handlers::health::<S>))
        .route(
            "/api/users/{user_id}/allergy-analysis",
            get(handlers::allergy_analysis::<S>),
        )
        .route(
            "/api/users/{user_id}/food-risk/{food_id}",
            get(handlers::food_risk::<S>),
        )
        .route(
            "/api/users/{user_id}/foods/{food_id}/score",
            get(handlers::food_score::<S>),
        )
        .route(
            "/api/users/{user_id}/dashboard",
            get(handlers::dashboard::<S>),
        )
        .route(
            "/api/users/{user_id}/recommendations",
            get(handlers::recommendations::<S>),
        )
        .route(
            "/api/export/{user_id}/data",
            get(handlers::export_data::<S>),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
