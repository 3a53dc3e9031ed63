//! Integration tests for the API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server, over an in-memory source and a fixed clock.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use std::sync::Arc;

use allergen_api::router::build_router;
use allergen_api::state::AppState;
use allergen_core::{AnalysisConfig, FixedClock, InMemorySource};
use allergen_types::{FoodId, MealEvent, SymptomEvent, UserId};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    user: UserId,
    peanuts: FoodId,
    rice: FoodId,
}

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-06-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn meal(user_id: UserId, food_id: FoodId, at: DateTime<Utc>) -> MealEvent {
    MealEvent {
        user_id,
        food_id,
        occurred_at: at,
        quantity: 1.0,
        notes: None,
    }
}

fn symptom(user_id: UserId, at: DateTime<Utc>) -> SymptomEvent {
    SymptomEvent {
        user_id,
        symptom_type: String::from("hives"),
        severity: 4,
        occurred_at: at,
        description: None,
    }
}

/// Peanuts: 2 meals, both followed by a symptom (100.0).
/// Rice: 2 meals, none followed by a symptom (0.0).
fn build_source() -> (InMemorySource, UserId, FoodId, FoodId) {
    let mut source = InMemorySource::new();
    let user = UserId::new();
    let peanuts = source.add_food("Peanuts", "legume", "peanuts");
    let rice = source.add_food("Rice", "grain", "rice");

    for days in [3, 6] {
        let t = now() - TimeDelta::days(days);
        source.record_meal(meal(user, peanuts, t));
        source.record_symptom(symptom(user, t + TimeDelta::hours(4)));
    }
    for days in [1, 9] {
        source.record_meal(meal(user, rice, now() - TimeDelta::days(days)));
    }
    (source, user, peanuts, rice)
}

fn make_app() -> TestApp {
    let (source, user, peanuts, rice) = build_source();
    let state = AppState::new(source, AnalysisConfig::default())
        .with_clock(Arc::new(FixedClock::at(now())));
    TestApp {
        router: build_router(Arc::new(state)),
        user,
        peanuts,
        rice,
    }
}

async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_health() {
    let app = make_app();
    let (status, json) = get(app.router, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_allergy_analysis_default_threshold() {
    let app = make_app();
    let uri = format!("/api/users/{}/allergy-analysis", app.user);
    let (status, json) = get(app.router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["threshold_used"], 30.0);
    assert_eq!(json["total_detected"], 1);
    assert_eq!(json["potential_allergies"][0]["food_name"], "Peanuts");
    assert_eq!(json["potential_allergies"][0]["risk_score"], 100.0);
    assert_eq!(
        json["potential_allergies"][0]["recommendation"],
        "avoid this food and consult a physician"
    );
}

#[tokio::test]
async fn test_allergy_analysis_zero_threshold_lists_whole_catalog() {
    let app = make_app();
    let uri = format!("/api/users/{}/allergy-analysis?threshold=0", app.user);
    let (status, json) = get(app.router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_detected"], 2);
    assert_eq!(json["potential_allergies"][1]["food_name"], "Rice");
}

#[tokio::test]
async fn test_allergy_analysis_rejects_out_of_range_threshold() {
    let app = make_app();
    let uri = format!("/api/users/{}/allergy-analysis?threshold=150", app.user);
    let (status, json) = get(app.router, &uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_allergy_analysis_rejects_non_numeric_threshold() {
    let app = make_app();
    let uri = format!("/api/users/{}/allergy-analysis?threshold=high", app.user);
    let (status, json) = get(app.router, &uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_unknown_user_is_404() {
    let app = make_app();
    let uri = format!("/api/users/{}/allergy-analysis", UserId::new());
    let (status, json) = get(app.router, &uri).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_invalid_uuid_is_400() {
    let app = make_app();
    let (status, json) = get(app.router, "/api/users/not-a-uuid/dashboard").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("not-a-uuid"));
}

#[tokio::test]
async fn test_food_risk() {
    let app = make_app();
    let uri = format!("/api/users/{}/food-risk/{}?days=14", app.user, app.peanuts);
    let (status, json) = get(app.router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["food_name"], "Peanuts");
    assert_eq!(json["risk_level"], "high");
    assert_eq!(json["days_analyzed"], 14);
}

#[tokio::test]
async fn test_food_risk_unknown_food_is_404() {
    let app = make_app();
    let uri = format!("/api/users/{}/food-risk/{}", app.user, FoodId::new());
    let (status, _) = get(app.router, &uri).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_food_score() {
    let app = make_app();
    let uri = format!("/api/users/{}/foods/{}/score", app.user, app.rice);
    let (status, json) = get(app.router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["risk_score"], 0.0);
    assert_eq!(json["days_analyzed"], 30);
}

#[tokio::test]
async fn test_food_score_zero_days_is_400() {
    let app = make_app();
    let uri = format!("/api/users/{}/foods/{}/score?days=0", app.user, app.rice);
    let (status, _) = get(app.router, &uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dashboard() {
    let app = make_app();
    let uri = format!("/api/users/{}/dashboard?days=10", app.user);
    let (status, json) = get(app.router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["period_days"], 10);
    assert_eq!(json["statistics"]["total_meals"], 4);
    assert_eq!(json["statistics"]["total_symptoms"], 2);
    assert_eq!(json["allergy_analysis"]["high_risk_foods"], 1);
    assert_eq!(
        json["consumption_patterns"]["most_consumed_foods"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn test_recommendations() {
    let app = make_app();
    let uri = format!("/api/users/{}/recommendations", app.user);
    let (status, json) = get(app.router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_recommendations"], 2);
    assert_eq!(json["recommendations"][0]["kind"], "allergy_warning");
    assert_eq!(json["recommendations"][0]["priority"], "high");
    assert_eq!(json["recommendations"][1]["kind"], "diversification");
}

#[tokio::test]
async fn test_export_data() {
    let app = make_app();
    let uri = format!("/api/export/{}/data", app.user);
    let (status, json) = get(app.router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["meals"].as_array().unwrap().len(), 4);
    assert_eq!(json["meals"][0]["food_name"], "Rice");
    assert_eq!(json["symptoms"].as_array().unwrap().len(), 2);
    assert_eq!(json["allergy_analysis"][0]["food_name"], "Peanuts");
    assert_eq!(json["export_date"], "2026-06-15T12:00:00Z");
}

#[tokio::test]
async fn test_export_unknown_user_is_404() {
    let app = make_app();
    let uri = format!("/api/export/{}/data", UserId::new());
    let (status, _) = get(app.router, &uri).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unavailable_store_is_503() {
    let (mut source, user, _, _) = build_source();
    source.fail_with("connection refused");
    let state = AppState::new(source, AnalysisConfig::default())
        .with_clock(Arc::new(FixedClock::at(now())));
    let router = build_router(Arc::new(state));

    let uri = format!("/api/users/{user}/dashboard");
    let (status, json) = get(router, &uri).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], 503);
}
