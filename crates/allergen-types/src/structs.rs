//! Core record structs for the allergen correlation service.
//!
//! Input records (`Food`, `MealEvent`, `SymptomEvent`) are read-only
//! snapshots supplied by the event store and food catalog. Output records
//! (`FoodRiskScore`, `RiskAssessment`, `AllergyReport`, `DashboardSummary`,
//! `Recommendation`) are recomputed on every request and never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Priority, RecommendationKind, RiskLevel};
use crate::ids::{FoodId, UserId};

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// A food known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Food {
    /// Catalog identifier.
    pub id: FoodId,
    /// Display name.
    pub name: String,
    /// Free-form category (e.g. "dairy", "fruit").
    pub category: String,
    /// Free-form ingredient list.
    pub ingredients: String,
}

// ---------------------------------------------------------------------------
// Event log
// ---------------------------------------------------------------------------

/// One consumption of one food by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MealEvent {
    /// The user who ate.
    pub user_id: UserId,
    /// The food eaten.
    pub food_id: FoodId,
    /// When the meal was eaten.
    pub occurred_at: DateTime<Utc>,
    /// Portion size in the unit the user logged.
    pub quantity: f64,
    /// Optional free-form notes.
    pub notes: Option<String>,
}

/// One adverse symptom reported by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SymptomEvent {
    /// The user who reported the symptom.
    pub user_id: UserId,
    /// Free-form symptom category (e.g. "rash", "bloating").
    pub symptom_type: String,
    /// Severity from 1 (mild) to 5 (severe), validated upstream.
    pub severity: u8,
    /// When the symptom occurred.
    pub occurred_at: DateTime<Utc>,
    /// Optional free-form description.
    pub description: Option<String>,
}

/// The inclusive time range over which meals and symptoms are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AnalysisWindow {
    /// Earliest instant included.
    pub start: DateTime<Utc>,
    /// Latest instant included.
    pub end: DateTime<Utc>,
}

impl AnalysisWindow {
    /// Whether `instant` falls inside the window (both bounds inclusive).
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

// ---------------------------------------------------------------------------
// Engine output
// ---------------------------------------------------------------------------

/// A food reported by the threshold detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FoodRiskScore {
    /// Catalog identifier.
    pub food_id: FoodId,
    /// Catalog display name.
    pub food_name: String,
    /// Percentage of triggered meal instances, in `[0, 100]`, 2 decimals.
    pub risk_score: f64,
    /// Advice attached to every detected food.
    pub recommendation: String,
}

/// Result of a single-food risk lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RiskAssessment {
    /// The analyzed user.
    pub user_id: UserId,
    /// The analyzed food.
    pub food_id: FoodId,
    /// Catalog display name of the food.
    pub food_name: String,
    /// Percentage of triggered meal instances, in `[0, 100]`, 2 decimals.
    pub risk_score: f64,
    /// Qualitative tier derived from `risk_score`.
    pub risk_level: RiskLevel,
    /// Length of the analysis window in days.
    pub days_analyzed: u32,
}

/// Full detector output for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AllergyReport {
    /// The analyzed user.
    pub user_id: UserId,
    /// The instant the analysis was computed for.
    pub analysis_date: DateTime<Utc>,
    /// Minimum score a food needed to be reported.
    pub threshold_used: f64,
    /// Detected foods, highest score first.
    pub potential_allergies: Vec<FoodRiskScore>,
    /// Number of detected foods.
    pub total_detected: usize,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Period totals and daily averages for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DashboardStatistics {
    /// Meals logged in the period.
    pub total_meals: usize,
    /// Symptoms logged in the period.
    pub total_symptoms: usize,
    /// Meals per day, 1 decimal.
    pub avg_meals_per_day: f64,
    /// Symptoms per day, 1 decimal.
    pub avg_symptoms_per_day: f64,
}

/// Detector summary shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AllergyOverview {
    /// Number of foods reported by the detector.
    pub total_potential_allergies: usize,
    /// Number of reported foods at or above the high-risk score.
    pub high_risk_foods: usize,
    /// The highest-ranked reported foods.
    pub top_risks: Vec<FoodRiskScore>,
}

/// How often one food was eaten in the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FoodConsumption {
    /// Display name of the food.
    pub food: String,
    /// Number of meals.
    pub count: usize,
}

/// Consumption habits shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConsumptionPatterns {
    /// Most eaten foods, most frequent first.
    pub most_consumed_foods: Vec<FoodConsumption>,
}

/// Per-user dashboard aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DashboardSummary {
    /// The summarized user.
    pub user_id: UserId,
    /// Length of the summarized period in days.
    pub period_days: u32,
    /// Period totals and averages.
    pub statistics: DashboardStatistics,
    /// Detector summary.
    pub allergy_analysis: AllergyOverview,
    /// Consumption habits.
    pub consumption_patterns: ConsumptionPatterns,
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

/// A piece of personalised advice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Recommendation {
    /// Which rule produced this advice.
    pub kind: RecommendationKind,
    /// Urgency.
    pub priority: Priority,
    /// Short headline.
    pub title: String,
    /// Full message.
    pub message: String,
    /// Food names the advice refers to, if any.
    pub foods: Vec<String>,
    /// Suggested follow-up action, if any.
    pub action: Option<String>,
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// A meal with its food resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ExportedMeal {
    /// The food eaten.
    pub food_id: FoodId,
    /// Catalog display name, or the food ID if the food is no longer listed.
    pub food_name: String,
    /// Catalog ingredient list, empty if the food is no longer listed.
    pub ingredients: String,
    /// When the meal was eaten.
    pub occurred_at: DateTime<Utc>,
    /// Portion size.
    pub quantity: f64,
    /// Optional free-form notes.
    pub notes: Option<String>,
}

/// Everything the service knows about one user, with the current analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UserDataExport {
    /// The exported user.
    pub user_id: UserId,
    /// Meals in the history window, most recent first.
    pub meals: Vec<ExportedMeal>,
    /// Symptoms in the history window, most recent first.
    pub symptoms: Vec<SymptomEvent>,
    /// Detector output at the default threshold.
    pub allergy_analysis: Vec<FoodRiskScore>,
    /// The instant the export was produced for.
    pub export_date: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn window_bounds_are_inclusive() {
        let start = DateTime::<Utc>::UNIX_EPOCH;
        let end = start + TimeDelta::days(1);
        let window = AnalysisWindow { start, end };

        assert!(window.contains(start));
        assert!(window.contains(end));
        assert!(!window.contains(end + TimeDelta::seconds(1)));
        assert!(!window.contains(start - TimeDelta::seconds(1)));
    }

    #[test]
    fn risk_assessment_serializes_level_lowercase() {
        let assessment = RiskAssessment {
            user_id: UserId::new(),
            food_id: FoodId::new(),
            food_name: String::from("Peanuts"),
            risk_score: 42.5,
            risk_level: RiskLevel::High,
            days_analyzed: 30,
        };
        let json = serde_json::to_value(&assessment).ok();
        let level = json.as_ref().and_then(|v| v.get("risk_level")).cloned();
        assert_eq!(level, Some(serde_json::json!("high")));
    }
}
