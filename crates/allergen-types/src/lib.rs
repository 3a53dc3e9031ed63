//! Shared type definitions for the allergen correlation service.
//!
//! Every crate in the workspace speaks in these types: the event store
//! produces [`MealEvent`] and [`SymptomEvent`] snapshots, the food catalog
//! produces [`Food`] records, and the analysis engine returns the output
//! records below. Output types flow to `TypeScript` via `ts-rs` for the
//! dashboard front end.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for users and foods
//! - [`enums`] -- Risk tiers and recommendation kinds
//! - [`structs`] -- Input events, reference data, analysis output, and exports

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Priority, RecommendationKind, RiskLevel};
pub use ids::{FoodId, UserId};
pub use structs::{
    AllergyOverview, AllergyReport, AnalysisWindow, ConsumptionPatterns, DashboardStatistics,
    DashboardSummary, ExportedMeal, Food, FoodConsumption, FoodRiskScore, MealEvent,
    Recommendation, RiskAssessment, SymptomEvent, UserDataExport,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files are written to `bindings/` relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::UserId::export_all();
        let _ = crate::ids::FoodId::export_all();

        // Enums
        let _ = crate::enums::RiskLevel::export_all();
        let _ = crate::enums::RecommendationKind::export_all();
        let _ = crate::enums::Priority::export_all();

        // Structs
        let _ = crate::structs::Food::export_all();
        let _ = crate::structs::MealEvent::export_all();
        let _ = crate::structs::SymptomEvent::export_all();
        let _ = crate::structs::AnalysisWindow::export_all();
        let _ = crate::structs::FoodRiskScore::export_all();
        let _ = crate::structs::RiskAssessment::export_all();
        let _ = crate::structs::AllergyReport::export_all();
        let _ = crate::structs::DashboardStatistics::export_all();
        let _ = crate::structs::AllergyOverview::export_all();
        let _ = crate::structs::FoodConsumption::export_all();
        let _ = crate::structs::ConsumptionPatterns::export_all();
        let _ = crate::structs::DashboardSummary::export_all();
        let _ = crate::structs::Recommendation::export_all();
        let _ = crate::structs::ExportedMeal::export_all();
        let _ = crate::structs::UserDataExport::export_all();
    }
}
