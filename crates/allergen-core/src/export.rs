//! Read-only export of a user's history together with the current analysis.

use allergen_types::{ExportedMeal, Food, MealEvent, UserDataExport, UserId};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::dashboard::food_name;
use crate::engine::AllergyEngine;
use crate::error::AnalysisError;
use crate::source::{EventStore, FoodCatalog};
use crate::window::analysis_window;

/// Attach catalog name and ingredients to a meal.
pub fn resolve_meal(foods: &[Food], meal: MealEvent) -> ExportedMeal {
    let ingredients = foods
        .iter()
        .find(|f| f.id == meal.food_id)
        .map(|f| f.ingredients.clone())
        .unwrap_or_default();
    ExportedMeal {
        food_id: meal.food_id,
        food_name: food_name(foods, meal.food_id),
        ingredients,
        occurred_at: meal.occurred_at,
        quantity: meal.quantity,
        notes: meal.notes,
    }
}

impl<E: EventStore, C: FoodCatalog> AllergyEngine<'_, E, C> {
    /// The user's meals and symptoms over the configured history window,
    /// plus the detector output at the default threshold, stamped with `now`.
    ///
    /// # Errors
    ///
    /// Passes through any collaborator error, including an unknown user.
    pub async fn export(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<UserDataExport, AnalysisError> {
        let history = analysis_window(now, self.config().history_days)?;
        let foods = self.catalog().get_all_foods().await?;
        let meals = self
            .events()
            .get_meals(user_id, history.start, history.end)
            .await?;
        let symptoms = self
            .events()
            .get_symptoms(user_id, history.start, history.end)
            .await?;
        let allergy_analysis = self
            .detect_in(&foods, user_id, self.config().default_threshold, now)
            .await?;

        info!(
            %user_id,
            meals = meals.len(),
            symptoms = symptoms.len(),
            detected = allergy_analysis.len(),
            "Exported user data"
        );

        Ok(UserDataExport {
            user_id,
            meals: meals
                .into_iter()
                .map(|meal| resolve_meal(&foods, meal))
                .collect(),
            symptoms,
            allergy_analysis,
            export_date: now,
        })
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing
)]
mod tests {
    use allergen_types::FoodId;
    use chrono::TimeDelta;

    use super::*;
    use crate::fixtures::Fixture;

    #[test]
    fn unlisted_food_falls_back_to_its_id() {
        let food_id = FoodId::new();
        let meal = MealEvent {
            user_id: UserId::new(),
            food_id,
            occurred_at: DateTime::<Utc>::UNIX_EPOCH,
            quantity: 2.0,
            notes: Some(String::from("lunch")),
        };

        let exported = resolve_meal(&[], meal);
        assert_eq!(exported.food_name, food_id.to_string());
        assert!(exported.ingredients.is_empty());
        assert_eq!(exported.notes.as_deref(), Some("lunch"));
    }

    #[tokio::test]
    async fn export_bundles_history_and_detection() {
        let mut fx = Fixture::new();
        let peanuts = fx.food("Peanuts");
        let rice = fx.food("Rice");
        let t = fx.days_ago(3);
        fx.meal(peanuts, t);
        fx.symptom(t + TimeDelta::hours(4));
        fx.meal(rice, fx.days_ago(1));
        // Older than the detection window, still inside the history window.
        fx.meal(rice, fx.days_ago(200));

        let export = fx.engine().export(fx.user, fx.now).await.unwrap();
        assert_eq!(export.user_id, fx.user);
        assert_eq!(export.export_date, fx.now);
        assert_eq!(export.meals.len(), 3);
        assert_eq!(export.meals[0].food_name, "Rice");
        assert_eq!(export.meals[1].ingredients, "Peanuts");
        assert_eq!(export.symptoms.len(), 1);
        assert_eq!(export.allergy_analysis.len(), 1);
        assert_eq!(export.allergy_analysis[0].food_id, peanuts);
        assert_eq!(export.allergy_analysis[0].risk_score, 100.0);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let mut fx = Fixture::new();
        fx.food("Oats");
        let result = fx.engine().export(UserId::new(), fx.now).await;
        assert!(matches!(result, Err(AnalysisError::NotFound { entity: "user", .. })));
    }
}
