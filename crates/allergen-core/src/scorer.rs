//! Per-food risk scoring.
//!
//! A food's risk score is the percentage of its meal instances in the
//! analysis window that were followed by a qualifying symptom, rounded to two
//! decimals. A food with no instances scores `0.0`.

use allergen_types::{FoodId, MealEvent, SymptomEvent, UserId};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::engine::AllergyEngine;
use crate::error::AnalysisError;
use crate::source::{EventStore, FoodCatalog};
use crate::window::{CorrelationWindow, analysis_window, symptom_range};

/// Round a percentage to two decimal places, ties to even.
pub fn round_score(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// `100 * part / whole`. Callers guarantee `whole > 0`.
#[allow(clippy::cast_precision_loss)]
const fn percentage(part: usize, whole: usize) -> f64 {
    100.0 * (part as f64) / (whole as f64)
}

/// Score a set of meal instances against a symptom snapshot.
///
/// Every instance counts once towards the total and at most once towards the
/// triggered count. Returns `0.0` for an empty set.
pub fn score_instances<'m, I>(
    instances: I,
    symptoms: &[SymptomEvent],
    correlation: &CorrelationWindow,
) -> f64
where
    I: IntoIterator<Item = &'m MealEvent>,
{
    let mut total: usize = 0;
    let mut triggered: usize = 0;
    for meal in instances {
        total = total.saturating_add(1);
        if correlation.matches(meal.occurred_at, symptoms) {
            triggered = triggered.saturating_add(1);
        }
    }
    if total == 0 {
        return 0.0;
    }
    round_score(percentage(triggered, total))
}

/// Score one food given the user's full meal and symptom snapshots.
pub fn score_food(
    food_id: FoodId,
    meals: &[MealEvent],
    symptoms: &[SymptomEvent],
    correlation: &CorrelationWindow,
) -> f64 {
    score_instances(
        meals.iter().filter(|m| m.food_id == food_id),
        symptoms,
        correlation,
    )
}

impl<E: EventStore, C: FoodCatalog> AllergyEngine<'_, E, C> {
    /// Risk score of `food_id` for `user_id` over `[now - days_back, now]`.
    ///
    /// Meals are fetched first; if the food was never eaten in the window the
    /// score is `0.0` and symptoms are not fetched at all. Otherwise symptoms
    /// are fetched once and every instance is matched against that snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidParameter`] for `days_back == 0`, and
    /// passes through any collaborator error unchanged.
    pub async fn score(
        &self,
        user_id: UserId,
        food_id: FoodId,
        days_back: u32,
        now: DateTime<Utc>,
    ) -> Result<f64, AnalysisError> {
        let window = analysis_window(now, days_back)?;
        let meals = self
            .events()
            .get_meals(user_id, window.start, window.end)
            .await?;
        let instances: Vec<&MealEvent> = meals.iter().filter(|m| m.food_id == food_id).collect();

        if instances.is_empty() {
            debug!(%user_id, %food_id, days_back, "No instances in window, score is zero");
            return Ok(0.0);
        }

        let range = symptom_range(
            window,
            self.correlation(),
            self.config().extend_symptom_horizon,
        );
        let symptoms = self
            .events()
            .get_symptoms(user_id, range.start, range.end)
            .await?;

        let score = score_instances(instances.iter().copied(), &symptoms, self.correlation());
        debug!(
            %user_id,
            %food_id,
            days_back,
            instances = instances.len(),
            symptoms = symptoms.len(),
            score,
            "Scored food"
        );
        Ok(score)
    }
}
