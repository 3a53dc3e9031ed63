//! Per-user dashboard: activity statistics, an allergy overview and
//! consumption patterns over a period.

use std::collections::BTreeMap;

use allergen_types::{
    AllergyOverview, ConsumptionPatterns, DashboardStatistics, DashboardSummary, Food,
    FoodConsumption, FoodId, FoodRiskScore, MealEvent, UserId,
};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::detector::validate_threshold;
use crate::engine::AllergyEngine;
use crate::error::AnalysisError;
use crate::source::{EventStore, FoodCatalog};
use crate::window::analysis_window;

/// Number of detected foods shown in the overview.
pub const TOP_RISKS: usize = 3;

/// Number of foods listed in the consumption patterns.
pub const MOST_CONSUMED: usize = 5;

/// `count / days` rounded to one decimal, ties to even.
#[allow(clippy::cast_precision_loss)]
fn per_day(count: usize, days: u32) -> f64 {
    let avg = count as f64 / f64::from(days);
    (avg * 10.0).round_ties_even() / 10.0
}

/// Meal counts per food, most eaten first. Ties keep the order in which the
/// foods first appear in `meals`.
pub fn consumption_counts(meals: &[MealEvent]) -> Vec<(FoodId, usize)> {
    let mut counts: Vec<(FoodId, usize)> = Vec::new();
    let mut position: BTreeMap<FoodId, usize> = BTreeMap::new();
    for meal in meals {
        if let Some(&i) = position.get(&meal.food_id) {
            if let Some(entry) = counts.get_mut(i) {
                entry.1 = entry.1.saturating_add(1);
            }
        } else {
            position.insert(meal.food_id, counts.len());
            counts.push((meal.food_id, 1));
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Summarise an already-ranked detection result.
pub fn overview(ranked: &[FoodRiskScore], alert_score: f64) -> AllergyOverview {
    AllergyOverview {
        total_potential_allergies: ranked.len(),
        high_risk_foods: ranked.iter().filter(|r| r.risk_score >= alert_score).count(),
        top_risks: ranked.iter().take(TOP_RISKS).cloned().collect(),
    }
}

/// Catalog name of `food_id`, or the ID itself for foods no longer listed.
pub(crate) fn food_name(foods: &[Food], food_id: FoodId) -> String {
    foods
        .iter()
        .find(|f| f.id == food_id)
        .map_or_else(|| food_id.to_string(), |f| f.name.clone())
}

impl<E: EventStore, C: FoodCatalog> AllergyEngine<'_, E, C> {
    /// Build the dashboard for `user_id` over `[now - days_back, now]`.
    ///
    /// The allergy overview runs the detector over its own default window at
    /// the configured default threshold, independent of `days_back`. The
    /// catalog is read once; when `days_back` equals the default window the
    /// statistics and the overview share one event snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidParameter`] for `days_back == 0`, and
    /// passes through any collaborator error.
    pub async fn dashboard(
        &self,
        user_id: UserId,
        days_back: u32,
        now: DateTime<Utc>,
    ) -> Result<DashboardSummary, AnalysisError> {
        let window = analysis_window(now, days_back)?;
        let foods = self.catalog().get_all_foods().await?;
        let snapshot = self.snapshot(user_id, window).await?;

        let threshold = self.config().default_threshold;
        let ranked = if days_back == self.config().default_days_back {
            validate_threshold(threshold)?;
            self.rank_snapshot(&foods, &snapshot, threshold)
        } else {
            self.detect_in(&foods, user_id, threshold, now).await?
        };

        let meals = &snapshot.meals;
        // The snapshot may reach past `now` for the correlation horizon.
        let symptoms = snapshot
            .symptoms
            .iter()
            .filter(|s| window.contains(s.occurred_at))
            .count();

        let most_consumed_foods = consumption_counts(meals)
            .into_iter()
            .take(MOST_CONSUMED)
            .map(|(food_id, count)| FoodConsumption {
                food: food_name(&foods, food_id),
                count,
            })
            .collect();

        debug!(
            %user_id,
            days_back,
            meals = meals.len(),
            symptoms,
            detected = ranked.len(),
            "Built dashboard"
        );

        Ok(DashboardSummary {
            user_id,
            period_days: days_back,
            statistics: DashboardStatistics {
                total_meals: meals.len(),
                total_symptoms: symptoms,
                avg_meals_per_day: per_day(meals.len(), days_back),
                avg_symptoms_per_day: per_day(symptoms, days_back),
            },
            allergy_analysis: overview(&ranked, self.config().alert_risk_score),
            consumption_patterns: ConsumptionPatterns { most_consumed_foods },
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
    use chrono::TimeDelta;

    use super::*;
    use crate::fixtures::Fixture;

    fn scored(score: f64) -> FoodRiskScore {
        FoodRiskScore {
            food_id: FoodId::new(),
            food_name: String::from("x"),
            risk_score: score,
            recommendation: String::new(),
        }
    }

    #[test]
    fn averages_round_to_one_decimal() {
        assert_eq!(per_day(10, 30), 0.3);
        assert_eq!(per_day(45, 30), 1.5);
        assert_eq!(per_day(0, 7), 0.0);
    }

    #[test]
    fn averages_round_ties_to_even() {
        assert_eq!(per_day(1, 4), 0.2);
        assert_eq!(per_day(3, 4), 0.8);
    }

    #[test]
    fn alert_count_is_inclusive() {
        let ranked = vec![scored(80.0), scored(50.0), scored(49.99), scored(31.0)];
        let summary = overview(&ranked, 50.0);
        assert_eq!(summary.total_potential_allergies, 4);
        assert_eq!(summary.high_risk_foods, 2);
        assert_eq!(summary.top_risks.len(), TOP_RISKS);
        assert_eq!(summary.top_risks[0].risk_score, 80.0);
    }

    #[tokio::test]
    async fn dashboard_counts_and_patterns() {
        let mut fx = Fixture::new();
        let peanuts = fx.food("Peanuts");
        let rice = fx.food("Rice");
        let apple = fx.food("Apple");

        let t = fx.days_ago(3);
        fx.meal(peanuts, t);
        fx.symptom(t + TimeDelta::hours(3));
        for day in [1, 2, 8] {
            fx.meal(rice, fx.days_ago(day));
        }
        fx.meal(apple, fx.days_ago(5));
        // Outside the 10 day period.
        fx.meal(apple, fx.days_ago(20));

        let summary = fx.engine().dashboard(fx.user, 10, fx.now).await.unwrap();
        assert_eq!(summary.period_days, 10);
        assert_eq!(summary.statistics.total_meals, 5);
        assert_eq!(summary.statistics.total_symptoms, 1);
        assert_eq!(summary.statistics.avg_meals_per_day, 0.5);
        assert_eq!(summary.statistics.avg_symptoms_per_day, 0.1);

        assert_eq!(summary.allergy_analysis.total_potential_allergies, 1);
        assert_eq!(summary.allergy_analysis.high_risk_foods, 1);
        assert_eq!(summary.allergy_analysis.top_risks[0].food_id, peanuts);

        let patterns: Vec<(&str, usize)> = summary
            .consumption_patterns
            .most_consumed_foods
            .iter()
            .map(|c| (c.food.as_str(), c.count))
            .collect();
        assert_eq!(patterns, vec![("Rice", 3), ("Peanuts", 1), ("Apple", 1)]);
    }

    #[tokio::test]
    async fn default_period_matches_standalone_detection() {
        let mut fx = Fixture::new();
        let peanuts = fx.food("Peanuts");
        let rice = fx.food("Rice");
        for day in [4, 12, 27] {
            let t = fx.days_ago(day);
            fx.meal(peanuts, t);
            fx.symptom(t + TimeDelta::hours(5));
        }
        fx.meal(rice, fx.days_ago(2));

        let engine = fx.engine();
        let days = fx.config.default_days_back;
        let summary = engine.dashboard(fx.user, days, fx.now).await.unwrap();
        let detected = engine
            .detect(fx.user, fx.config.default_threshold, fx.now)
            .await
            .unwrap();
        assert_eq!(summary.allergy_analysis.top_risks, detected);
        assert_eq!(summary.statistics.total_meals, 4);
        assert_eq!(summary.statistics.total_symptoms, 3);
    }

    #[tokio::test]
    async fn symptoms_past_now_are_not_counted() {
        let mut fx = Fixture::new();
        fx.config.extend_symptom_horizon = true;
        let wheat = fx.food("Wheat");
        let t = fx.now - TimeDelta::hours(1);
        fx.meal(wheat, t);
        fx.symptom(t + TimeDelta::hours(3));

        let summary = fx.engine().dashboard(fx.user, 30, fx.now).await.unwrap();
        assert_eq!(summary.statistics.total_symptoms, 0);
        assert_eq!(summary.allergy_analysis.high_risk_foods, 1);
    }

    #[tokio::test]
    async fn consumption_is_capped_at_five() {
        let mut fx = Fixture::new();
        for (i, name) in ["A", "B", "C", "D", "E", "F", "G"].iter().enumerate() {
            let food = fx.food(name);
            fx.meal(food, fx.days_ago(i64::try_from(i).unwrap() + 1));
        }

        let summary = fx.engine().dashboard(fx.user, 30, fx.now).await.unwrap();
        assert_eq!(
            summary.consumption_patterns.most_consumed_foods.len(),
            MOST_CONSUMED
        );
    }

    #[tokio::test]
    async fn empty_log_gives_empty_dashboard() {
        let mut fx = Fixture::new();
        fx.food("Rice");

        let summary = fx.engine().dashboard(fx.user, 30, fx.now).await.unwrap();
        assert_eq!(summary.statistics.total_meals, 0);
        assert_eq!(summary.statistics.avg_meals_per_day, 0.0);
        assert_eq!(summary.allergy_analysis.total_potential_allergies, 0);
        assert!(summary.consumption_patterns.most_consumed_foods.is_empty());
    }

    #[tokio::test]
    async fn zero_days_is_invalid() {
        let fx = Fixture::new();
        let result = fx.engine().dashboard(fx.user, 0, fx.now).await;
        assert!(matches!(result, Err(AnalysisError::InvalidParameter { .. })));
    }
}
