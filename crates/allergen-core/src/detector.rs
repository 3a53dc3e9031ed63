//! Allergy detection: score every catalog food and keep the risky ones.

use std::collections::BTreeMap;

use allergen_types::{
    AllergyReport, Food, FoodId, FoodRiskScore, MealEvent, SymptomEvent, UserId,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::engine::{AllergyEngine, EventSnapshot};
use crate::error::AnalysisError;
use crate::scorer::score_instances;
use crate::source::{EventStore, FoodCatalog};
use crate::window::{CorrelationWindow, analysis_window};

/// Reject thresholds outside `[0, 100]`, including NaN.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidParameter`] when the threshold is invalid.
pub fn validate_threshold(threshold: f64) -> Result<(), AnalysisError> {
    if (0.0..=100.0).contains(&threshold) {
        Ok(())
    } else {
        Err(AnalysisError::invalid(format!(
            "threshold must be within [0, 100], got {threshold}"
        )))
    }
}

/// Score every food in `foods` against one event snapshot and return those
/// scoring at least `threshold`, highest first.
///
/// Foods the user never ate score `0.0` and are kept only at threshold `0`.
/// The sort is stable, so foods with equal scores keep catalog order.
pub fn rank(
    foods: &[Food],
    meals: &[MealEvent],
    symptoms: &[SymptomEvent],
    correlation: &CorrelationWindow,
    threshold: f64,
    recommendation: &str,
) -> Vec<FoodRiskScore> {
    let mut by_food: BTreeMap<FoodId, Vec<&MealEvent>> = BTreeMap::new();
    for meal in meals {
        by_food.entry(meal.food_id).or_default().push(meal);
    }

    let mut ranked: Vec<FoodRiskScore> = foods
        .iter()
        .filter_map(|food| {
            let instances = by_food.get(&food.id).map_or(&[][..], Vec::as_slice);
            let risk_score = score_instances(instances.iter().copied(), symptoms, correlation);
            (risk_score >= threshold).then(|| FoodRiskScore {
                food_id: food.id,
                food_name: food.name.clone(),
                risk_score,
                recommendation: recommendation.to_owned(),
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));
    ranked
}

impl<E: EventStore, C: FoodCatalog> AllergyEngine<'_, E, C> {
    /// Foods whose risk score over the default analysis window is at least
    /// `threshold`, ordered by descending score.
    ///
    /// The catalog and the user's events are each fetched once per call.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidParameter`] for a threshold outside
    /// `[0, 100]`, and passes through any collaborator error.
    pub async fn detect(
        &self,
        user_id: UserId,
        threshold: f64,
        now: DateTime<Utc>,
    ) -> Result<Vec<FoodRiskScore>, AnalysisError> {
        validate_threshold(threshold)?;
        let foods = self.catalog().get_all_foods().await?;
        self.detect_in(&foods, user_id, threshold, now).await
    }

    /// [`detect`](Self::detect) against an already fetched catalog.
    pub(crate) async fn detect_in(
        &self,
        foods: &[Food],
        user_id: UserId,
        threshold: f64,
        now: DateTime<Utc>,
    ) -> Result<Vec<FoodRiskScore>, AnalysisError> {
        validate_threshold(threshold)?;
        let window = analysis_window(now, self.config().default_days_back)?;
        let snapshot = self.snapshot(user_id, window).await?;
        let ranked = self.rank_snapshot(foods, &snapshot, threshold);
        debug!(
            %user_id,
            threshold,
            foods = foods.len(),
            detected = ranked.len(),
            "Detected potential allergies"
        );
        Ok(ranked)
    }

    /// [`rank`] over a snapshot with this engine's window and recommendation.
    pub(crate) fn rank_snapshot(
        &self,
        foods: &[Food],
        snapshot: &EventSnapshot,
        threshold: f64,
    ) -> Vec<FoodRiskScore> {
        rank(
            foods,
            &snapshot.meals,
            &snapshot.symptoms,
            self.correlation(),
            threshold,
            &self.config().recommendation,
        )
    }

    /// [`detect`](Self::detect) wrapped in a dated report.
    ///
    /// # Errors
    ///
    /// Same as [`detect`](Self::detect).
    pub async fn report(
        &self,
        user_id: UserId,
        threshold: f64,
        now: DateTime<Utc>,
    ) -> Result<AllergyReport, AnalysisError> {
        let potential_allergies = self.detect(user_id, threshold, now).await?;
        let total_detected = potential_allergies.len();
        info!(%user_id, threshold, total_detected, "Allergy analysis complete");
        Ok(AllergyReport {
            user_id,
            analysis_date: now,
            threshold_used: threshold,
            potential_allergies,
            total_detected,
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

    #[test]
    fn threshold_bounds() {
        assert!(validate_threshold(0.0).is_ok());
        assert!(validate_threshold(100.0).is_ok());
        assert!(validate_threshold(-0.5).is_err());
        assert!(validate_threshold(100.5).is_err());
        assert!(validate_threshold(f64::NAN).is_err());
    }

    #[test]
    fn empty_catalog_ranks_nothing() {
        let ranked = rank(&[], &[], &[], &CorrelationWindow::default(), 0.0, "x");
        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn scenario_ranking_and_threshold() {
        let mut fx = Fixture::new();
        let a = fx.food("Peanuts");
        let b = fx.food("Milk");
        let c = fx.food("Rice");

        // A: 3 of 4 meals triggered (75.0).
        let a_times: Vec<_> = [20, 15, 10, 5].iter().map(|d| fx.days_ago(*d)).collect();
        for t in &a_times {
            fx.meal(a, *t);
        }
        for t in &a_times[..3] {
            fx.symptom(*t + TimeDelta::hours(4));
        }
        // B: 2 of 5 meals triggered (40.0); symptoms land outside A's windows.
        let b_times: Vec<_> = [28, 26, 24, 22, 18].iter().map(|d| fx.days_ago(*d)).collect();
        for t in &b_times {
            fx.meal(b, *t);
        }
        fx.symptom(b_times[0] + TimeDelta::hours(3));
        fx.symptom(b_times[4] + TimeDelta::hours(3));
        // C: eaten once, never followed by a symptom.
        fx.meal(c, fx.days_ago(1));

        let engine = fx.engine();
        let at_30 = engine.detect(fx.user, 30.0, fx.now).await.unwrap();
        let names: Vec<&str> = at_30.iter().map(|r| r.food_name.as_str()).collect();
        assert_eq!(names, vec!["Peanuts", "Milk"]);
        assert_eq!(at_30[0].risk_score, 75.0);
        assert_eq!(at_30[1].risk_score, 40.0);

        let at_50 = engine.detect(fx.user, 50.0, fx.now).await.unwrap();
        assert_eq!(at_50.len(), 1);
        assert_eq!(at_50[0].food_id, a);
        assert_eq!(at_50[0].recommendation, fx.config.recommendation);
    }

    #[tokio::test]
    async fn threshold_is_inclusive() {
        let mut fx = Fixture::new();
        let food = fx.food("Shrimp");
        let t1 = fx.days_ago(10);
        fx.meal(food, t1);
        fx.meal(food, fx.days_ago(4));
        fx.symptom(t1 + TimeDelta::hours(12));

        let engine = fx.engine();
        assert_eq!(engine.detect(fx.user, 50.0, fx.now).await.unwrap().len(), 1);
        assert!(engine.detect(fx.user, 50.01, fx.now).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scenario_catalog_of_three() {
        let mut fx = Fixture::new();
        fx.config.default_days_back = 90;
        let low = fx.food("Low");
        let mid = fx.food("Mid");
        let high = fx.food("High");

        // Mid: 9 of 20 triggered (45.0), meals three days apart.
        for i in 0..20 {
            let t = fx.days_ago(89 - 3 * i);
            fx.meal(mid, t);
            if i < 9 {
                fx.symptom(t + TimeDelta::hours(2));
            }
        }
        // High: 4 of 5 triggered (80.0).
        for (i, day) in [25, 22, 19, 16, 13].into_iter().enumerate() {
            let t = fx.days_ago(day);
            fx.meal(high, t);
            if i < 4 {
                fx.symptom(t + TimeDelta::hours(2));
            }
        }
        // Low: 1 of 10 triggered (10.0), eaten once alongside High.
        fx.meal(low, fx.days_ago(25));
        for day in 4..13 {
            fx.meal(low, fx.days_ago(day));
        }

        let ranked = fx.engine().detect(fx.user, 30.0, fx.now).await.unwrap();
        let scored: Vec<(FoodId, f64)> = ranked.iter().map(|r| (r.food_id, r.risk_score)).collect();
        assert_eq!(scored, vec![(high, 80.0), (mid, 45.0)]);
        assert!(!ranked.iter().any(|r| r.food_id == low));
    }

    #[tokio::test]
    async fn repeated_detection_is_identical() {
        let mut fx = Fixture::new();
        let foods: Vec<FoodId> = ["Egg", "Soy", "Corn", "Oats"]
            .iter()
            .map(|name| fx.food(name))
            .collect();
        for (i, food) in foods.iter().enumerate() {
            let t = fx.days_ago(i64::try_from(i).unwrap() * 4 + 2);
            fx.meal(*food, t);
            fx.meal(*food, t - TimeDelta::days(1));
            if i % 2 == 0 {
                fx.symptom(t + TimeDelta::hours(6));
            }
        }

        let engine = fx.engine();
        let first = engine.detect(fx.user, 0.0, fx.now).await.unwrap();
        let second = engine.detect(fx.user, 0.0, fx.now).await.unwrap();
        assert_eq!(first.len(), foods.len());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn ties_keep_catalog_order() {
        let mut fx = Fixture::new();
        let first = fx.food("Almond");
        let second = fx.food("Cashew");
        let t = fx.days_ago(3);
        // Added in reverse so event order cannot explain the result.
        fx.meal(second, t);
        fx.meal(first, t);
        fx.symptom(t + TimeDelta::hours(5));

        let ranked = fx.engine().detect(fx.user, 10.0, fx.now).await.unwrap();
        let ids: Vec<FoodId> = ranked.iter().map(|r| r.food_id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[tokio::test]
    async fn zero_threshold_includes_uneaten_foods() {
        let mut fx = Fixture::new();
        let eaten = fx.food("Oats");
        let uneaten = fx.food("Kiwi");
        fx.meal(eaten, fx.days_ago(2));

        let ranked = fx.engine().detect(fx.user, 0.0, fx.now).await.unwrap();
        let ids: Vec<FoodId> = ranked.iter().map(|r| r.food_id).collect();
        assert_eq!(ids, vec![eaten, uneaten]);
        assert!(ranked.iter().all(|r| r.risk_score == 0.0));
    }

    #[tokio::test]
    async fn no_meals_means_no_allergies() {
        let mut fx = Fixture::new();
        fx.food("Oats");
        fx.symptom(fx.days_ago(1));

        let ranked = fx.engine().detect(fx.user, 30.0, fx.now).await.unwrap();
        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn invalid_threshold_is_rejected_before_fetching() {
        let mut fx = Fixture::new();
        fx.source.fail_with("should not be reached");

        let result = fx.engine().detect(fx.user, 150.0, fx.now).await;
        assert!(matches!(result, Err(AnalysisError::InvalidParameter { .. })));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let mut fx = Fixture::new();
        fx.food("Oats");
        let result = fx.engine().detect(UserId::new(), 30.0, fx.now).await;
        assert!(matches!(result, Err(AnalysisError::NotFound { entity: "user", .. })));
    }

    #[tokio::test]
    async fn report_wraps_detection() {
        let mut fx = Fixture::new();
        let food = fx.food("Peanuts");
        let t = fx.days_ago(3);
        fx.meal(food, t);
        fx.symptom(t + TimeDelta::hours(3));

        let report = fx.engine().report(fx.user, 30.0, fx.now).await.unwrap();
        assert_eq!(report.user_id, fx.user);
        assert_eq!(report.analysis_date, fx.now);
        assert_eq!(report.threshold_used, 30.0);
        assert_eq!(report.total_detected, 1);
        assert_eq!(report.potential_allergies[0].food_id, food);
    }
}
