//! Single-food risk assessment.

use allergen_types::{FoodId, RiskAssessment, RiskLevel, UserId};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::engine::AllergyEngine;
use crate::error::AnalysisError;
use crate::source::{EventStore, FoodCatalog};

/// Bucket a risk score: `high` at or above the high cut-off, `moderate` at or
/// above the moderate cut-off, `low` otherwise.
pub fn classify(score: f64, config: &AnalysisConfig) -> RiskLevel {
    if score >= config.high_risk_score {
        RiskLevel::High
    } else if score >= config.moderate_risk_score {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

impl<E: EventStore, C: FoodCatalog> AllergyEngine<'_, E, C> {
    /// Score one food and attach its name and risk level.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::NotFound`] if `food_id` is not in the
    /// catalog (checked before any event is fetched), and otherwise the same
    /// errors as [`score`](Self::score).
    pub async fn risk_for(
        &self,
        user_id: UserId,
        food_id: FoodId,
        days_back: u32,
        now: DateTime<Utc>,
    ) -> Result<RiskAssessment, AnalysisError> {
        let food = self
            .catalog()
            .get_food(food_id)
            .await?
            .ok_or_else(|| AnalysisError::NotFound {
                entity: "food",
                id: food_id.to_string(),
            })?;

        let risk_score = self.score(user_id, food_id, days_back, now).await?;
        let risk_level = classify(risk_score, self.config());
        debug!(%user_id, %food_id, risk_score, %risk_level, "Assessed food risk");

        Ok(RiskAssessment {
            user_id,
            food_id,
            food_name: food.name,
            risk_score,
            risk_level,
            days_analyzed: days_back,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::fixtures::Fixture;

    #[test]
    fn classification_cut_offs_are_inclusive() {
        let config = AnalysisConfig::default();
        assert_eq!(classify(0.0, &config), RiskLevel::Low);
        assert_eq!(classify(14.99, &config), RiskLevel::Low);
        assert_eq!(classify(15.0, &config), RiskLevel::Moderate);
        assert_eq!(classify(29.99, &config), RiskLevel::Moderate);
        assert_eq!(classify(30.0, &config), RiskLevel::High);
        assert_eq!(classify(100.0, &config), RiskLevel::High);
    }

    #[tokio::test]
    async fn assessment_carries_name_and_level() {
        let mut fx = Fixture::new();
        let food = fx.food("Shrimp");
        let t1 = fx.days_ago(10);
        fx.meal(food, t1);
        fx.meal(food, fx.days_ago(4));
        fx.symptom(t1 + TimeDelta::hours(12));

        let assessment = fx.engine().risk_for(fx.user, food, 14, fx.now).await.unwrap();
        assert_eq!(assessment.food_name, "Shrimp");
        assert_eq!(assessment.risk_score, 50.0);
        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert_eq!(assessment.days_analyzed, 14);
    }

    #[tokio::test]
    async fn uneaten_food_is_low_risk() {
        let mut fx = Fixture::new();
        let food = fx.food("Kale");

        let assessment = fx.engine().risk_for(fx.user, food, 30, fx.now).await.unwrap();
        assert_eq!(assessment.risk_score, 0.0);
        assert_eq!(assessment.risk_level, RiskLevel::Low);
    }

    #[tokio::test]
    async fn unknown_food_is_not_found() {
        let fx = Fixture::new();
        let result = fx.engine().risk_for(fx.user, FoodId::new(), 30, fx.now).await;
        assert!(matches!(result, Err(AnalysisError::NotFound { entity: "food", .. })));
    }

    #[tokio::test]
    async fn unknown_food_wins_over_unknown_user() {
        let fx = Fixture::new();
        let result = fx
            .engine()
            .risk_for(UserId::new(), FoodId::new(), 30, fx.now)
            .await;
        assert!(matches!(result, Err(AnalysisError::NotFound { entity: "food", .. })));
    }
}
