//! Personalised recommendations derived from a user's history.

use allergen_types::{
    FoodRiskScore, MealEvent, Priority, Recommendation, RecommendationKind, SymptomEvent, UserId,
};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::engine::AllergyEngine;
use crate::error::AnalysisError;
use crate::source::{EventStore, FoodCatalog};
use crate::window::analysis_window;

/// Recent meals inspected for dietary variety.
pub const RECENT_MEALS: usize = 30;

/// Fewer distinct foods than this among the recent meals triggers a
/// diversification hint.
pub const MIN_DISTINCT_FOODS: usize = 5;

/// More symptoms than this triggers a symptom-pattern hint.
pub const SYMPTOM_PATTERN_MIN: usize = 10;

/// Names listed in an allergy warning.
pub const WARNING_FOODS: usize = 3;

/// Warn about detected foods scoring strictly above `alert_score`.
pub fn allergy_warning(ranked: &[FoodRiskScore], alert_score: f64) -> Option<Recommendation> {
    let high: Vec<&FoodRiskScore> = ranked.iter().filter(|r| r.risk_score > alert_score).collect();
    if high.is_empty() {
        return None;
    }
    Some(Recommendation {
        kind: RecommendationKind::AllergyWarning,
        priority: Priority::High,
        title: String::from("Potential allergies detected"),
        message: format!(
            "{} food(s) show a high risk of triggering symptoms. Consult a physician.",
            high.len()
        ),
        foods: high
            .iter()
            .take(WARNING_FOODS)
            .map(|r| r.food_name.clone())
            .collect(),
        action: None,
    })
}

/// Suggest more variety when the most recent meals cover few foods.
///
/// `meals` must be ordered most recent first.
pub fn diversification(meals: &[MealEvent]) -> Option<Recommendation> {
    let mut distinct = Vec::new();
    for meal in meals.iter().take(RECENT_MEALS) {
        if !distinct.contains(&meal.food_id) {
            distinct.push(meal.food_id);
        }
    }
    if distinct.len() >= MIN_DISTINCT_FOODS {
        return None;
    }
    Some(Recommendation {
        kind: RecommendationKind::Diversification,
        priority: Priority::Medium,
        title: String::from("Diversify your diet"),
        message: String::from("Try to include more variety in your meals."),
        foods: Vec::new(),
        action: Some(String::from("Explore new foods from the catalog")),
    })
}

/// The most frequent symptom type and its count. Ties go to the type
/// encountered first.
pub fn most_frequent_symptom(symptoms: &[SymptomEvent]) -> Option<(&str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for symptom in symptoms {
        let kind = symptom.symptom_type.as_str();
        if let Some(entry) = counts.iter_mut().find(|(k, _)| *k == kind) {
            entry.1 = entry.1.saturating_add(1);
        } else {
            counts.push((kind, 1));
        }
    }
    counts
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, candidate| match best {
            Some(b) if b.1 >= candidate.1 => Some(b),
            _ => Some(candidate),
        })
}

/// Point out a recurring symptom when many were logged.
pub fn symptom_pattern(symptoms: &[SymptomEvent]) -> Option<Recommendation> {
    if symptoms.len() <= SYMPTOM_PATTERN_MIN {
        return None;
    }
    let (kind, count) = most_frequent_symptom(symptoms)?;
    Some(Recommendation {
        kind: RecommendationKind::SymptomPattern,
        priority: Priority::Medium,
        title: String::from("Recurring symptoms detected"),
        message: format!(
            "You reported \"{kind}\" {count} times. Keep an eye on your eating habits."
        ),
        foods: Vec::new(),
        action: Some(String::from("Keep a more detailed journal")),
    })
}

impl<E: EventStore, C: FoodCatalog> AllergyEngine<'_, E, C> {
    /// Recommendations for `user_id`, in the order allergy warning,
    /// diversification, symptom pattern. Any of them may be absent.
    ///
    /// Meals and symptoms are read over the configured history window; the
    /// allergy warning uses the detector at the default threshold.
    ///
    /// # Errors
    ///
    /// Passes through any collaborator error.
    pub async fn recommendations(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Recommendation>, AnalysisError> {
        let history = analysis_window(now, self.config().history_days)?;
        let meals = self
            .events()
            .get_meals(user_id, history.start, history.end)
            .await?;
        let symptoms = self
            .events()
            .get_symptoms(user_id, history.start, history.end)
            .await?;
        let ranked = self
            .detect(user_id, self.config().default_threshold, now)
            .await?;

        let recommendations: Vec<Recommendation> = [
            allergy_warning(&ranked, self.config().alert_risk_score),
            diversification(&meals),
            symptom_pattern(&symptoms),
        ]
        .into_iter()
        .flatten()
        .collect();

        debug!(%user_id, count = recommendations.len(), "Generated recommendations");
        Ok(recommendations)
    }
}
