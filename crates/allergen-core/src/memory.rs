//! In-process event store and food catalog.
//!
//! [`InMemorySource`] implements both [`EventStore`] and [`FoodCatalog`] over
//! plain vectors. It is filled once, then shared read-only (typically behind
//! an [`Arc`](std::sync::Arc)). The catalog enumerates foods in insertion
//! order, and a user becomes known the first time one of their events is
//! recorded or they are registered explicitly.

use std::collections::BTreeSet;

use allergen_types::{AnalysisWindow, Food, FoodId, MealEvent, SymptomEvent, UserId};
use chrono::{DateTime, Utc};

use crate::source::{EventStore, FoodCatalog, SourceError};

/// Vector-backed implementation of the collaborator traits.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    users: BTreeSet<UserId>,
    foods: Vec<Food>,
    meals: Vec<MealEvent>,
    symptoms: Vec<SymptomEvent>,
    outage: Option<String>,
}

impl InMemorySource {
    /// Create an empty source with no users and an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `user_id` known without recording any event for it.
    pub fn register_user(&mut self, user_id: UserId) {
        self.users.insert(user_id);
    }

    /// Append a food to the catalog. A food with the same ID is replaced in
    /// place, keeping its original position.
    pub fn insert_food(&mut self, food: Food) {
        if let Some(existing) = self.foods.iter_mut().find(|f| f.id == food.id) {
            *existing = food;
        } else {
            self.foods.push(food);
        }
    }

    /// Convenience wrapper around [`insert_food`](Self::insert_food) that
    /// generates the ID.
    pub fn add_food(&mut self, name: &str, category: &str, ingredients: &str) -> FoodId {
        let id = FoodId::new();
        self.insert_food(Food {
            id,
            name: name.to_owned(),
            category: category.to_owned(),
            ingredients: ingredients.to_owned(),
        });
        id
    }

    /// Record a meal, registering its user.
    pub fn record_meal(&mut self, meal: MealEvent) {
        self.users.insert(meal.user_id);
        self.meals.push(meal);
    }

    /// Record a symptom, registering its user.
    pub fn record_symptom(&mut self, symptom: SymptomEvent) {
        self.users.insert(symptom.user_id);
        self.symptoms.push(symptom);
    }

    /// Make every subsequent query fail with [`SourceError::Unavailable`].
    pub fn fail_with(&mut self, message: &str) {
        self.outage = Some(message.to_owned());
    }

    fn check_available(&self) -> Result<(), SourceError> {
        match &self.outage {
            Some(message) => Err(SourceError::Unavailable {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn check_user(&self, user_id: UserId) -> Result<(), SourceError> {
        self.check_available()?;
        if self.users.contains(&user_id) {
            Ok(())
        } else {
            Err(SourceError::unknown_user(user_id))
        }
    }
}

impl EventStore for InMemorySource {
    async fn get_meals(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MealEvent>, SourceError> {
        self.check_user(user_id)?;
        let range = AnalysisWindow { start, end };
        let mut meals: Vec<MealEvent> = self
            .meals
            .iter()
            .filter(|m| m.user_id == user_id && range.contains(m.occurred_at))
            .cloned()
            .collect();
        // Most recent first, like the relational store.
        meals.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(meals)
    }

    async fn get_symptoms(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SymptomEvent>, SourceError> {
        self.check_user(user_id)?;
        let range = AnalysisWindow { start, end };
        let mut symptoms: Vec<SymptomEvent> = self
            .symptoms
            .iter()
            .filter(|s| s.user_id == user_id && range.contains(s.occurred_at))
            .cloned()
            .collect();
        symptoms.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(symptoms)
    }
}

impl FoodCatalog for InMemorySource {
    async fn get_all_foods(&self) -> Result<Vec<Food>, SourceError> {
        self.check_available()?;
        Ok(self.foods.clone())
    }

    async fn get_food(&self, food_id: FoodId) -> Result<Option<Food>, SourceError> {
        self.check_available()?;
        Ok(self.foods.iter().find(|f| f.id == food_id).cloned())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    fn meal(user_id: UserId, food_id: FoodId, at: DateTime<Utc>) -> MealEvent {
        MealEvent {
            user_id,
            food_id,
            occurred_at: at,
            quantity: 1.0,
            notes: None,
        }
    }

    #[tokio::test]
    async fn meals_are_filtered_by_user_and_inclusive_range() {
        let mut source = InMemorySource::new();
        let food = source.add_food("Milk", "dairy", "milk");
        let alice = UserId::new();
        let bob = UserId::new();
        let t0 = DateTime::<Utc>::UNIX_EPOCH;

        source.record_meal(meal(alice, food, t0));
        source.record_meal(meal(alice, food, t0 + TimeDelta::hours(5)));
        source.record_meal(meal(alice, food, t0 + TimeDelta::hours(10)));
        source.record_meal(meal(bob, food, t0 + TimeDelta::hours(5)));

        let meals = source
            .get_meals(alice, t0, t0 + TimeDelta::hours(5))
            .await
            .unwrap();
        assert_eq!(meals.len(), 2);
        assert!(meals.iter().all(|m| m.user_id == alice));
        assert_eq!(meals[0].occurred_at, t0 + TimeDelta::hours(5));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let source = InMemorySource::new();
        let stranger = UserId::new();
        let t0 = DateTime::<Utc>::UNIX_EPOCH;

        let result = source.get_symptoms(stranger, t0, t0).await;
        assert_eq!(result, Err(SourceError::unknown_user(stranger)));
    }

    #[tokio::test]
    async fn registered_user_without_events_has_empty_log() {
        let mut source = InMemorySource::new();
        let user = UserId::new();
        source.register_user(user);
        let t0 = DateTime::<Utc>::UNIX_EPOCH;

        assert!(source.get_meals(user, t0, t0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn catalog_keeps_insertion_order() {
        let mut source = InMemorySource::new();
        let a = source.add_food("Apple", "fruit", "apple");
        let b = source.add_food("Bread", "grain", "wheat");
        let c = source.add_food("Cheese", "dairy", "milk");

        let ids: Vec<FoodId> = source
            .get_all_foods()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec![a, b, c]);
        assert_eq!(source.get_food(b).await.unwrap().unwrap().name, "Bread");
        assert!(source.get_food(FoodId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn outage_fails_every_query() {
        let mut source = InMemorySource::new();
        source.add_food("Apple", "fruit", "apple");
        source.fail_with("disk on fire");

        assert!(matches!(
            source.get_all_foods().await,
            Err(SourceError::Unavailable { .. })
        ));
    }
}
