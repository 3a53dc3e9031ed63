//! Shared scaffolding for the engine tests.

#![allow(
    clippy::unwrap_used,
    clippy::arithmetic_side_effects,
    clippy::new_without_default
)]

use allergen_types::{FoodId, MealEvent, SymptomEvent, UserId};
use chrono::{DateTime, TimeDelta, Utc};

use crate::config::AnalysisConfig;
use crate::engine::AllergyEngine;
use crate::memory::InMemorySource;

/// One registered user over an in-memory source, at a fixed "now".
pub struct Fixture {
    pub source: InMemorySource,
    pub config: AnalysisConfig,
    pub user: UserId,
    pub now: DateTime<Utc>,
}

impl Fixture {
    pub fn new() -> Self {
        let mut source = InMemorySource::new();
        let user = UserId::new();
        source.register_user(user);
        let now = DateTime::parse_from_rfc3339("2026-06-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        Self {
            source,
            config: AnalysisConfig::default(),
            user,
            now,
        }
    }

    pub fn engine(&self) -> AllergyEngine<'_, InMemorySource, InMemorySource> {
        AllergyEngine::new(&self.source, &self.source, &self.config).unwrap()
    }

    pub fn food(&mut self, name: &str) -> FoodId {
        self.source.add_food(name, "test", name)
    }

    pub fn days_ago(&self, days: i64) -> DateTime<Utc> {
        self.now - TimeDelta::days(days)
    }

    pub fn meal(&mut self, food_id: FoodId, at: DateTime<Utc>) {
        self.source.record_meal(MealEvent {
            user_id: self.user,
            food_id,
            occurred_at: at,
            quantity: 1.0,
            notes: None,
        });
    }

    pub fn symptom(&mut self, at: DateTime<Utc>) {
        self.symptom_of("hives", at);
    }

    pub fn symptom_of(&mut self, symptom_type: &str, at: DateTime<Utc>) {
        self.source.record_symptom(SymptomEvent {
            user_id: self.user,
            symptom_type: symptom_type.to_owned(),
            severity: 5,
            occurred_at: at,
            description: None,
        });
    }
}
