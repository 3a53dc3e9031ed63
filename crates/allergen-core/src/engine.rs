//! The analysis engine handle.
//!
//! [`AllergyEngine`] borrows its collaborators and configuration for the
//! duration of a request. It holds no mutable state, so concurrent requests
//! can each build their own engine over the same shared source. The
//! operations themselves are implemented next to their algorithms in
//! [`scorer`](crate::scorer), [`detector`](crate::detector),
//! [`lookup`](crate::lookup), [`dashboard`](crate::dashboard) and
//! [`advice`](crate::advice).

use allergen_types::{AnalysisWindow, MealEvent, SymptomEvent, UserId};
use tracing::trace;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::source::{EventStore, FoodCatalog};
use crate::window::{CorrelationWindow, symptom_range};

/// Meals and symptoms of one user, fetched once and shared by every food
/// scored in the same operation.
#[derive(Debug, Clone, Default)]
pub struct EventSnapshot {
    /// Meals eaten in the analysis window, most recent first.
    pub meals: Vec<MealEvent>,
    /// Symptoms in the symptom range for that window.
    pub symptoms: Vec<SymptomEvent>,
}

/// Correlation engine over an injected event store and food catalog.
#[derive(Debug)]
pub struct AllergyEngine<'a, E, C> {
    events: &'a E,
    catalog: &'a C,
    config: &'a AnalysisConfig,
    correlation: CorrelationWindow,
}

impl<'a, E: EventStore, C: FoodCatalog> AllergyEngine<'a, E, C> {
    /// Build an engine over the given collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidParameter`] if the configured
    /// correlation window is inverted.
    pub fn new(
        events: &'a E,
        catalog: &'a C,
        config: &'a AnalysisConfig,
    ) -> Result<Self, AnalysisError> {
        Ok(Self {
            events,
            catalog,
            config,
            correlation: CorrelationWindow::from_config(config)?,
        })
    }

    /// The event store.
    pub const fn events(&self) -> &'a E {
        self.events
    }

    /// The food catalog.
    pub const fn catalog(&self) -> &'a C {
        self.catalog
    }

    /// The analysis configuration.
    pub const fn config(&self) -> &'a AnalysisConfig {
        self.config
    }

    /// The correlation window built from the configuration.
    pub const fn correlation(&self) -> &CorrelationWindow {
        &self.correlation
    }

    /// Fetch the user's meals and symptoms for `window` in one pass.
    ///
    /// # Errors
    ///
    /// Passes through any [`EventStore`] error.
    pub async fn snapshot(
        &self,
        user_id: UserId,
        window: AnalysisWindow,
    ) -> Result<EventSnapshot, AnalysisError> {
        let meals = self
            .events
            .get_meals(user_id, window.start, window.end)
            .await?;
        let range = symptom_range(window, &self.correlation, self.config.extend_symptom_horizon);
        let symptoms = self
            .events
            .get_symptoms(user_id, range.start, range.end)
            .await?;
        trace!(
            %user_id,
            meals = meals.len(),
            symptoms = symptoms.len(),
            "Fetched event snapshot"
        );
        Ok(EventSnapshot { meals, symptoms })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::memory::InMemorySource;

    #[test]
    fn inverted_config_is_rejected() {
        let source = InMemorySource::new();
        let config = AnalysisConfig {
            min_delay_hours: 10,
            max_delay_hours: 1,
            ..AnalysisConfig::default()
        };
        assert!(AllergyEngine::new(&source, &source, &config).is_err());
    }

    #[test]
    fn default_config_uses_default_window() {
        let source = InMemorySource::new();
        let config = AnalysisConfig::default();
        let engine = AllergyEngine::new(&source, &source, &config).unwrap();
        assert_eq!(*engine.correlation(), CorrelationWindow::default());
    }
}
