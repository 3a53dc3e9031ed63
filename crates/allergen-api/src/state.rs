//! Shared application state for the API server.
//!
//! [`AppState`] owns the data source (anything implementing both collaborator
//! traits), the analysis configuration, and the clock. Each request builds a
//! short-lived [`AllergyEngine`] borrowing from it.

use std::sync::Arc;

use allergen_core::{
    AllergyEngine, AnalysisConfig, AnalysisError, Clock, EventStore, FoodCatalog, SystemClock,
};
use chrono::{DateTime, Utc};

/// State shared by all request handlers.
pub struct AppState<S> {
    /// Event store and food catalog.
    pub source: S,
    /// Analysis parameters.
    pub config: AnalysisConfig,
    /// Source of "now" for every request.
    pub clock: Arc<dyn Clock>,
}

impl<S: EventStore + FoodCatalog> AppState<S> {
    /// Create state over `source` using the system clock.
    pub fn new(source: S, config: AnalysisConfig) -> Self {
        Self {
            source,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The current instant according to the configured clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// An engine borrowing this state's source and configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidParameter`] if the configured
    /// correlation window is inverted.
    pub fn engine(&self) -> Result<AllergyEngine<'_, S, S>, AnalysisError> {
        AllergyEngine::new(&self.source, &self.source, &self.config)
    }
}
