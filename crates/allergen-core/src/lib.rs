//! Temporal correlation engine for the allergen correlation service.
//!
//! Given a user's meal and symptom log, the engine estimates for each food
//! how often eating it was followed by a symptom within a fixed delay
//! window, and ranks foods by that risk.
//!
//! # Modules
//!
//! - [`window`] -- Correlation and analysis windows, the meal/symptom matcher
//! - [`scorer`] -- Per-food risk score
//! - [`detector`] -- Catalog-wide ranking above a threshold
//! - [`lookup`] -- Single-food assessment with a risk level
//! - [`dashboard`] -- Activity statistics and consumption patterns
//! - [`advice`] -- Personalised recommendations
//! - [`export`] -- Read-only export of a user's history and analysis
//! - [`engine`] -- The [`AllergyEngine`] handle tying the operations together
//! - [`source`] -- Collaborator traits for the event store and food catalog
//! - [`memory`] -- In-process implementation of the collaborator traits
//! - [`clock`] -- Injectable sources of "now"
//! - [`config`] -- Service configuration loaded from YAML
//! - [`error`] -- Analysis error type

pub mod advice;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod detector;
pub mod engine;
pub mod error;
pub mod export;
pub mod lookup;
pub mod memory;
pub mod scorer;
pub mod source;
pub mod window;

#[cfg(test)]
mod fixtures;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AnalysisConfig, ConfigError, InfrastructureConfig, LoggingConfig, ServiceConfig};
pub use engine::{AllergyEngine, EventSnapshot};
pub use error::AnalysisError;
pub use lookup::classify;
pub use memory::InMemorySource;
pub use source::{EventStore, FoodCatalog, SourceError};
pub use window::{CorrelationWindow, analysis_window, matches};
