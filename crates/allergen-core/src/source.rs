//! Collaborator traits for the event store and the food catalog.
//!
//! The engine never owns data. It reads meal and symptom snapshots from an
//! [`EventStore`] and reference data from a [`FoodCatalog`]; both are injected
//! by the caller. Implementations live outside this module: the in-memory
//! [`InMemorySource`](crate::memory::InMemorySource) for tests and local runs,
//! and the `PostgreSQL` adapter in `allergen-db`.
//!
//! The returned futures must be `Send` so the engine can run inside
//! multi-threaded HTTP handlers.

use std::future::Future;

use allergen_types::{Food, FoodId, MealEvent, SymptomEvent, UserId};
use chrono::{DateTime, Utc};

/// Errors a collaborator can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The requested user or food does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity (`"user"`, `"food"`).
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// The backing store failed or is unreachable.
    #[error("source unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
}

impl SourceError {
    /// A [`SourceError::NotFound`] for a user.
    pub fn unknown_user(user_id: UserId) -> Self {
        Self::NotFound {
            entity: "user",
            id: user_id.to_string(),
        }
    }
}

/// Read access to a user's meal and symptom log.
///
/// Both range queries are inclusive on `start` and `end`. An unknown user is
/// reported as [`SourceError::NotFound`], never as an empty log.
pub trait EventStore: Send + Sync {
    /// All meals of `user_id` eaten within `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the user is unknown or the store fails.
    fn get_meals(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<MealEvent>, SourceError>> + Send;

    /// All symptoms of `user_id` that occurred within `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the user is unknown or the store fails.
    fn get_symptoms(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<SymptomEvent>, SourceError>> + Send;
}

/// Read access to the set of known foods.
pub trait FoodCatalog: Send + Sync {
    /// Every food in the catalog, in the catalog's stable enumeration order.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Unavailable`] if the catalog fails.
    fn get_all_foods(&self) -> impl Future<Output = Result<Vec<Food>, SourceError>> + Send;

    /// A single food, or `None` if the ID is not in the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Unavailable`] if the catalog fails.
    fn get_food(
        &self,
        food_id: FoodId,
    ) -> impl Future<Output = Result<Option<Food>, SourceError>> + Send;
}
