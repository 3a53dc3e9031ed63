//! [`EventStore`] and [`FoodCatalog`] over `PostgreSQL`.
//!
//! Expected tables:
//!
//! ```text
//! users    (id UUID PRIMARY KEY, ...)
//! foods    (id UUID PRIMARY KEY, name TEXT, category TEXT, ingredients TEXT)
//! meals    (user_id UUID, food_id UUID, occurred_at TIMESTAMPTZ,
//!           quantity DOUBLE PRECISION, notes TEXT NULL)
//! symptoms (user_id UUID, symptom_type TEXT, severity SMALLINT,
//!           occurred_at TIMESTAMPTZ, description TEXT NULL)
//! ```
//!
//! Food IDs are UUID v7, so `ORDER BY id` enumerates the catalog in insertion
//! order.

use allergen_core::{EventStore, FoodCatalog, SourceError};
use allergen_types::{Food, FoodId, MealEvent, SymptomEvent, UserId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::DbError;
use crate::postgres::PostgresPool;
use crate::rows::{FoodRow, MealRow, SymptomRow};

/// Relational implementation of the engine's collaborator traits.
#[derive(Debug, Clone)]
pub struct PgSource {
    pool: PgPool,
}

impl PgSource {
    /// Create a source sharing the given connection pool.
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            pool: pool.pool().clone(),
        }
    }

    /// Fail with [`SourceError::NotFound`] unless `user_id` exists.
    async fn ensure_user(&self, user_id: UserId) -> Result<(), SourceError> {
        let exists: bool = sqlx::query_scalar(r"SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;
        if exists {
            Ok(())
        } else {
            Err(SourceError::unknown_user(user_id))
        }
    }
}

impl EventStore for PgSource {
    async fn get_meals(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MealEvent>, SourceError> {
        self.ensure_user(user_id).await?;
        let rows = sqlx::query_as::<_, MealRow>(
            r"SELECT user_id, food_id, occurred_at, quantity, notes
              FROM meals
              WHERE user_id = $1 AND occurred_at BETWEEN $2 AND $3
              ORDER BY occurred_at DESC",
        )
        .bind(user_id.into_inner())
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        tracing::debug!(%user_id, count = rows.len(), "Loaded meals");
        Ok(rows.into_iter().map(MealEvent::from).collect())
    }

    async fn get_symptoms(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SymptomEvent>, SourceError> {
        self.ensure_user(user_id).await?;
        let rows = sqlx::query_as::<_, SymptomRow>(
            r"SELECT user_id, symptom_type, severity, occurred_at, description
              FROM symptoms
              WHERE user_id = $1 AND occurred_at BETWEEN $2 AND $3
              ORDER BY occurred_at DESC",
        )
        .bind(user_id.into_inner())
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        tracing::debug!(%user_id, count = rows.len(), "Loaded symptoms");
        let symptoms = rows
            .into_iter()
            .map(SymptomEvent::try_from)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(symptoms)
    }
}

impl FoodCatalog for PgSource {
    async fn get_all_foods(&self) -> Result<Vec<Food>, SourceError> {
        let rows = sqlx::query_as::<_, FoodRow>(
            r"SELECT id, name, category, ingredients FROM foods ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(rows.into_iter().map(Food::from).collect())
    }

    async fn get_food(&self, food_id: FoodId) -> Result<Option<Food>, SourceError> {
        let row = sqlx::query_as::<_, FoodRow>(
            r"SELECT id, name, category, ingredients FROM foods WHERE id = $1",
        )
        .bind(food_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(row.map(Food::from))
    }
}
