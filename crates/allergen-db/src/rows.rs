//! Row types read from the relational store and their conversion to domain
//! types.

use allergen_types::{Food, FoodId, MealEvent, SymptomEvent, UserId};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbError;

/// A row from the `foods` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FoodRow {
    /// Food ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Category label.
    pub category: String,
    /// Free-text ingredient list.
    pub ingredients: String,
}

impl From<FoodRow> for Food {
    fn from(row: FoodRow) -> Self {
        Self {
            id: FoodId::from(row.id),
            name: row.name,
            category: row.category,
            ingredients: row.ingredients,
        }
    }
}

/// A row from the `meals` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MealRow {
    /// Owning user.
    pub user_id: Uuid,
    /// Food eaten.
    pub food_id: Uuid,
    /// When the meal was eaten.
    pub occurred_at: DateTime<Utc>,
    /// Portion size.
    pub quantity: f64,
    /// Free-text notes.
    pub notes: Option<String>,
}

impl From<MealRow> for MealEvent {
    fn from(row: MealRow) -> Self {
        Self {
            user_id: UserId::from(row.user_id),
            food_id: FoodId::from(row.food_id),
            occurred_at: row.occurred_at,
            quantity: row.quantity,
            notes: row.notes,
        }
    }
}

/// A row from the `symptoms` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SymptomRow {
    /// Owning user.
    pub user_id: Uuid,
    /// Symptom label.
    pub symptom_type: String,
    /// Severity, stored as `SMALLINT`.
    pub severity: i16,
    /// When the symptom occurred.
    pub occurred_at: DateTime<Utc>,
    /// Free-text description.
    pub description: Option<String>,
}

impl TryFrom<SymptomRow> for SymptomEvent {
    type Error = DbError;

    fn try_from(row: SymptomRow) -> Result<Self, Self::Error> {
        let severity = u8::try_from(row.severity).map_err(|e| DbError::InvalidRow {
            table: "symptoms",
            reason: format!("severity {}: {e}", row.severity),
        })?;
        Ok(Self {
            user_id: UserId::from(row.user_id),
            symptom_type: row.symptom_type,
            severity,
            occurred_at: row.occurred_at,
            description: row.description,
        })
    }
}
