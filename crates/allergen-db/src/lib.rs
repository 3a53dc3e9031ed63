//! `PostgreSQL` data layer for the allergen correlation service.
//!
//! The engine reads users, foods, meals and symptoms through the
//! [`EventStore`](allergen_core::EventStore) and
//! [`FoodCatalog`](allergen_core::FoodCatalog) traits. This crate provides
//! the relational implementation of both. It only reads; rows are written by
//! whatever owns the schema.
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`pg_source`] -- [`PgSource`], the trait implementation
//! - [`rows`] -- Row types and their conversion to domain types
//! - [`error`] -- Shared error types

pub mod error;
pub mod pg_source;
pub mod postgres;
pub mod rows;

// Re-export primary types for convenience.
pub use error::DbError;
pub use pg_source::PgSource;
pub use postgres::{PostgresConfig, PostgresPool};
pub use rows::{FoodRow, MealRow, SymptomRow};
