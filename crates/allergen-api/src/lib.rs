//! HTTP API for the allergen correlation service.
//!
//! This crate exposes the analysis engine over REST. Handlers are generic over
//! the data source, so the same router serves the `PostgreSQL` adapter in
//! production and the in-memory source in tests.
//!
//! Errors are returned as JSON `{"error", "status"}` bodies: unknown users or
//! foods map to `404`, malformed IDs and out-of-range parameters to `400`, and
//! an unreachable store to `503`.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
