//! Server binary for the allergen correlation service.
//!
//! Wires configuration, logging, the `PostgreSQL` source and the HTTP API
//! together, then serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `allergen-config.yaml` (or `ALLERGEN_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Connect to `PostgreSQL`
//! 4. Build the shared application state
//! 5. Serve the HTTP API
//! 6. Close the pool on shutdown

mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use allergen_api::{AppState, ServerConfig};
use allergen_core::{LoggingConfig, ServiceConfig};
use allergen_db::{PgSource, PostgresConfig, PostgresPool};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::StartupError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "allergen-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any startup step or the server itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run().await?;
    Ok(())
}

async fn run() -> Result<(), StartupError> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!("allergen-server starting");
    info!(
        default_days_back = config.analysis.default_days_back,
        default_threshold = config.analysis.default_threshold,
        min_delay_hours = config.analysis.min_delay_hours,
        max_delay_hours = config.analysis.max_delay_hours,
        extend_symptom_horizon = config.analysis.extend_symptom_horizon,
        "Configuration loaded"
    );

    // 3. Connect to PostgreSQL.
    let pg_config = PostgresConfig::new(&config.infrastructure.postgres_url)
        .with_max_connections(config.infrastructure.max_connections);
    let pool = PostgresPool::connect(&pg_config).await?;

    // 4. Build application state.
    let state = Arc::new(AppState::new(PgSource::new(&pool), config.analysis.clone()));

    // 5. Serve.
    let server_config = ServerConfig::from(&config.infrastructure);
    let served = allergen_api::start_server(&server_config, state).await;

    // 6. Shut down.
    pool.close().await;
    served?;
    info!("allergen-server stopped");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(config: &LoggingConfig) -> Result<(), StartupError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| StartupError::Logging {
        message: e.to_string(),
    })
}

/// Load the service configuration.
///
/// Reads the file named by `ALLERGEN_CONFIG`, or `allergen-config.yaml` in
/// the working directory. A missing file yields the defaults (with
/// environment overrides still applied).
fn load_config() -> Result<ServiceConfig, StartupError> {
    let path = std::env::var_os("ALLERGEN_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    Ok(read_config(&path)?)
}

fn read_config(path: &Path) -> Result<ServiceConfig, allergen_core::ConfigError> {
    if path.exists() {
        ServiceConfig::from_file(path)
    } else {
        ServiceConfig::parse("")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let config = read_config(Path::new("does-not-exist.yaml")).unwrap();
        assert_eq!(config.analysis, allergen_core::AnalysisConfig::default());
        assert_eq!(config.logging, LoggingConfig::default());
    }
}
