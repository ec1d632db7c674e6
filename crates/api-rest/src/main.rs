//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! This binary is useful for development and debugging when you only want the REST server (with
//! OpenAPI/Swagger UI) against an existing data directory. The workspace's main `maternidad-run`
//! binary also provisions the role groups and the default administrator before serving.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{build_router, AppState};
use maternidad_core::config::{self, CoreConfig};
use maternidad_core::identity::UserDirectory;

/// Main entry point for the maternidad REST API server
///
/// Starts the REST API server on the configured address (default: 0.0.0.0:3000).
/// Provides HTTP endpoints for the clinical records service with OpenAPI/Swagger documentation.
///
/// # Environment Variables
/// - `MATERNIDAD_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `MATERNIDAD_DATA_DIR`: Data directory (default: "maternidad_data")
/// - `MATERNIDAD_GATE_POLICY`: Gatekeeper failure policy, "open" or "closed"
/// - `MATERNIDAD_UNMAPPED_POLICY`: Unmapped-namespace policy, "open" or "require-login"
///
/// # Returns
/// * `Ok(())` - If server starts and runs successfully
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration environment values cannot be parsed,
/// - the user directory cannot be opened,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("MATERNIDAD_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting maternidad REST API on {}", addr);

    let data_dir = config::data_dir_from_env_value(std::env::var("MATERNIDAD_DATA_DIR").ok());
    let gate_failure_policy = config::gate_failure_policy_from_env_value(
        std::env::var("MATERNIDAD_GATE_POLICY").ok(),
    )?;
    let unmapped_namespace_policy = config::unmapped_namespace_policy_from_env_value(
        std::env::var("MATERNIDAD_UNMAPPED_POLICY").ok(),
    )?;
    let cfg = Arc::new(CoreConfig::new(
        data_dir,
        chrono::Duration::seconds(maternidad_core::constants::REMEMBER_SESSION_SECONDS),
        gate_failure_policy,
        unmapped_namespace_policy,
    )?);

    tracing::info!("-- Data directory: {}", cfg.data_dir().display());

    let users = Arc::new(UserDirectory::open(&cfg)?);
    let app = build_router(AppState::new(cfg, users));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
