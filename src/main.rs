use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{build_router, AppState};
use maternidad_core::config::{self, CoreConfig};
use maternidad_core::constants::REMEMBER_SESSION_SECONDS;
use maternidad_core::identity::UserDirectory;
use maternidad_core::provisioning::{ensure_default_admin, setup_roles};

/// Main entry point for the maternidad service
///
/// Provisions the role groups and the default administrator, then starts the
/// REST server (default port 3000) with the Swagger UI mounted at /swagger-ui.
///
/// # Environment Variables
/// - `MATERNIDAD_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `MATERNIDAD_DATA_DIR`: Directory for record storage (default: "maternidad_data")
/// - `MATERNIDAD_GATE_POLICY`: Gatekeeper failure policy, "open" or "closed"
/// - `MATERNIDAD_UNMAPPED_POLICY`: Unmapped-namespace policy, "open" or "require-login"
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If provisioning, startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("maternidad=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("MATERNIDAD_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let data_dir = config::data_dir_from_env_value(std::env::var("MATERNIDAD_DATA_DIR").ok());
    let gate_failure_policy = config::gate_failure_policy_from_env_value(
        std::env::var("MATERNIDAD_GATE_POLICY").ok(),
    )?;
    let unmapped_namespace_policy = config::unmapped_namespace_policy_from_env_value(
        std::env::var("MATERNIDAD_UNMAPPED_POLICY").ok(),
    )?;
    let cfg = Arc::new(CoreConfig::new(
        data_dir,
        chrono::Duration::seconds(REMEMBER_SESSION_SECONDS),
        gate_failure_policy,
        unmapped_namespace_policy,
    )?);

    tracing::info!("++ Starting maternidad on {}", rest_addr);
    tracing::info!("++ Data directory: {}", cfg.data_dir().display());

    setup_roles(&cfg)?;
    let users = Arc::new(UserDirectory::open(&cfg)?);
    ensure_default_admin(&users)?;

    let app = build_router(AppState::new(cfg, users));

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
