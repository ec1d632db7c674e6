//! # API REST
//!
//! REST API implementation for the maternidad records service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Session cookies and the access-control middleware stack
//! - OpenAPI/Swagger documentation
//!
//! Uses `api-shared` for wire types; every access decision is delegated to
//! `maternidad-core`.

#![warn(rust_2018_idioms)]

pub mod cookies;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use maternidad_core::config::CoreConfig;
use maternidad_core::gatekeeper::RouteTable;
use maternidad_core::identity::UserDirectory;
use maternidad_core::session::SessionManager;

/// Shared state for every handler and middleware layer.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<CoreConfig>,
    pub users: Arc<UserDirectory>,
    pub sessions: Arc<SessionManager>,
    pub routes: Arc<RouteTable>,
}

impl AppState {
    /// Builds the session store and route table from the resolved config.
    pub fn new(cfg: Arc<CoreConfig>, users: Arc<UserDirectory>) -> Self {
        let routes = RouteTable::builtin(
            cfg.unmapped_namespace_policy(),
            cfg.gate_failure_policy(),
        );
        Self {
            cfg,
            users,
            sessions: Arc::new(SessionManager::new()),
            routes: Arc::new(routes),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::health,
        handlers::auth::home,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::verify::verify_status,
        handlers::verify::verify_submit,
        handlers::dashboard::admin,
        handlers::dashboard::medico,
        handlers::dashboard::matrona,
        handlers::dashboard::tens,
        handlers::gestion::list_personas,
        handlers::gestion::create_persona,
        handlers::gestion::get_persona,
        handlers::gestion::update_persona,
        handlers::gestion::deactivate_persona,
        handlers::gestion::list_usuarios,
        handlers::gestion::get_usuario,
        handlers::gestion::deactivate_usuario,
        handlers::medico::list_patologias,
        handlers::medico::create_patologia,
        handlers::medico::get_patologia,
        handlers::medico::update_patologia_nivel,
        handlers::matrona::list_pacientes,
        handlers::matrona::create_paciente,
        handlers::matrona::get_paciente,
        handlers::matrona::deactivate_paciente,
        handlers::matrona::list_ingresos,
        handlers::matrona::create_ingreso,
        handlers::matrona::get_ingreso,
        handlers::matrona::close_ingreso,
        handlers::tens::list_administraciones,
        handlers::tens::create_administracion,
        handlers::tens::get_administracion,
    ),
    components(schemas(
        api_shared::health::HealthRes,
        api_shared::auth::LoginReq,
        api_shared::auth::LoginRes,
        api_shared::auth::LogoutRes,
        api_shared::auth::HomeRes,
        api_shared::auth::VerifyStatusRes,
        api_shared::auth::VerifyReq,
        api_shared::auth::VerifyRes,
        api_shared::auth::UsuarioRes,
        api_shared::auth::ListUsuariosRes,
        api_shared::auth::ForbiddenRes,
        api_shared::dashboard::AdminDashboardRes,
        api_shared::dashboard::MedicoDashboardRes,
        api_shared::dashboard::MatronaDashboardRes,
        api_shared::dashboard::TensDashboardRes,
        api_shared::records::CreatePersonaReq,
        api_shared::records::UpdatePersonaReq,
        api_shared::records::PersonaRes,
        api_shared::records::ListPersonasRes,
        api_shared::records::CreatePacienteReq,
        api_shared::records::PacienteRes,
        api_shared::records::ListPacientesRes,
        api_shared::records::CreateIngresoReq,
        api_shared::records::IngresoRes,
        api_shared::records::ListIngresosRes,
        api_shared::records::CreateAdministracionReq,
        api_shared::records::AdministracionRes,
        api_shared::records::ListAdministracionesRes,
        api_shared::records::CreatePatologiaReq,
        api_shared::records::UpdatePatologiaNivelReq,
        api_shared::records::PatologiaRes,
        api_shared::records::ListPatologiasRes,
    ))
)]
pub struct ApiDoc;

/// Builds the full application router: routes, Swagger UI, and the
/// gatekeeper/step-up middleware stack.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::auth::home))
        .route("/health", get(handlers::auth::health))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route(
            "/verify",
            get(handlers::verify::verify_status).post(handlers::verify::verify_submit),
        )
        .route("/dashboard/admin", get(handlers::dashboard::admin))
        .route("/dashboard/medico", get(handlers::dashboard::medico))
        .route("/dashboard/matrona", get(handlers::dashboard::matrona))
        .route("/dashboard/tens", get(handlers::dashboard::tens))
        .route(
            "/gestion/personas",
            get(handlers::gestion::list_personas).post(handlers::gestion::create_persona),
        )
        .route(
            "/gestion/personas/:id",
            get(handlers::gestion::get_persona).put(handlers::gestion::update_persona),
        )
        .route(
            "/gestion/personas/:id/deactivate",
            post(handlers::gestion::deactivate_persona),
        )
        .route("/gestion/usuarios", get(handlers::gestion::list_usuarios))
        .route(
            "/gestion/usuarios/:username",
            get(handlers::gestion::get_usuario),
        )
        .route(
            "/gestion/usuarios/:username/deactivate",
            post(handlers::gestion::deactivate_usuario),
        )
        .route(
            "/medico/patologias",
            get(handlers::medico::list_patologias).post(handlers::medico::create_patologia),
        )
        .route("/medico/patologias/:id", get(handlers::medico::get_patologia))
        .route(
            "/medico/patologias/:id/nivel",
            put(handlers::medico::update_patologia_nivel),
        )
        .route(
            "/matrona/pacientes",
            get(handlers::matrona::list_pacientes).post(handlers::matrona::create_paciente),
        )
        .route(
            "/matrona/pacientes/:id",
            get(handlers::matrona::get_paciente),
        )
        .route(
            "/matrona/pacientes/:id/deactivate",
            post(handlers::matrona::deactivate_paciente),
        )
        .route(
            "/matrona/ingresos",
            get(handlers::matrona::list_ingresos).post(handlers::matrona::create_ingreso),
        )
        .route("/matrona/ingresos/:id", get(handlers::matrona::get_ingreso))
        .route(
            "/matrona/ingresos/:id/close",
            post(handlers::matrona::close_ingreso),
        )
        .route(
            "/tens/administraciones",
            get(handlers::tens::list_administraciones)
                .post(handlers::tens::create_administracion),
        )
        .route(
            "/tens/administraciones/:id",
            get(handlers::tens::get_administracion),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::require_second_factor,
        ))
        .layer(from_fn_with_state(state.clone(), middleware::role_gatekeeper))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
