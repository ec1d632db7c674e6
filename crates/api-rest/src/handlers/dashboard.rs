//! Per-role dashboards.
//!
//! Dashboard routes carry no URL namespace, so the gatekeeper passes them
//! through; each handler enforces its own group requirement with the same
//! [`authorize`] capability the middleware uses.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;

use api_shared::dashboard::{
    AdminDashboardRes, MatronaDashboardRes, MedicoDashboardRes, TensDashboardRes,
};
use maternidad_core::gatekeeper::authorize;
use maternidad_core::records::{
    IngresoService, MedicacionService, PacienteService, PatologiaService, PersonaService,
};
use maternidad_core::roles::Group;

use super::{forbidden, require_session, HandlerError};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/dashboard/admin",
    responses(
        (status = 200, description = "Administrator counters", body = AdminDashboardRes),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Caller is not an administrator")
    )
)]
#[axum::debug_handler]
pub async fn admin(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AdminDashboardRes>, HandlerError> {
    let session = require_session(&state, &headers)?;
    if !authorize(&session.principal, Group::Administrador) {
        return Err(forbidden());
    }
    Ok(Json(AdminDashboardRes {
        total_usuarios: state.users.list().len(),
        total_personas: PersonaService::new(&state.cfg).list().len(),
        total_pacientes: PacienteService::new(&state.cfg).list().len(),
    }))
}

#[utoipa::path(
    get,
    path = "/dashboard/medico",
    responses(
        (status = 200, description = "Médico counters", body = MedicoDashboardRes),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Caller is not a médico")
    )
)]
#[axum::debug_handler]
pub async fn medico(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MedicoDashboardRes>, HandlerError> {
    let session = require_session(&state, &headers)?;
    if !authorize(&session.principal, Group::Medico) {
        return Err(forbidden());
    }
    let patologias = PatologiaService::new(&state.cfg);
    Ok(Json(MedicoDashboardRes {
        total_patologias: patologias.list().len(),
        patologias_alto_riesgo: patologias.count_high_risk(),
    }))
}

#[utoipa::path(
    get,
    path = "/dashboard/matrona",
    responses(
        (status = 200, description = "Matrona counters", body = MatronaDashboardRes),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Caller is not a matrona")
    )
)]
#[axum::debug_handler]
pub async fn matrona(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MatronaDashboardRes>, HandlerError> {
    let session = require_session(&state, &headers)?;
    if !authorize(&session.principal, Group::Matrona) {
        return Err(forbidden());
    }
    Ok(Json(MatronaDashboardRes {
        fichas_activas: PacienteService::new(&state.cfg).count_active(),
        ingresos_hoy: IngresoService::new(&state.cfg).count_on(Utc::now().date_naive()),
    }))
}

#[utoipa::path(
    get,
    path = "/dashboard/tens",
    responses(
        (status = 200, description = "TENS counters", body = TensDashboardRes),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Caller is not a TENS")
    )
)]
#[axum::debug_handler]
pub async fn tens(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TensDashboardRes>, HandlerError> {
    let session = require_session(&state, &headers)?;
    if !authorize(&session.principal, Group::Tens) {
        return Err(forbidden());
    }
    Ok(Json(TensDashboardRes {
        administraciones_hoy: MedicacionService::new(&state.cfg)
            .count_on(Utc::now().date_naive()),
    }))
}
