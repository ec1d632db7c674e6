//! Matrona namespace: clinical files (pacientes) and admissions (ingresos).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use api_shared::records::{
    CreateIngresoReq, CreatePacienteReq, IngresoRes, ListIngresosRes, ListPacientesRes,
    PacienteRes,
};
use maternidad_core::records::{
    Ingreso, IngresoService, NewIngreso, NewPaciente, Paciente, PacienteService,
};

use super::{parse_record_id, parse_timestamp, store_error, HandlerError};
use crate::AppState;

fn paciente_res(paciente: Paciente) -> PacienteRes {
    PacienteRes {
        id: paciente.id.to_string(),
        persona_id: paciente.persona_id.to_string(),
        grupo_sanguineo: paciente.grupo_sanguineo,
        alergias: paciente.alergias,
        activo: paciente.activo,
        created_at: paciente.created_at.to_rfc3339(),
    }
}

fn ingreso_res(ingreso: Ingreso) -> IngresoRes {
    IngresoRes {
        id: ingreso.id.to_string(),
        paciente_id: ingreso.paciente_id.to_string(),
        fecha_ingreso: ingreso.fecha_ingreso.to_rfc3339(),
        motivo: ingreso.motivo,
        semanas_gestacion: ingreso.semanas_gestacion,
        paridad: ingreso.paridad,
        activa: ingreso.activa,
        created_at: ingreso.created_at.to_rfc3339(),
    }
}

#[utoipa::path(
    get,
    path = "/matrona/pacientes",
    responses(
        (status = 200, description = "All clinical files", body = ListPacientesRes),
        (status = 403, description = "Caller lacks the Matrona group")
    )
)]
#[axum::debug_handler]
pub async fn list_pacientes(State(state): State<AppState>) -> Json<ListPacientesRes> {
    let pacientes = PacienteService::new(&state.cfg)
        .list()
        .into_iter()
        .map(paciente_res)
        .collect();
    Json(ListPacientesRes { pacientes })
}

#[utoipa::path(
    post,
    path = "/matrona/pacientes",
    request_body = CreatePacienteReq,
    responses(
        (status = 201, description = "Clinical file opened", body = PacienteRes),
        (status = 400, description = "Validation failure or unknown persona")
    )
)]
/// Opens a clinical file for an existing persona.
#[axum::debug_handler]
pub async fn create_paciente(
    State(state): State<AppState>,
    Json(req): Json<CreatePacienteReq>,
) -> Result<(StatusCode, Json<PacienteRes>), HandlerError> {
    let persona_id = parse_record_id(&req.persona_id)?;
    let paciente = PacienteService::new(&state.cfg)
        .create(NewPaciente {
            persona_id,
            grupo_sanguineo: req.grupo_sanguineo,
            alergias: req.alergias,
        })
        .map_err(|err| store_error("create paciente", err))?;
    Ok((StatusCode::CREATED, Json(paciente_res(paciente))))
}

#[utoipa::path(
    get,
    path = "/matrona/pacientes/{id}",
    responses(
        (status = 200, description = "Clinical file found", body = PacienteRes),
        (status = 404, description = "No such paciente")
    )
)]
#[axum::debug_handler]
pub async fn get_paciente(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PacienteRes>, HandlerError> {
    let id = parse_record_id(&id)?;
    let paciente = PacienteService::new(&state.cfg)
        .get(&id)
        .map_err(|err| store_error("get paciente", err))?;
    Ok(Json(paciente_res(paciente)))
}

#[utoipa::path(
    post,
    path = "/matrona/pacientes/{id}/deactivate",
    responses(
        (status = 200, description = "Clinical file deactivated", body = PacienteRes),
        (status = 404, description = "No such paciente")
    )
)]
#[axum::debug_handler]
pub async fn deactivate_paciente(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PacienteRes>, HandlerError> {
    let id = parse_record_id(&id)?;
    let paciente = PacienteService::new(&state.cfg)
        .deactivate(&id)
        .map_err(|err| store_error("deactivate paciente", err))?;
    Ok(Json(paciente_res(paciente)))
}

#[utoipa::path(
    get,
    path = "/matrona/ingresos",
    responses(
        (status = 200, description = "All admissions", body = ListIngresosRes),
        (status = 403, description = "Caller lacks the Matrona group")
    )
)]
#[axum::debug_handler]
pub async fn list_ingresos(State(state): State<AppState>) -> Json<ListIngresosRes> {
    let ingresos = IngresoService::new(&state.cfg)
        .list()
        .into_iter()
        .map(ingreso_res)
        .collect();
    Json(ListIngresosRes { ingresos })
}

#[utoipa::path(
    post,
    path = "/matrona/ingresos",
    request_body = CreateIngresoReq,
    responses(
        (status = 201, description = "Admission recorded", body = IngresoRes),
        (status = 400, description = "Validation failure or unknown paciente")
    )
)]
#[axum::debug_handler]
pub async fn create_ingreso(
    State(state): State<AppState>,
    Json(req): Json<CreateIngresoReq>,
) -> Result<(StatusCode, Json<IngresoRes>), HandlerError> {
    let paciente_id = parse_record_id(&req.paciente_id)?;
    let fecha_ingreso = parse_timestamp("fecha_ingreso", &req.fecha_ingreso)?;
    let ingreso = IngresoService::new(&state.cfg)
        .create(NewIngreso {
            paciente_id,
            fecha_ingreso,
            motivo: req.motivo,
            semanas_gestacion: req.semanas_gestacion,
            paridad: req.paridad,
        })
        .map_err(|err| store_error("create ingreso", err))?;
    Ok((StatusCode::CREATED, Json(ingreso_res(ingreso))))
}

#[utoipa::path(
    get,
    path = "/matrona/ingresos/{id}",
    responses(
        (status = 200, description = "Admission found", body = IngresoRes),
        (status = 404, description = "No such ingreso")
    )
)]
#[axum::debug_handler]
pub async fn get_ingreso(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<IngresoRes>, HandlerError> {
    let id = parse_record_id(&id)?;
    let ingreso = IngresoService::new(&state.cfg)
        .get(&id)
        .map_err(|err| store_error("get ingreso", err))?;
    Ok(Json(ingreso_res(ingreso)))
}

#[utoipa::path(
    post,
    path = "/matrona/ingresos/{id}/close",
    responses(
        (status = 200, description = "Admission closed", body = IngresoRes),
        (status = 404, description = "No such ingreso")
    )
)]
#[axum::debug_handler]
pub async fn close_ingreso(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<IngresoRes>, HandlerError> {
    let id = parse_record_id(&id)?;
    let ingreso = IngresoService::new(&state.cfg)
        .close(&id)
        .map_err(|err| store_error("close ingreso", err))?;
    Ok(Json(ingreso_res(ingreso)))
}
