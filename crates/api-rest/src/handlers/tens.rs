//! TENS namespace: medication administrations.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use api_shared::records::{AdministracionRes, CreateAdministracionReq, ListAdministracionesRes};
use maternidad_core::records::{AdministracionMedicamento, MedicacionService, NewAdministracion};

use super::{parse_record_id, parse_timestamp, require_session, store_error, HandlerError};
use crate::AppState;

fn administracion_res(administracion: AdministracionMedicamento) -> AdministracionRes {
    AdministracionRes {
        id: administracion.id.to_string(),
        ingreso_id: administracion.ingreso_id.to_string(),
        medicamento: administracion.medicamento,
        dosis: administracion.dosis,
        fecha_hora_administracion: administracion.fecha_hora_administracion.to_rfc3339(),
        administrado_por: administracion.administrado_por,
        created_at: administracion.created_at.to_rfc3339(),
    }
}

#[utoipa::path(
    get,
    path = "/tens/administraciones",
    responses(
        (status = 200, description = "All recorded administrations", body = ListAdministracionesRes),
        (status = 403, description = "Caller lacks the TENS group")
    )
)]
#[axum::debug_handler]
pub async fn list_administraciones(
    State(state): State<AppState>,
) -> Json<ListAdministracionesRes> {
    let administraciones = MedicacionService::new(&state.cfg)
        .list()
        .into_iter()
        .map(administracion_res)
        .collect();
    Json(ListAdministracionesRes { administraciones })
}

#[utoipa::path(
    post,
    path = "/tens/administraciones",
    request_body = CreateAdministracionReq,
    responses(
        (status = 201, description = "Administration recorded", body = AdministracionRes),
        (status = 400, description = "Validation failure or unknown ingreso"),
        (status = 401, description = "Authentication required")
    )
)]
/// Records an administration. `administrado_por` is always the authenticated
/// session's username; the request body cannot claim someone else recorded it.
#[axum::debug_handler]
pub async fn create_administracion(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateAdministracionReq>,
) -> Result<(StatusCode, Json<AdministracionRes>), HandlerError> {
    let session = require_session(&state, &headers)?;
    let ingreso_id = parse_record_id(&req.ingreso_id)?;
    let fecha_hora_administracion =
        parse_timestamp("fecha_hora_administracion", &req.fecha_hora_administracion)?;

    let administracion = MedicacionService::new(&state.cfg)
        .create(NewAdministracion {
            ingreso_id,
            medicamento: req.medicamento,
            dosis: req.dosis,
            fecha_hora_administracion,
            administrado_por: session.principal.username,
        })
        .map_err(|err| store_error("create administracion", err))?;
    Ok((
        StatusCode::CREATED,
        Json(administracion_res(administracion)),
    ))
}

#[utoipa::path(
    get,
    path = "/tens/administraciones/{id}",
    responses(
        (status = 200, description = "Administration found", body = AdministracionRes),
        (status = 404, description = "No such administración")
    )
)]
#[axum::debug_handler]
pub async fn get_administracion(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AdministracionRes>, HandlerError> {
    let id = parse_record_id(&id)?;
    let administracion = MedicacionService::new(&state.cfg)
        .get(&id)
        .map_err(|err| store_error("get administracion", err))?;
    Ok(Json(administracion_res(administracion)))
}
