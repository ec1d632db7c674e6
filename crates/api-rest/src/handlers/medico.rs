//! Médico namespace: the pathology catalogue.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use api_shared::records::{
    CreatePatologiaReq, ListPatologiasRes, PatologiaRes, UpdatePatologiaNivelReq,
};
use maternidad_core::records::{NewPatologia, NivelRiesgo, Patologia, PatologiaService};

use super::{parse_record_id, store_error, HandlerError};
use crate::AppState;

fn patologia_res(patologia: Patologia) -> PatologiaRes {
    PatologiaRes {
        id: patologia.id.to_string(),
        nombre: patologia.nombre,
        descripcion: patologia.descripcion,
        nivel_riesgo: patologia.nivel_riesgo.as_str().to_owned(),
        activa: patologia.activa,
        created_at: patologia.created_at.to_rfc3339(),
    }
}

#[utoipa::path(
    get,
    path = "/medico/patologias",
    responses(
        (status = 200, description = "The pathology catalogue", body = ListPatologiasRes),
        (status = 403, description = "Caller lacks the Médico group")
    )
)]
#[axum::debug_handler]
pub async fn list_patologias(State(state): State<AppState>) -> Json<ListPatologiasRes> {
    let patologias = PatologiaService::new(&state.cfg)
        .list()
        .into_iter()
        .map(patologia_res)
        .collect();
    Json(ListPatologiasRes { patologias })
}

#[utoipa::path(
    post,
    path = "/medico/patologias",
    request_body = CreatePatologiaReq,
    responses(
        (status = 201, description = "Patología created", body = PatologiaRes),
        (status = 400, description = "Validation failure")
    )
)]
#[axum::debug_handler]
pub async fn create_patologia(
    State(state): State<AppState>,
    Json(req): Json<CreatePatologiaReq>,
) -> Result<(StatusCode, Json<PatologiaRes>), HandlerError> {
    let nivel_riesgo: NivelRiesgo = req
        .nivel_riesgo
        .parse()
        .map_err(|err| store_error("create patologia", err))?;
    let patologia = PatologiaService::new(&state.cfg)
        .create(NewPatologia {
            nombre: req.nombre,
            descripcion: req.descripcion,
            nivel_riesgo,
        })
        .map_err(|err| store_error("create patologia", err))?;
    Ok((StatusCode::CREATED, Json(patologia_res(patologia))))
}

#[utoipa::path(
    get,
    path = "/medico/patologias/{id}",
    responses(
        (status = 200, description = "Patología found", body = PatologiaRes),
        (status = 404, description = "No such patología")
    )
)]
#[axum::debug_handler]
pub async fn get_patologia(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PatologiaRes>, HandlerError> {
    let id = parse_record_id(&id)?;
    let patologia = PatologiaService::new(&state.cfg)
        .get(&id)
        .map_err(|err| store_error("get patologia", err))?;
    Ok(Json(patologia_res(patologia)))
}

#[utoipa::path(
    put,
    path = "/medico/patologias/{id}/nivel",
    request_body = UpdatePatologiaNivelReq,
    responses(
        (status = 200, description = "Risk level updated", body = PatologiaRes),
        (status = 400, description = "Unknown risk level"),
        (status = 404, description = "No such patología")
    )
)]
#[axum::debug_handler]
pub async fn update_patologia_nivel(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePatologiaNivelReq>,
) -> Result<Json<PatologiaRes>, HandlerError> {
    let id = parse_record_id(&id)?;
    let nivel: NivelRiesgo = req
        .nivel_riesgo
        .parse()
        .map_err(|err| store_error("update patologia nivel", err))?;
    let patologia = PatologiaService::new(&state.cfg)
        .update_nivel(&id, nivel)
        .map_err(|err| store_error("update patologia nivel", err))?;
    Ok(Json(patologia_res(patologia)))
}
