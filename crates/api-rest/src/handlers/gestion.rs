//! Administration namespace: personas and the user directory.
//!
//! Every route under `/gestion` is gated on the Administrador group by the
//! middleware before these handlers run.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use api_shared::auth::{ListUsuariosRes, UsuarioRes};
use api_shared::records::{
    CreatePersonaReq, ListPersonasRes, PersonaRes, UpdatePersonaReq,
};
use maternidad_core::identity::UserRecord;
use maternidad_core::records::{NewPersona, Persona, PersonaService, PersonaUpdate, Sexo};

use super::{parse_date, parse_record_id, store_error, HandlerError};
use crate::AppState;

fn persona_res(persona: Persona) -> PersonaRes {
    let edad = persona.edad();
    PersonaRes {
        id: persona.id.to_string(),
        rut: persona.rut,
        nombre: persona.nombre,
        apellido_paterno: persona.apellido_paterno,
        apellido_materno: persona.apellido_materno,
        fecha_nacimiento: persona.fecha_nacimiento.to_string(),
        sexo: persona.sexo.as_str().to_owned(),
        edad,
        activo: persona.activo,
        created_at: persona.created_at.to_rfc3339(),
    }
}

fn usuario_res(record: UserRecord) -> UsuarioRes {
    UsuarioRes {
        display_role: record.display_role().display_name().to_owned(),
        groups: record
            .groups
            .iter()
            .map(|g| g.display_name().to_owned())
            .collect(),
        username: record.username,
        full_name: record.full_name,
        email: record.email,
        rut: record.rut,
        active: record.active,
        superuser: record.superuser,
    }
}

#[utoipa::path(
    get,
    path = "/gestion/personas",
    responses(
        (status = 200, description = "All personas", body = ListPersonasRes),
        (status = 403, description = "Caller lacks the Administrador group")
    )
)]
#[axum::debug_handler]
pub async fn list_personas(State(state): State<AppState>) -> Json<ListPersonasRes> {
    let personas = PersonaService::new(&state.cfg)
        .list()
        .into_iter()
        .map(persona_res)
        .collect();
    Json(ListPersonasRes { personas })
}

#[utoipa::path(
    post,
    path = "/gestion/personas",
    request_body = CreatePersonaReq,
    responses(
        (status = 201, description = "Persona created", body = PersonaRes),
        (status = 400, description = "Validation failure"),
        (status = 403, description = "Caller lacks the Administrador group")
    )
)]
/// Creates a persona. The RUT is strict-validated and stored canonically.
#[axum::debug_handler]
pub async fn create_persona(
    State(state): State<AppState>,
    Json(req): Json<CreatePersonaReq>,
) -> Result<(StatusCode, Json<PersonaRes>), HandlerError> {
    let fecha_nacimiento = parse_date("fecha_nacimiento", &req.fecha_nacimiento)?;
    let sexo: Sexo = req
        .sexo
        .parse()
        .map_err(|err| store_error("create persona", err))?;

    let persona = PersonaService::new(&state.cfg)
        .create(NewPersona {
            rut: req.rut,
            nombre: req.nombre,
            apellido_paterno: req.apellido_paterno,
            apellido_materno: req.apellido_materno,
            fecha_nacimiento,
            sexo,
        })
        .map_err(|err| store_error("create persona", err))?;
    Ok((StatusCode::CREATED, Json(persona_res(persona))))
}

#[utoipa::path(
    get,
    path = "/gestion/personas/{id}",
    responses(
        (status = 200, description = "Persona found", body = PersonaRes),
        (status = 404, description = "No such persona")
    )
)]
#[axum::debug_handler]
pub async fn get_persona(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PersonaRes>, HandlerError> {
    let id = parse_record_id(&id)?;
    let persona = PersonaService::new(&state.cfg)
        .get(&id)
        .map_err(|err| store_error("get persona", err))?;
    Ok(Json(persona_res(persona)))
}

#[utoipa::path(
    put,
    path = "/gestion/personas/{id}",
    request_body = UpdatePersonaReq,
    responses(
        (status = 200, description = "Persona updated", body = PersonaRes),
        (status = 400, description = "Validation failure"),
        (status = 404, description = "No such persona")
    )
)]
/// Partial update; absent fields keep their stored values. The RUT is not
/// editable.
#[axum::debug_handler]
pub async fn update_persona(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePersonaReq>,
) -> Result<Json<PersonaRes>, HandlerError> {
    let id = parse_record_id(&id)?;
    let fecha_nacimiento = req
        .fecha_nacimiento
        .as_deref()
        .map(|raw| parse_date("fecha_nacimiento", raw))
        .transpose()?;
    let sexo = req
        .sexo
        .as_deref()
        .map(|raw| {
            raw.parse::<Sexo>()
                .map_err(|err| store_error("update persona", err))
        })
        .transpose()?;

    let persona = PersonaService::new(&state.cfg)
        .update(
            &id,
            PersonaUpdate {
                nombre: req.nombre,
                apellido_paterno: req.apellido_paterno,
                apellido_materno: req.apellido_materno,
                fecha_nacimiento,
                sexo,
            },
        )
        .map_err(|err| store_error("update persona", err))?;
    Ok(Json(persona_res(persona)))
}

#[utoipa::path(
    post,
    path = "/gestion/personas/{id}/deactivate",
    responses(
        (status = 200, description = "Persona deactivated", body = PersonaRes),
        (status = 404, description = "No such persona")
    )
)]
/// Soft-deactivation; the record itself is never deleted.
#[axum::debug_handler]
pub async fn deactivate_persona(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PersonaRes>, HandlerError> {
    let id = parse_record_id(&id)?;
    let persona = PersonaService::new(&state.cfg)
        .deactivate(&id)
        .map_err(|err| store_error("deactivate persona", err))?;
    Ok(Json(persona_res(persona)))
}

#[utoipa::path(
    get,
    path = "/gestion/usuarios",
    responses(
        (status = 200, description = "All user accounts", body = ListUsuariosRes),
        (status = 403, description = "Caller lacks the Administrador group")
    )
)]
#[axum::debug_handler]
pub async fn list_usuarios(State(state): State<AppState>) -> Json<ListUsuariosRes> {
    let usuarios = state.users.list().into_iter().map(usuario_res).collect();
    Json(ListUsuariosRes { usuarios })
}

#[utoipa::path(
    get,
    path = "/gestion/usuarios/{username}",
    responses(
        (status = 200, description = "User account found", body = UsuarioRes),
        (status = 404, description = "No such user")
    )
)]
#[axum::debug_handler]
pub async fn get_usuario(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UsuarioRes>, HandlerError> {
    match state.users.find(&username) {
        Some(record) => Ok(Json(usuario_res(record))),
        None => Err((StatusCode::NOT_FOUND, "user not found".to_owned())),
    }
}

#[utoipa::path(
    post,
    path = "/gestion/usuarios/{username}/deactivate",
    responses(
        (status = 200, description = "User deactivated", body = UsuarioRes),
        (status = 404, description = "No such user")
    )
)]
/// Soft-deactivation; the account record is never deleted.
#[axum::debug_handler]
pub async fn deactivate_usuario(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UsuarioRes>, HandlerError> {
    state
        .users
        .deactivate(&username)
        .map_err(|err| store_error("deactivate user", err))?;
    match state.users.find(&username) {
        Some(record) => Ok(Json(usuario_res(record))),
        None => Err((StatusCode::NOT_FOUND, "user not found".to_owned())),
    }
}
