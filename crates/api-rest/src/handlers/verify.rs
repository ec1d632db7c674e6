//! Second-factor step-up flow.
//!
//! Enrolment and verification share one endpoint pair: the first code an
//! identity submits becomes its second factor, later submissions are checked
//! against it. The verified flag lives on the session, so every login passes
//! through here again.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use api_shared::auth::{VerifyReq, VerifyRes, VerifyStatusRes};
use maternidad_core::credentials::verify_password;

use super::{require_session, store_error, HandlerError};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/verify",
    responses(
        (status = 200, description = "Where the caller stands in the step-up flow", body = VerifyStatusRes),
        (status = 401, description = "Authentication required")
    )
)]
#[axum::debug_handler]
pub async fn verify_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<VerifyStatusRes>, HandlerError> {
    let session = require_session(&state, &headers)?;
    let record = state.users.find(&session.principal.username).ok_or((
        StatusCode::UNAUTHORIZED,
        "Authentication required".to_owned(),
    ))?;

    let enrolled = record.is_second_factor_enrolled();
    let message = if !session.principal.requires_second_factor() {
        "Second factor not required for this role"
    } else if session.second_factor_verified {
        "Second factor verified"
    } else if enrolled {
        "Enter your verification code"
    } else {
        "Choose a verification code to enrol"
    };
    Ok(Json(VerifyStatusRes {
        enrolled,
        verified: session.second_factor_verified,
        message: message.to_owned(),
    }))
}

#[utoipa::path(
    post,
    path = "/verify",
    request_body = VerifyReq,
    responses(
        (status = 200, description = "Code accepted", body = VerifyRes),
        (status = 400, description = "Missing code"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Wrong code")
    )
)]
#[axum::debug_handler]
pub async fn verify_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<VerifyReq>,
) -> Result<Json<VerifyRes>, HandlerError> {
    let session = require_session(&state, &headers)?;
    let code = req.code.trim();
    if code.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "code is required".to_owned()));
    }
    let record = state.users.find(&session.principal.username).ok_or((
        StatusCode::UNAUTHORIZED,
        "Authentication required".to_owned(),
    ))?;

    if !record.is_second_factor_enrolled() {
        state
            .users
            .enroll_second_factor(&record.username, code)
            .map_err(|err| store_error("enrol second factor", err))?;
        state.sessions.mark_second_factor_verified(&session.token);
        tracing::info!(user = %record.username, "second factor enrolled");
        return Ok(Json(VerifyRes {
            ok: true,
            message: "Second factor enrolled and verified".to_owned(),
        }));
    }

    let stored = record.second_factor.as_deref().unwrap_or("");
    if verify_password(code, stored) {
        state.sessions.mark_second_factor_verified(&session.token);
        Ok(Json(VerifyRes {
            ok: true,
            message: "Second factor verified".to_owned(),
        }))
    } else {
        tracing::warn!(user = %record.username, "second factor code rejected");
        Err((
            StatusCode::FORBIDDEN,
            "Invalid verification code".to_owned(),
        ))
    }
}
