//! HTTP handlers, grouped by URL namespace.

pub mod auth;
pub mod dashboard;
pub mod gestion;
pub mod matrona;
pub mod medico;
pub mod tens;
pub mod verify;

use axum::http::{HeaderMap, StatusCode};
use chrono::{DateTime, NaiveDate, Utc};

use maternidad_core::docstore::RecordId;
use maternidad_core::session::Session;
use maternidad_core::StoreError;

use crate::{cookies, AppState};

pub(crate) type HandlerError = (StatusCode, String);

pub(crate) fn require_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Session, HandlerError> {
    cookies::session_token(headers)
        .and_then(|token| state.sessions.validate(&token))
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_owned(),
            )
        })
}

pub(crate) fn forbidden() -> HandlerError {
    (StatusCode::FORBIDDEN, "Forbidden".to_owned())
}

/// Maps store failures onto HTTP statuses. Validation problems echo their
/// message; anything unexpected is logged and hidden behind a 500.
pub(crate) fn store_error(context: &str, err: StoreError) -> HandlerError {
    match &err {
        StoreError::InvalidInput(_)
        | StoreError::MissingReference(_)
        | StoreError::InvalidRecordId(_) => {
            tracing::warn!("{context}: {err}");
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        StoreError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        _ => {
            tracing::error!("{context} error: {err:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_owned(),
            )
        }
    }
}

pub(crate) fn parse_record_id(raw: &str) -> Result<RecordId, HandlerError> {
    RecordId::parse(raw).map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))
}

pub(crate) fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, HandlerError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| (StatusCode::BAD_REQUEST, format!("{field} must be YYYY-MM-DD")))
}

pub(crate) fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, HandlerError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                format!("{field} must be an RFC 3339 timestamp"),
            )
        })
}
