//! Login, logout and the public landing routes.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use api_shared::auth::{HomeRes, LoginReq, LoginRes, LogoutRes};
use api_shared::health::{HealthRes, HealthService};
use maternidad_core::constants::LOGIN_PATH;
use maternidad_core::credentials::verify_login;
use maternidad_core::session::SessionExpiry;
use maternidad_core::AuthError;

use crate::{cookies, AppState};

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Landing information for the caller", body = HomeRes)
    )
)]
/// Public landing route.
///
/// Authenticated callers learn which dashboard their role points at;
/// anonymous callers are pointed at the login page.
#[axum::debug_handler]
pub async fn home(State(state): State<AppState>, headers: HeaderMap) -> Json<HomeRes> {
    let session =
        cookies::session_token(&headers).and_then(|token| state.sessions.validate(&token));
    match session {
        Some(session) => {
            let role = session.principal.display_role();
            Json(HomeRes {
                authenticated: true,
                display_role: role.display_name().to_owned(),
                dashboard: role.dashboard_path().to_owned(),
            })
        }
        None => Json(HomeRes {
            authenticated: false,
            display_role: String::new(),
            dashboard: LOGIN_PATH.to_owned(),
        }),
    }
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Session issued", body = LoginRes),
        (status = 401, description = "Invalid credentials", body = LoginRes),
        (status = 403, description = "Account disabled", body = LoginRes)
    )
)]
/// Authenticates a username or RUT and issues the session cookie.
///
/// The identifier is retried in canonical RUT form when the verbatim lookup
/// fails. Unknown identifiers and wrong passwords produce the same response,
/// so a caller cannot probe which accounts exist.
#[axum::debug_handler]
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginReq>) -> Response {
    let record = match verify_login(&state.users, &req.identifier, &req.password) {
        Ok(record) => record,
        Err(AuthError::AccountDisabled) => {
            return login_failure(StatusCode::FORBIDDEN, "Account is disabled");
        }
        Err(_) => {
            return login_failure(StatusCode::UNAUTHORIZED, "Invalid username/RUT or password");
        }
    };

    let expiry = SessionExpiry::from_remember(req.remember, state.cfg.remember_duration());
    let session = match state.sessions.issue(&record, expiry) {
        Ok(session) => session,
        Err(err) => {
            tracing::error!("session issue error: {err:?}");
            return login_failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal error");
        }
    };

    let role = session.principal.display_role();
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookies::session_cookie(&session))],
        Json(LoginRes {
            ok: true,
            display_role: role.display_name().to_owned(),
            dashboard: role.dashboard_path().to_owned(),
            message: "Login successful".to_owned(),
        }),
    )
        .into_response()
}

fn login_failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(LoginRes {
            ok: false,
            display_role: String::new(),
            dashboard: String::new(),
            message: message.to_owned(),
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Session cleared", body = LogoutRes)
    )
)]
/// Ends the caller's session, if any, and clears the cookie either way.
#[axum::debug_handler]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ended = cookies::session_token(&headers)
        .map(|token| state.sessions.logout(&token))
        .unwrap_or(false);
    let message = if ended {
        "Session ended"
    } else {
        "No active session"
    };
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookies::clear_session_cookie())],
        Json(LogoutRes {
            ok: true,
            message: message.to_owned(),
        }),
    )
        .into_response()
}
