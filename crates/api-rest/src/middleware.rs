//! Request-level access control.
//!
//! Two layers run on every request, in order: the role gatekeeper, then the
//! second-factor step-up gate. Both are thin shims over decision logic in
//! `maternidad-core`, so handlers and middleware consult the same rules.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;

use api_shared::auth::ForbiddenRes;
use maternidad_core::constants::{LOGIN_PATH, VERIFY_PATH};
use maternidad_core::gatekeeper::Access;
use maternidad_core::session::Session;

use crate::{cookies, AppState};

fn current_session(state: &AppState, request: &Request) -> Option<Session> {
    let token = cookies::session_token(request.headers())?;
    state.sessions.validate(&token)
}

/// Maps every request path through [`RouteTable::decide`] before it reaches a
/// handler.
///
/// [`RouteTable::decide`]: maternidad_core::gatekeeper::RouteTable::decide
pub async fn role_gatekeeper(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    let session = current_session(&state, &request);
    let principal = session.as_ref().map(|s| &s.principal);

    match state.routes.decide(principal, &path) {
        Access::Allowed | Access::PassThrough => next.run(request).await,
        Access::RedirectToLogin { next: wanted } => {
            Redirect::to(&format!("{LOGIN_PATH}?next={wanted}")).into_response()
        }
        Access::Denied(denial) => {
            let detail = match denial.required {
                Some(group) => format!(
                    "namespace '{}' requires membership of '{}'",
                    denial.namespace, group
                ),
                None => format!("namespace '{}' could not be resolved", denial.namespace),
            };
            (
                StatusCode::FORBIDDEN,
                Json(ForbiddenRes {
                    error: "forbidden".to_owned(),
                    detail,
                }),
            )
                .into_response()
        }
    }
}

/// Step-up gate: administrators and superusers must pass the second-factor
/// challenge before using anything beyond the public routes and `/verify`
/// itself. Other roles pass through untouched.
pub async fn require_second_factor(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    let exempt = match state.routes.resolve(&path) {
        Ok(Some(route)) => route.name == "verify" || state.routes.is_public(&route.name),
        // Unknown paths fall through to the router's 404.
        Ok(None) => true,
        Err(_) => false,
    };
    if exempt {
        return next.run(request).await;
    }

    if let Some(session) = current_session(&state, &request) {
        if session.principal.requires_second_factor() && !session.second_factor_verified {
            tracing::info!(
                user = %session.principal.username,
                path,
                "second factor pending, redirecting to verification"
            );
            return Redirect::to(VERIFY_PATH).into_response();
        }
    }

    next.run(request).await
}
