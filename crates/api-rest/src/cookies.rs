//! Session cookie plumbing over raw HTTP headers.

use axum::http::{header, HeaderMap};
use chrono::Utc;
use maternidad_core::constants::SESSION_COOKIE_NAME;
use maternidad_core::session::Session;

/// Extracts the session token from the `Cookie` header, if present.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE_NAME).then(|| value.to_owned())
    })
}

/// `Set-Cookie` value mirroring the session expiry: a fixed expiry carries a
/// `Max-Age`, a browser session carries none.
pub fn session_cookie(session: &Session) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax",
        session.token
    );
    if let Some(max_age) = session.expiry.cookie_max_age(Utc::now()) {
        cookie.push_str(&format!("; Max-Age={max_age}"));
    }
    cookie
}

pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Duration;
    use maternidad_core::session::{Principal, SessionExpiry};
    use std::collections::BTreeSet;

    fn session(expiry: SessionExpiry) -> Session {
        Session {
            token: "abc123".to_owned(),
            principal: Principal {
                username: "arojas".to_owned(),
                superuser: false,
                groups: BTreeSet::new(),
            },
            issued_at: Utc::now(),
            expiry,
            second_factor_verified: false,
        }
    }

    #[test]
    fn token_is_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; maternidad_session=abc123; lang=es"),
        );
        assert_eq!(session_token(&headers), Some("abc123".to_owned()));
    }

    #[test]
    fn missing_cookie_header_yields_none() {
        assert_eq!(session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn browser_session_cookie_has_no_max_age() {
        let cookie = session_cookie(&session(SessionExpiry::BrowserSession));
        assert!(cookie.starts_with("maternidad_session=abc123"));
        assert!(!cookie.contains("Max-Age"));
    }

    #[test]
    fn remembered_session_cookie_carries_remaining_seconds() {
        let expiry = SessionExpiry::Fixed(Utc::now() + Duration::seconds(2_592_000));
        let cookie = session_cookie(&session(expiry));
        assert!(cookie.contains("Max-Age=259"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn clearing_sets_zero_max_age() {
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
