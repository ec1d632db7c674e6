//! In-process session store.
//!
//! Tokens are 32 random bytes in base64url. The store is two lock-guarded
//! maps: token to session, and username to the set of tokens owned by that
//! user so administrative revocation can find them all.

use std::collections::{BTreeSet, HashMap, HashSet};

use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use crate::identity::UserRecord;
use crate::roles::{DisplayRole, Group};
use crate::{AuthError, AuthResult};

/// When a session stops being valid. Decided exactly once, at login; never
/// renegotiated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExpiry {
    /// The session ends when the browser closes; the server keeps it until
    /// logout or revocation.
    BrowserSession,
    /// The session ends at a fixed instant.
    Fixed(DateTime<Utc>),
}

impl SessionExpiry {
    /// Maps the remember flag to the expiry directive: a browser session, or
    /// a fixed expiry `remember_duration` from now.
    pub fn from_remember(remember: bool, remember_duration: Duration) -> Self {
        if remember {
            SessionExpiry::Fixed(Utc::now() + remember_duration)
        } else {
            SessionExpiry::BrowserSession
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            SessionExpiry::BrowserSession => false,
            SessionExpiry::Fixed(at) => *at <= now,
        }
    }

    /// The `Max-Age` the session cookie should carry: none for a browser
    /// session, the remaining whole seconds for a fixed expiry.
    pub fn cookie_max_age(&self, now: DateTime<Utc>) -> Option<i64> {
        match self {
            SessionExpiry::BrowserSession => None,
            SessionExpiry::Fixed(at) => Some((*at - now).num_seconds().max(0)),
        }
    }
}

/// The authenticated caller as seen by the gate and the handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub superuser: bool,
    pub groups: BTreeSet<Group>,
}

impl Principal {
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            username: record.username.clone(),
            superuser: record.superuser,
            groups: record.groups.clone(),
        }
    }

    pub fn display_role(&self) -> DisplayRole {
        DisplayRole::resolve(self.superuser, &self.groups)
    }

    /// Whether the step-up gate applies to this caller at all.
    pub fn requires_second_factor(&self) -> bool {
        self.superuser || self.groups.contains(&Group::Administrador)
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub principal: Principal,
    pub issued_at: DateTime<Utc>,
    pub expiry: SessionExpiry,
    /// Set once the caller passes the second-factor challenge. Lives on the
    /// session, not the identity: every new login starts unverified.
    pub second_factor_verified: bool,
}

fn generate_token() -> AuthResult<String> {
    let mut buf = [0u8; 32];
    getrandom::getrandom(&mut buf).map_err(|e| AuthError::TokenGeneration(e.to_string()))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
}

#[derive(Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Session>>,
    user_index: RwLock<HashMap<String, HashSet<String>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a session for a freshly authenticated identity.
    pub fn issue(&self, record: &UserRecord, expiry: SessionExpiry) -> AuthResult<Session> {
        let token = generate_token()?;
        let session = Session {
            token: token.clone(),
            principal: Principal::from_record(record),
            issued_at: Utc::now(),
            expiry,
            second_factor_verified: false,
        };
        self.sessions.write().insert(token.clone(), session.clone());
        self.user_index
            .write()
            .entry(record.username.clone())
            .or_default()
            .insert(token);
        tracing::info!(user = %record.username, expiry = ?expiry, "session issued");
        Ok(session)
    }

    /// Looks up a live session. Expired sessions are pruned on sight.
    pub fn validate(&self, token: &str) -> Option<Session> {
        let now = Utc::now();
        let expired = {
            let sessions = self.sessions.read();
            match sessions.get(token) {
                Some(session) if session.expiry.is_expired_at(now) => true,
                Some(session) => return Some(session.clone()),
                None => return None,
            }
        };
        if expired {
            self.remove(token);
        }
        None
    }

    /// Flips the second-factor flag on a live session. Returns false when the
    /// token is unknown or expired.
    pub fn mark_second_factor_verified(&self, token: &str) -> bool {
        if self.validate(token).is_none() {
            return false;
        }
        let mut sessions = self.sessions.write();
        match sessions.get_mut(token) {
            Some(session) => {
                session.second_factor_verified = true;
                true
            }
            None => false,
        }
    }

    pub fn logout(&self, token: &str) -> bool {
        self.remove(token)
    }

    /// Drops every session belonging to a user; used when an identity is
    /// deactivated. Returns how many sessions were revoked.
    pub fn revoke_user(&self, username: &str) -> usize {
        let tokens: Vec<String> = match self.user_index.read().get(username) {
            Some(tokens) => tokens.iter().cloned().collect(),
            None => return 0,
        };
        let mut count = 0;
        for token in tokens {
            if self.remove(&token) {
                count += 1;
            }
        }
        tracing::info!(user = %username, count, "sessions revoked");
        count
    }

    fn remove(&self, token: &str) -> bool {
        let removed = self.sessions.write().remove(token);
        if let Some(session) = &removed {
            let mut index = self.user_index.write();
            if let Some(tokens) = index.get_mut(&session.principal.username) {
                tokens.remove(token);
                if tokens.is_empty() {
                    index.remove(&session.principal.username);
                }
            }
        }
        removed.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(username: &str, groups: &[Group]) -> UserRecord {
        UserRecord {
            username: username.to_owned(),
            full_name: "Prueba".to_owned(),
            email: "prueba@hospital.cl".to_owned(),
            rut: None,
            password_hash: String::new(),
            active: true,
            superuser: false,
            groups: groups.iter().copied().collect(),
            second_factor: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn remember_flag_splits_the_expiry_directive() {
        let thirty_days = Duration::days(30);
        assert_eq!(
            SessionExpiry::from_remember(false, thirty_days),
            SessionExpiry::BrowserSession
        );

        let before = Utc::now();
        let fixed = SessionExpiry::from_remember(true, thirty_days);
        match fixed {
            SessionExpiry::Fixed(at) => {
                assert!(at >= before + thirty_days);
                assert!(at <= Utc::now() + thirty_days);
            }
            SessionExpiry::BrowserSession => panic!("remember=true must produce a fixed expiry"),
        }
    }

    #[test]
    fn browser_session_has_no_cookie_max_age() {
        let now = Utc::now();
        assert_eq!(SessionExpiry::BrowserSession.cookie_max_age(now), None);
        let fixed = SessionExpiry::Fixed(now + Duration::seconds(2_592_000));
        assert_eq!(fixed.cookie_max_age(now), Some(2_592_000));
    }

    #[test]
    fn issue_and_validate() {
        let manager = SessionManager::new();
        let session = manager
            .issue(&record("arojas", &[Group::Matrona]), SessionExpiry::BrowserSession)
            .expect("Should issue session");
        assert!(!session.second_factor_verified);

        let validated = manager.validate(&session.token).expect("Should validate");
        assert_eq!(validated.principal.username, "arojas");
    }

    #[test]
    fn expired_fixed_session_is_pruned() {
        let manager = SessionManager::new();
        let expired = SessionExpiry::Fixed(Utc::now() - Duration::seconds(1));
        let session = manager
            .issue(&record("arojas", &[]), expired)
            .expect("Should issue session");
        assert!(manager.validate(&session.token).is_none());
        // Second lookup hits the pruned map.
        assert!(manager.validate(&session.token).is_none());
    }

    #[test]
    fn logout_removes_only_that_session() {
        let manager = SessionManager::new();
        let first = manager
            .issue(&record("arojas", &[]), SessionExpiry::BrowserSession)
            .expect("Should issue session");
        let second = manager
            .issue(&record("arojas", &[]), SessionExpiry::BrowserSession)
            .expect("Should issue session");

        assert!(manager.logout(&first.token));
        assert!(manager.validate(&first.token).is_none());
        assert!(manager.validate(&second.token).is_some());
    }

    #[test]
    fn revoke_user_drops_every_session() {
        let manager = SessionManager::new();
        let first = manager
            .issue(&record("arojas", &[]), SessionExpiry::BrowserSession)
            .expect("Should issue session");
        let second = manager
            .issue(&record("arojas", &[]), SessionExpiry::BrowserSession)
            .expect("Should issue session");
        let other = manager
            .issue(&record("isoto", &[]), SessionExpiry::BrowserSession)
            .expect("Should issue session");

        assert_eq!(manager.revoke_user("arojas"), 2);
        assert!(manager.validate(&first.token).is_none());
        assert!(manager.validate(&second.token).is_none());
        assert!(manager.validate(&other.token).is_some());
    }

    #[test]
    fn second_factor_flag_flips_per_session() {
        let manager = SessionManager::new();
        let session = manager
            .issue(&record("admin", &[Group::Administrador]), SessionExpiry::BrowserSession)
            .expect("Should issue session");

        assert!(manager.mark_second_factor_verified(&session.token));
        let validated = manager.validate(&session.token).expect("Should validate");
        assert!(validated.second_factor_verified);

        // A later login starts unverified again.
        let fresh = manager
            .issue(&record("admin", &[Group::Administrador]), SessionExpiry::BrowserSession)
            .expect("Should issue session");
        assert!(!fresh.second_factor_verified);
        assert!(!manager.mark_second_factor_verified("token-desconocido"));
    }

    #[test]
    fn step_up_applies_to_admins_and_superusers_only() {
        let admin = Principal::from_record(&record("a", &[Group::Administrador]));
        let mut root = Principal::from_record(&record("r", &[]));
        root.superuser = true;
        let matrona = Principal::from_record(&record("m", &[Group::Matrona]));

        assert!(admin.requires_second_factor());
        assert!(root.requires_second_factor());
        assert!(!matrona.requires_second_factor());
    }
}
