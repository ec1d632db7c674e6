//! Password hashing and the dual-credential login check.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use maternidad_types::Rut;

use crate::identity::{UserDirectory, UserRecord};
use crate::{AuthError, AuthResult, StoreError, StoreResult};

/// Hashes a password (or second-factor code) into a PHC argon2id string.
pub fn hash_password(password: &str) -> StoreResult<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|e| StoreError::PasswordHash(e.to_string()))?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| StoreError::PasswordHash(e.to_string()))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| StoreError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verifies a candidate secret against a stored PHC hash. An unparseable
/// stored hash verifies as false rather than erroring.
pub fn verify_password(candidate: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Checks a login attempt against the directory.
///
/// The identifier is tried verbatim first. If that fails and the identifier
/// normalizes as a RUT, the canonical form is tried once; a normalization
/// failure is swallowed and never surfaced. Both outcomes of a failed attempt
/// collapse into the same generic error, so callers cannot learn whether the
/// login key exists. Only after a credential match is the active flag
/// consulted.
pub fn verify_login(
    directory: &UserDirectory,
    identifier: &str,
    password: &str,
) -> AuthResult<UserRecord> {
    if let Some(record) = attempt(directory, identifier, password) {
        return allow_if_active(record);
    }

    if let Ok(rut) = Rut::normalize(identifier) {
        let canonical = rut.canonical();
        if canonical != identifier {
            if let Some(record) = attempt(directory, &canonical, password) {
                return allow_if_active(record);
            }
        }
    }

    Err(AuthError::InvalidCredentials)
}

fn attempt(directory: &UserDirectory, login_key: &str, password: &str) -> Option<UserRecord> {
    directory
        .find(login_key)
        .filter(|record| verify_password(password, &record.password_hash))
}

fn allow_if_active(record: UserRecord) -> AuthResult<UserRecord> {
    if record.active {
        Ok(record)
    } else {
        Err(AuthError::AccountDisabled)
    }
}
