//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.

use std::path::{Path, PathBuf};

use chrono::Duration;

use crate::constants::{
    ADMINISTRACIONES_DIR_NAME, DEFAULT_DATA_DIR, GROUPS_FILENAME, INGRESOS_DIR_NAME,
    PACIENTES_DIR_NAME, PATOLOGIAS_DIR_NAME, PERSONAS_DIR_NAME, REMEMBER_SESSION_SECONDS,
    USERS_FILENAME,
};
use crate::gatekeeper::{GateFailurePolicy, UnmappedNamespacePolicy};
use crate::{StoreError, StoreResult};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    remember_duration: Duration,
    gate_failure_policy: GateFailurePolicy,
    unmapped_namespace_policy: UnmappedNamespacePolicy,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        data_dir: PathBuf,
        remember_duration: Duration,
        gate_failure_policy: GateFailurePolicy,
        unmapped_namespace_policy: UnmappedNamespacePolicy,
    ) -> StoreResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(StoreError::InvalidInput("data_dir cannot be empty".into()));
        }
        if remember_duration <= Duration::zero() {
            return Err(StoreError::InvalidInput(
                "remember_duration must be positive".into(),
            ));
        }

        Ok(Self {
            data_dir,
            remember_duration,
            gate_failure_policy,
            unmapped_namespace_policy,
        })
    }

    /// Configuration with the stock session length and gate policies.
    pub fn with_data_dir(data_dir: PathBuf) -> StoreResult<Self> {
        Self::new(
            data_dir,
            Duration::seconds(REMEMBER_SESSION_SECONDS),
            GateFailurePolicy::default(),
            UnmappedNamespacePolicy::default(),
        )
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn users_file(&self) -> PathBuf {
        self.data_dir.join(USERS_FILENAME)
    }

    pub fn groups_file(&self) -> PathBuf {
        self.data_dir.join(GROUPS_FILENAME)
    }

    pub fn personas_dir(&self) -> PathBuf {
        self.data_dir.join(PERSONAS_DIR_NAME)
    }

    pub fn pacientes_dir(&self) -> PathBuf {
        self.data_dir.join(PACIENTES_DIR_NAME)
    }

    pub fn ingresos_dir(&self) -> PathBuf {
        self.data_dir.join(INGRESOS_DIR_NAME)
    }

    pub fn administraciones_dir(&self) -> PathBuf {
        self.data_dir.join(ADMINISTRACIONES_DIR_NAME)
    }

    pub fn patologias_dir(&self) -> PathBuf {
        self.data_dir.join(PATOLOGIAS_DIR_NAME)
    }

    pub fn remember_duration(&self) -> Duration {
        self.remember_duration
    }

    pub fn gate_failure_policy(&self) -> GateFailurePolicy {
        self.gate_failure_policy
    }

    pub fn unmapped_namespace_policy(&self) -> UnmappedNamespacePolicy {
        self.unmapped_namespace_policy
    }
}

/// Resolve the data directory from an optional environment value.
///
/// `None` or blank falls back to [`DEFAULT_DATA_DIR`] relative to the working
/// directory.
pub fn data_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Parse the gate failure policy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default (fail open).
pub fn gate_failure_policy_from_env_value(
    value: Option<String>,
) -> StoreResult<GateFailurePolicy> {
    let value = value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty());
    match value.as_deref() {
        None | Some("open") => Ok(GateFailurePolicy::FailOpen),
        Some("closed") => Ok(GateFailurePolicy::FailClosed),
        Some(other) => Err(StoreError::InvalidInput(format!(
            "gate failure policy must be 'open' or 'closed', got '{other}'"
        ))),
    }
}

/// Parse the unmapped-namespace policy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default (open).
pub fn unmapped_namespace_policy_from_env_value(
    value: Option<String>,
) -> StoreResult<UnmappedNamespacePolicy> {
    let value = value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty());
    match value.as_deref() {
        None | Some("open") => Ok(UnmappedNamespacePolicy::Open),
        Some("require-login") => Ok(UnmappedNamespacePolicy::RequireLogin),
        Some(other) => Err(StoreError::InvalidInput(format!(
            "unmapped namespace policy must be 'open' or 'require-login', got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_data_dir() {
        let result = CoreConfig::with_data_dir(PathBuf::new());
        assert!(matches!(result, Err(StoreError::InvalidInput(_))));
    }

    #[test]
    fn derives_store_paths_from_data_dir() {
        let config = CoreConfig::with_data_dir(PathBuf::from("/srv/maternidad"))
            .expect("Should build config");
        assert_eq!(config.users_file(), PathBuf::from("/srv/maternidad/users.json"));
        assert_eq!(config.personas_dir(), PathBuf::from("/srv/maternidad/personas"));
    }

    #[test]
    fn gate_policy_parses_env_values() {
        assert_eq!(
            gate_failure_policy_from_env_value(None).unwrap(),
            GateFailurePolicy::FailOpen
        );
        assert_eq!(
            gate_failure_policy_from_env_value(Some("  closed ".into())).unwrap(),
            GateFailurePolicy::FailClosed
        );
        assert!(gate_failure_policy_from_env_value(Some("ajar".into())).is_err());
    }

    #[test]
    fn unmapped_policy_parses_env_values() {
        assert_eq!(
            unmapped_namespace_policy_from_env_value(Some(String::new())).unwrap(),
            UnmappedNamespacePolicy::Open
        );
        assert_eq!(
            unmapped_namespace_policy_from_env_value(Some("require-login".into())).unwrap(),
            UnmappedNamespacePolicy::RequireLogin
        );
    }
}
