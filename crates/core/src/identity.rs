//! Identity records and the file-backed user directory.
//!
//! The directory is a single JSON document loaded at open and rewritten on
//! every mutation. Mutation only happens through administrative operations
//! and is rare; reads take a shared lock and clone the record out, so the
//! request path never holds the lock across I/O.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use chrono::{DateTime, Utc};
use maternidad_types::Rut;
use parking_lot::RwLock;
use std::path::PathBuf;

use crate::config::CoreConfig;
use crate::credentials;
use crate::roles::{DisplayRole, Group};
use crate::{StoreError, StoreResult};

/// One identity in the directory. Offboarding deactivates, never deletes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub full_name: String,
    pub email: String,
    /// Canonical national identifier, when the user has one.
    #[serde(default)]
    pub rut: Option<String>,
    pub password_hash: String,
    pub active: bool,
    pub superuser: bool,
    #[serde(default)]
    pub groups: BTreeSet<Group>,
    /// Argon2 hash of the enrolled second-factor code, when enrolled.
    #[serde(default)]
    pub second_factor: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn display_role(&self) -> DisplayRole {
        DisplayRole::resolve(self.superuser, &self.groups)
    }

    pub fn is_second_factor_enrolled(&self) -> bool {
        self.second_factor.is_some()
    }
}

/// Input for creating an identity.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub rut: Option<Rut>,
    pub groups: BTreeSet<Group>,
    pub superuser: bool,
}

/// JSON-file-backed identity store keyed by username.
pub struct UserDirectory {
    path: PathBuf,
    users: RwLock<BTreeMap<String, UserRecord>>,
}

impl UserDirectory {
    /// Opens the directory, creating the data directory and loading any
    /// existing document.
    pub fn open(config: &CoreConfig) -> StoreResult<Self> {
        fs::create_dir_all(config.data_dir()).map_err(StoreError::StorageDirCreation)?;
        let path = config.users_file();
        let users = if path.is_file() {
            let contents = fs::read_to_string(&path).map_err(StoreError::FileRead)?;
            serde_json::from_str(&contents).map_err(StoreError::Deserialization)?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            users: RwLock::new(users),
        })
    }

    fn persist(&self, users: &BTreeMap<String, UserRecord>) -> StoreResult<()> {
        let contents = serde_json::to_string_pretty(users).map_err(StoreError::Serialization)?;
        fs::write(&self.path, contents).map_err(StoreError::FileWrite)
    }

    /// Creates a new identity with a freshly hashed password.
    ///
    /// The username and, when present, the canonical RUT must both be free;
    /// either one colliding with an existing login key is a duplicate.
    pub fn add_user(&self, new_user: NewUser) -> StoreResult<UserRecord> {
        let username = new_user.username.trim().to_owned();
        if username.is_empty() {
            return Err(StoreError::InvalidInput("username cannot be empty".into()));
        }

        let password_hash = credentials::hash_password(&new_user.password)?;
        let rut = new_user.rut.map(|r| r.canonical());

        let mut users = self.users.write();
        if users.contains_key(&username) {
            return Err(StoreError::DuplicateUser(username));
        }
        if let Some(rut) = &rut {
            let taken = users.contains_key(rut)
                || users.values().any(|u| u.rut.as_deref() == Some(rut));
            if taken {
                return Err(StoreError::DuplicateUser(rut.clone()));
            }
        }

        let record = UserRecord {
            username: username.clone(),
            full_name: new_user.full_name,
            email: new_user.email,
            rut,
            password_hash,
            active: true,
            superuser: new_user.superuser,
            groups: new_user.groups,
            second_factor: None,
            created_at: Utc::now(),
        };
        users.insert(username, record.clone());
        self.persist(&users)?;
        Ok(record)
    }

    pub fn set_password(&self, username: &str, new_password: &str) -> StoreResult<()> {
        let password_hash = credentials::hash_password(new_password)?;
        let mut users = self.users.write();
        let record = users
            .get_mut(username)
            .ok_or_else(|| StoreError::NotFound(username.to_owned()))?;
        record.password_hash = password_hash;
        self.persist(&users)
    }

    /// Marks the identity inactive. The record stays in the directory.
    pub fn deactivate(&self, username: &str) -> StoreResult<()> {
        let mut users = self.users.write();
        let record = users
            .get_mut(username)
            .ok_or_else(|| StoreError::NotFound(username.to_owned()))?;
        record.active = false;
        self.persist(&users)
    }

    /// Stores the hash of the user's second-factor code.
    pub fn enroll_second_factor(&self, username: &str, code: &str) -> StoreResult<()> {
        let code_hash = credentials::hash_password(code)?;
        let mut users = self.users.write();
        let record = users
            .get_mut(username)
            .ok_or_else(|| StoreError::NotFound(username.to_owned()))?;
        record.second_factor = Some(code_hash);
        self.persist(&users)
    }

    /// Looks up an identity by login key: the username, or the canonical RUT
    /// attached to the record.
    pub fn find(&self, login_key: &str) -> Option<UserRecord> {
        let users = self.users.read();
        if let Some(record) = users.get(login_key) {
            return Some(record.clone());
        }
        users
            .values()
            .find(|u| u.rut.as_deref() == Some(login_key))
            .cloned()
    }

    pub fn list(&self) -> Vec<UserRecord> {
        self.users.read().values().cloned().collect()
    }

    pub fn count_active(&self) -> usize {
        self.users.read().values().filter(|u| u.active).count()
    }

    pub fn has_superuser(&self) -> bool {
        self.users.read().values().any(|u| u.superuser && u.active)
    }
}
