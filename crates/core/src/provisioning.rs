//! Administrative provisioning: group/permission setup and the seeded
//! administrator account.

use std::collections::BTreeMap;
use std::fs;

use crate::config::CoreConfig;
use crate::constants::{DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME};
use crate::identity::{NewUser, UserDirectory};
use crate::roles::Group;
use crate::{StoreError, StoreResult};

/// Outcome of one `setup_roles` run, for operator reporting.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SetupSummary {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
}

/// Idempotently ensures the four groups and their permission sets exist in
/// the groups document. Running it twice in a row changes nothing; groups
/// whose stored permission set has drifted from the enumerated table are
/// rewritten to match it.
pub fn setup_roles(config: &CoreConfig) -> StoreResult<SetupSummary> {
    fs::create_dir_all(config.data_dir()).map_err(StoreError::StorageDirCreation)?;
    let path = config.groups_file();

    let mut stored: BTreeMap<String, Vec<String>> = if path.is_file() {
        let contents = fs::read_to_string(&path).map_err(StoreError::FileRead)?;
        serde_json::from_str(&contents).map_err(StoreError::Deserialization)?
    } else {
        BTreeMap::new()
    };

    let mut summary = SetupSummary::default();
    let mut dirty = false;
    for group in Group::ALL {
        let name = group.display_name().to_owned();
        let desired = group.permission_codenames();
        match stored.get(&name) {
            None => {
                stored.insert(name.clone(), desired);
                summary.created.push(name);
                dirty = true;
            }
            Some(existing) if *existing != desired => {
                stored.insert(name.clone(), desired);
                summary.updated.push(name);
                dirty = true;
            }
            Some(_) => summary.unchanged.push(name),
        }
    }

    if dirty {
        let contents = serde_json::to_string_pretty(&stored).map_err(StoreError::Serialization)?;
        fs::write(&path, contents).map_err(StoreError::FileWrite)?;
    }
    tracing::info!(
        created = summary.created.len(),
        updated = summary.updated.len(),
        unchanged = summary.unchanged.len(),
        "group provisioning complete"
    );
    Ok(summary)
}

/// Seeds the stock administrator when the directory holds no active
/// superuser. Returns whether an account was created.
pub fn ensure_default_admin(directory: &UserDirectory) -> StoreResult<bool> {
    if directory.has_superuser() {
        return Ok(false);
    }
    directory.add_user(NewUser {
        username: DEFAULT_ADMIN_USERNAME.to_owned(),
        password: DEFAULT_ADMIN_PASSWORD.to_owned(),
        full_name: "Administrador".to_owned(),
        email: String::new(),
        rut: None,
        groups: [Group::Administrador].into_iter().collect(),
        superuser: true,
    })?;
    tracing::warn!(
        user = DEFAULT_ADMIN_USERNAME,
        "default administrator created with the stock password, change it immediately"
    );
    Ok(true)
}
