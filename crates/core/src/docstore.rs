//! Sharded JSON document storage for clinical records.
//!
//! Records are stored one JSON document per entity directory, with two-level
//! sharding derived from the record identifier:
//! `<root>/<s1>/<s2>/<32hex-id>/<doc>.json`, where `s1`/`s2` are the first
//! four hex characters of the identifier. This keeps fan-out per directory
//! bounded as record counts grow.
//!
//! Identifiers use a canonical representation: 32 lowercase hexadecimal
//! characters, no hyphens, the same value `Uuid::new_v4().simple()` prints.
//! Externally supplied identifiers must already be canonical; other forms
//! (uppercase, hyphenated) are rejected rather than normalised.

use std::fs;
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::{StoreError, StoreResult};

/// A record identifier guaranteed to be in canonical 32-hex form.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Allocates a fresh identifier for a new record.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates an externally supplied identifier, which must already be
    /// canonical.
    pub fn parse(input: &str) -> StoreResult<Self> {
        if Self::is_canonical(input) {
            // is_canonical guarantees valid hex, so parse_str succeeds
            if let Ok(uuid) = Uuid::parse_str(input) {
                return Ok(Self(uuid));
            }
        }
        Err(StoreError::InvalidRecordId(input.to_owned()))
    }

    /// Purely syntactic check: exactly 32 lowercase hex characters.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Returns `parent_dir/<s1>/<s2>/<id>/` for this identifier.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.0.simple().to_string();
        let s1 = &canonical[0..2];
        let s2 = &canonical[2..4];
        parent_dir.join(s1).join(s2).join(&canonical)
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for RecordId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordId::parse(s)
    }
}

impl serde::Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RecordId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// One sharded document store: a root directory and the document filename
/// written inside each record directory.
#[derive(Debug, Clone)]
pub struct DocStore {
    root: PathBuf,
    filename: &'static str,
}

impl DocStore {
    pub fn new(root: PathBuf, filename: &'static str) -> Self {
        Self { root, filename }
    }

    fn doc_path(&self, id: &RecordId) -> PathBuf {
        id.sharded_dir(&self.root).join(self.filename)
    }

    pub fn exists(&self, id: &RecordId) -> bool {
        self.doc_path(id).is_file()
    }

    /// Writes a new document, creating the sharded directory chain.
    pub fn insert<T: Serialize>(&self, id: &RecordId, doc: &T) -> StoreResult<()> {
        let dir = id.sharded_dir(&self.root);
        fs::create_dir_all(&dir).map_err(StoreError::RecordDirCreation)?;
        let contents = serde_json::to_string_pretty(doc).map_err(StoreError::Serialization)?;
        fs::write(dir.join(self.filename), contents).map_err(StoreError::FileWrite)
    }

    pub fn read<T: DeserializeOwned>(&self, id: &RecordId) -> StoreResult<T> {
        let path = self.doc_path(id);
        if !path.is_file() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let contents = fs::read_to_string(&path).map_err(StoreError::FileRead)?;
        serde_json::from_str(&contents).map_err(StoreError::Deserialization)
    }

    /// Rewrites an existing document; the record must already exist.
    pub fn replace<T: Serialize>(&self, id: &RecordId, doc: &T) -> StoreResult<()> {
        let path = self.doc_path(id);
        if !path.is_file() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let contents = serde_json::to_string_pretty(doc).map_err(StoreError::Serialization)?;
        fs::write(path, contents).map_err(StoreError::FileWrite)
    }

    /// Walks the sharded tree and reads every document it can.
    ///
    /// Documents that fail to parse are logged as warnings and skipped, so
    /// one damaged file never hides the rest of the records.
    pub fn list<T: DeserializeOwned>(&self) -> Vec<T> {
        let mut records = Vec::new();

        let s1_iter = match fs::read_dir(&self.root) {
            Ok(it) => it,
            Err(_) => return records,
        };
        for s1 in s1_iter.flatten() {
            let s1_path = s1.path();
            if !s1_path.is_dir() {
                continue;
            }

            let s2_iter = match fs::read_dir(&s1_path) {
                Ok(it) => it,
                Err(_) => continue,
            };
            for s2 in s2_iter.flatten() {
                let s2_path = s2.path();
                if !s2_path.is_dir() {
                    continue;
                }

                let id_iter = match fs::read_dir(&s2_path) {
                    Ok(it) => it,
                    Err(_) => continue,
                };
                for id_ent in id_iter.flatten() {
                    let id_path = id_ent.path();
                    if !id_path.is_dir() {
                        continue;
                    }

                    let doc_path = id_path.join(self.filename);
                    if !doc_path.is_file() {
                        continue;
                    }

                    if let Ok(contents) = fs::read_to_string(&doc_path) {
                        match serde_json::from_str::<T>(&contents) {
                            Ok(record) => records.push(record),
                            Err(_) => {
                                tracing::warn!("failed to parse record: {}", doc_path.display());
                            }
                        }
                    }
                }
            }
        }

        records
    }
}
