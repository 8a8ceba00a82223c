use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::completion::Completion;
use crate::note::Note;
use crate::task::Task;

pub const TASKS_KEY: &str = "tasks";
pub const COMPLETIONS_KEY: &str = "completions";
pub const NOTES_KEY: &str = "notes";

/// The whole persisted state. Collections are flat and keyed by id; there is
/// no partial or incremental persistence contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub completions: Vec<Completion>,
    pub notes: Vec<Note>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to prepare store directory: {source}")]
    Root {
        #[source]
        source: io::Error,
    },
    #[error("failed to read `{key}`: {source}")]
    Read {
        key: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("failed to write `{key}`: {source}")]
    Write {
        key: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("malformed `{key}` payload: {source}")]
    Decode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode `{key}`: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable whole-collection storage under the three fixed keys.
pub trait SnapshotStore: Send + Sync {
    fn load(&self) -> Result<Snapshot, StoreError>;
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

/// One JSON document per key in a single directory. A missing file loads as
/// the empty collection; `save` rewrites every key wholesale.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn read_key<T: DeserializeOwned>(&self, key: &'static str) -> Result<Vec<T>, StoreError> {
        let raw = match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::Read { key, source: err }),
        };
        serde_json::from_str(&raw).map_err(|err| StoreError::Decode { key, source: err })
    }

    fn write_key<T: Serialize>(&self, key: &'static str, values: &[T]) -> Result<(), StoreError> {
        let payload = serde_json::to_string_pretty(values)
            .map_err(|err| StoreError::Encode { key, source: err })?;
        fs::write(self.path_for(key), payload).map_err(|err| StoreError::Write { key, source: err })
    }
}

impl SnapshotStore for JsonDirStore {
    fn load(&self) -> Result<Snapshot, StoreError> {
        Ok(Snapshot {
            tasks: self.read_key(TASKS_KEY)?,
            completions: self.read_key(COMPLETIONS_KEY)?,
            notes: self.read_key(NOTES_KEY)?,
        })
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|err| StoreError::Root { source: err })?;
        self.write_key(TASKS_KEY, &snapshot.tasks)?;
        self.write_key(COMPLETIONS_KEY, &snapshot.completions)?;
        self.write_key(NOTES_KEY, &snapshot.notes)
    }
}
