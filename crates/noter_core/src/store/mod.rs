//! Note document persistence.
//!
//! # Responsibility
//! - Define the note store contract: text plus a modification counter.
//! - Resolve which note document belongs to a viewed document.
//!
//! # Invariants
//! - Revisions are strictly increasing per key; every save bumps it.
//! - A key that was never saved has no revision.

mod memory;
mod resolver;
mod sqlite;

pub use memory::MemoryNoteStore;
pub use resolver::NoteSourceResolver;
pub use sqlite::SqliteNoteStore;

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identifier of one note document inside a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteKey(String);

impl NoteKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NoteKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored note document snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDocument {
    pub key: NoteKey,
    pub text: String,
    pub revision: u64,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from note store operations.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    /// The database was written by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "note database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "note store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid note store data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Storage contract for note documents.
pub trait NoteStore {
    /// Returns the modification counter of `key`, if stored.
    fn revision(&self, key: &NoteKey) -> StoreResult<Option<u64>>;
    /// Loads the document stored under `key`.
    fn load(&self, key: &NoteKey) -> StoreResult<Option<NoteDocument>>;
    /// Replaces the text of `key` and returns its new revision.
    fn save(&self, key: &NoteKey, text: &str) -> StoreResult<u64>;
}
