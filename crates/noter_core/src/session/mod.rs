//! Note/document synchronization sessions.
//!
//! # Responsibility
//! - Bind one document adapter to one root entry of a note document.
//! - Reconcile the viewer location with the note tree on every navigation
//!   event, insertion and explicit sync command.
//! - Keep at most one session per document.
//!
//! # Invariants
//! - States only move `Uninitialized -> Active -> Killed`.
//! - Every call on a killed session is a no-op.
//! - Partitions are recomputed whole whenever the location or the note
//!   document revision changes.
//!
//! # See also
//! - `highlight` for the marks each recomputation produces.

mod engine;
mod manager;

pub use engine::Session;
pub use manager::{DispatchReport, SessionManager};

use crate::adapter::{AdapterError, DocumentAdapter};
use crate::highlight::MarkSurface;
use crate::model::entry::RemarkRange;
use crate::model::location::{DocumentKind, Location, LocationError};
use crate::store::{NoteKey, StoreError};
use crate::tree::TreeError;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub(crate) fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Active,
    Killed,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Active => "active",
            Self::Killed => "killed",
        }
    }
}

/// Target list of a relative sync command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Previous => f.write_str("previous"),
            Self::Next => f.write_str("next"),
        }
    }
}

/// Why a session could not be created.
#[derive(Debug)]
pub enum SessionCreateError {
    /// The adapter cannot supply a stable document identifier.
    VirtualDocument,
    UnsupportedKind(DocumentKind),
    Tree(TreeError),
    Store(StoreError),
    Adapter(AdapterError),
    Location(LocationError),
    /// The adapter reported a location of another kind than its own.
    KindMismatch {
        expected: DocumentKind,
        actual: DocumentKind,
    },
}

impl Display for SessionCreateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VirtualDocument => write!(f, "document has no stable identifier"),
            Self::UnsupportedKind(kind) => write!(f, "no adapter registered for {kind}"),
            Self::Tree(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Adapter(err) => write!(f, "{err}"),
            Self::Location(err) => write!(f, "{err}"),
            Self::KindMismatch { expected, actual } => {
                write!(f, "{expected} adapter reported a {actual} location")
            }
        }
    }
}

impl Error for SessionCreateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Tree(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Adapter(err) => Some(err),
            Self::Location(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AdapterError> for SessionCreateError {
    fn from(value: AdapterError) -> Self {
        match value {
            AdapterError::VirtualDocument => Self::VirtualDocument,
            other => Self::Adapter(other),
        }
    }
}

/// Errors from session operations.
#[derive(Debug)]
pub enum SessionError {
    Create(SessionCreateError),
    /// The previous/next list is empty.
    NoAdjacentNote(Direction),
    /// No annotated entry encloses the requested note offset.
    NoLocationAtPoint,
    /// The root entry vanished from the note document.
    RootMissing,
    /// Another session already owns this document.
    AlreadyBound(String),
    UnknownSession(SessionId),
    InvalidSplitFraction(f64),
    Tree(TreeError),
    Store(StoreError),
    Adapter(AdapterError),
    Location(LocationError),
    KindMismatch {
        expected: DocumentKind,
        actual: DocumentKind,
    },
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create(err) => write!(f, "cannot create session: {err}"),
            Self::NoAdjacentNote(direction) => write!(f, "there is no {direction} note"),
            Self::NoLocationAtPoint => write!(f, "no annotated note at point"),
            Self::RootMissing => write!(f, "root entry is missing from the note document"),
            Self::AlreadyBound(document) => {
                write!(f, "document `{document}` already has a session")
            }
            Self::UnknownSession(id) => write!(f, "unknown session: {id}"),
            Self::InvalidSplitFraction(value) => {
                write!(f, "split fraction must be between 0 and 1, got {value}")
            }
            Self::Tree(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Adapter(err) => write!(f, "{err}"),
            Self::Location(err) => write!(f, "{err}"),
            Self::KindMismatch { expected, actual } => {
                write!(f, "{expected} adapter reported a {actual} location")
            }
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Create(err) => Some(err),
            Self::Tree(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Adapter(err) => Some(err),
            Self::Location(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SessionCreateError> for SessionError {
    fn from(value: SessionCreateError) -> Self {
        Self::Create(value)
    }
}

impl From<TreeError> for SessionError {
    fn from(value: TreeError) -> Self {
        Self::Tree(value)
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<AdapterError> for SessionError {
    fn from(value: AdapterError) -> Self {
        Self::Adapter(value)
    }
}

impl From<LocationError> for SessionError {
    fn from(value: LocationError) -> Self {
        Self::Location(value)
    }
}

/// Host resources a session takes exclusive ownership of.
pub struct SessionBinding {
    pub adapter: Box<dyn DocumentAdapter>,
    /// Surface over the note document.
    pub note_marks: Box<dyn MarkSurface>,
    /// Surface over the viewed document.
    pub document_marks: Box<dyn MarkSurface>,
}

impl SessionBinding {
    pub fn new(
        adapter: Box<dyn DocumentAdapter>,
        note_marks: Box<dyn MarkSurface>,
        document_marks: Box<dyn MarkSurface>,
    ) -> Self {
        Self {
            adapter,
            note_marks,
            document_marks,
        }
    }
}

/// Note insertion request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteRequest {
    /// Blank titles default to one derived from the current location.
    pub title: String,
    pub remark: Option<RemarkRange>,
    pub body: Option<String>,
}

impl NoteRequest {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_remark(mut self, remark: RemarkRange) -> Self {
        self.remark = Some(remark);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Outcome of `Session::insert_note`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedNote {
    pub title: String,
    /// `false` when the text was appended under an existing entry.
    pub created: bool,
    /// Note text offset where the host should place its cursor.
    pub cursor: usize,
    /// `false` when the session was already killed and nothing was saved.
    pub written: bool,
}

impl InsertedNote {
    pub(crate) fn unwritten(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            created: false,
            cursor: 0,
            written: false,
        }
    }
}

/// Read-only view of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub state: SessionState,
    pub kind: DocumentKind,
    pub document_id: String,
    pub note_key: NoteKey,
    pub location: Location,
    pub previous: Vec<String>,
    pub current: Vec<String>,
    pub after: Vec<String>,
    pub split_fraction: f64,
    pub revision: u64,
}
