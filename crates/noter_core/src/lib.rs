//! Synchronization engine between a note outline and a document viewer.
//!
//! A session binds one viewer (paged, ranged or node document) to the root
//! entry of a note document and keeps the notes for the viewer's location
//! partitioned and highlighted as either side moves.

pub mod adapter;
pub mod config;
pub mod db;
pub mod highlight;
pub mod logging;
pub mod model;
pub mod session;
pub mod store;
pub mod tree;

pub use adapter::{
    AdapterError, AdapterFactory, AdapterRegistry, AdapterRegistryError, DocumentAdapter,
    NavigationEvent, NavigationListener,
};
pub use config::{ConfigError, NoterConfig};
pub use highlight::{
    content_hash, plan_highlights, HighlightCoordinator, HighlightPlan, Mark, MarkId, MarkStyle,
    MarkSurface,
};
pub use logging::{init_logging, logging_status, LoggingError};
pub use model::entry::{EntryId, NoteEntry, PropertyKeys, RemarkRange};
pub use model::literal::{Literal, PropertyDecodeError};
pub use model::location::{DocumentKind, Location, LocationError, LocationOrder, Viewport};
pub use session::{
    Direction, DispatchReport, InsertedNote, NoteRequest, Session, SessionBinding,
    SessionCreateError, SessionError, SessionId, SessionManager, SessionSnapshot, SessionState,
};
pub use store::{
    MemoryNoteStore, NoteDocument, NoteKey, NoteSourceResolver, NoteStore, SqliteNoteStore,
    StoreError, StoreResult,
};
pub use tree::{
    NewEntry, NoteTree, ParseError, ParseErrorKind, Partition, PropertyWarning, TreeError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
