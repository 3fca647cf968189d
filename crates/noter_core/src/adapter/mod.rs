//! Viewer integration contract.
//!
//! # Responsibility
//! - Define what the engine needs from a document viewer of one kind.
//! - Carry navigation notifications from viewers back to sessions.
//!
//! # Invariants
//! - An adapter reports locations of its own `kind()` only.
//! - Listeners never call back into sessions; they only enqueue events that
//!   `SessionManager::dispatch_pending` drains.
//!
//! # See also
//! - `registry` for kind-keyed adapter construction.

mod registry;

pub use registry::{AdapterFactory, AdapterRegistry, AdapterRegistryError};

use crate::model::entry::RemarkRange;
use crate::model::location::{DocumentKind, Location, Viewport};
use crate::session::SessionId;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::Sender;

/// Errors reported by document adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// The open document has no stable backing identifier.
    VirtualDocument,
    NavigationFailed(String),
}

impl Display for AdapterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VirtualDocument => write!(f, "document has no stable identifier"),
            Self::NavigationFailed(details) => write!(f, "navigation failed: {details}"),
        }
    }
}

impl Error for AdapterError {}

/// Per-kind viewer capability consumed by sessions.
pub trait DocumentAdapter {
    fn kind(&self) -> DocumentKind;
    /// Stable identifier of the open document, stored on root entries.
    fn document_id(&self) -> Result<String, AdapterError>;
    /// Title used for a newly created root entry.
    fn document_title(&self) -> Option<String> {
        None
    }
    fn current_location(&self) -> Location;
    fn navigate_to(&mut self, location: &Location) -> Result<(), AdapterError>;
    /// Registers the listener to notify after user-driven movement.
    ///
    /// Paged viewers notify on page change; ranged and node viewers may
    /// notify on every cursor move.
    fn on_navigation_event(&mut self, listener: NavigationListener);
    /// Visible offset bounds; `None` for paged viewers.
    fn viewport(&self) -> Option<Viewport>;
    /// Live text of `range`, used to verify remark hashes.
    fn region_text(&self, range: RemarkRange) -> Option<String>;
}

/// Navigation notification for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationEvent {
    pub session: SessionId,
}

/// Handle given to an adapter to report navigation.
#[derive(Debug, Clone)]
pub struct NavigationListener {
    session: SessionId,
    sender: Sender<NavigationEvent>,
}

impl NavigationListener {
    pub(crate) fn new(session: SessionId, sender: Sender<NavigationEvent>) -> Self {
        Self { session, sender }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Queues a navigation event; returns `false` once the manager is gone.
    pub fn notify(&self) -> bool {
        self.sender
            .send(NavigationEvent {
                session: self.session,
            })
            .is_ok()
    }
}
