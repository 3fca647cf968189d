//! Session registry and command surface.
//!
//! # Invariants
//! - At most one live session per document id.
//! - Killed sessions are dropped from the registry and never reused. Their
//!   final snapshot stays readable and commands on their ids do nothing.
//! - `UnknownSession` is reserved for ids this manager never issued.
//! - A session whose root entry vanished is killed on the next command or
//!   navigation event that notices it.

use super::{
    InsertedNote, NoteRequest, Session, SessionBinding, SessionCreateError, SessionError,
    SessionId, SessionSnapshot,
};
use crate::adapter::{
    AdapterFactory, AdapterRegistry, AdapterRegistryError, NavigationEvent, NavigationListener,
};
use crate::config::{is_valid_split_fraction, NoterConfig};
use crate::highlight::MarkSurface;
use crate::model::location::DocumentKind;
use crate::store::NoteStore;
use log::{debug, info, warn};
use std::collections::{BTreeSet, HashMap};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// Outcome of draining queued navigation events.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Sessions whose partition was recomputed.
    pub refreshed: Vec<SessionId>,
    /// Sessions killed because their root entry vanished.
    pub killed: Vec<SessionId>,
    pub failures: Vec<(SessionId, SessionError)>,
}

/// Owner of all live sessions over one note store.
pub struct SessionManager<S: NoteStore> {
    store: S,
    config: NoterConfig,
    registry: AdapterRegistry,
    sessions: HashMap<SessionId, Session>,
    by_document: HashMap<String, SessionId>,
    killed: HashMap<SessionId, SessionSnapshot>,
    sender: Sender<NavigationEvent>,
    events: Receiver<NavigationEvent>,
}

impl<S: NoteStore> SessionManager<S> {
    pub fn new(store: S, config: NoterConfig) -> Self {
        let (sender, events) = mpsc::channel();
        Self {
            store,
            config,
            registry: AdapterRegistry::new(),
            sessions: HashMap::new(),
            by_document: HashMap::new(),
            killed: HashMap::new(),
            sender,
            events,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &NoterConfig {
        &self.config
    }

    pub fn register_adapter(
        &mut self,
        factory: Arc<dyn AdapterFactory>,
    ) -> Result<(), AdapterRegistryError> {
        self.registry.register(factory)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn session_for_document(&self, document_id: &str) -> Option<&Session> {
        let id = self.by_document.get(document_id)?;
        self.sessions.get(id)
    }

    /// Creates a session over an already opened adapter.
    ///
    /// # Errors
    /// - `AlreadyBound` when the document already has a live session.
    /// - `Create` when the session cannot be created.
    pub fn attach(&mut self, binding: SessionBinding) -> Result<SessionId, SessionError> {
        let document_id = binding
            .adapter
            .document_id()
            .map_err(|err| SessionError::Create(err.into()))?;
        if self.by_document.contains_key(&document_id) {
            return Err(SessionError::AlreadyBound(document_id));
        }

        let id = SessionId::new_v4();
        let listener = NavigationListener::new(id, self.sender.clone());
        let session = Session::create(id, binding, &self.store, &self.config, listener)
            .map_err(|err| {
                warn!(
                    "event=session_create module=session status=error error={}",
                    err
                );
                SessionError::Create(err)
            })?;
        self.by_document.insert(document_id, id);
        self.sessions.insert(id, session);
        Ok(id)
    }

    /// Opens `target` with the adapter registered for `kind` and attaches a
    /// session to it.
    pub fn start(
        &mut self,
        kind: DocumentKind,
        target: &str,
        note_marks: Box<dyn MarkSurface>,
        document_marks: Box<dyn MarkSurface>,
    ) -> Result<SessionId, SessionError> {
        let adapter = self.registry.attach(kind, target).map_err(|err| match err {
            AdapterRegistryError::Attach(err) => SessionError::Create(err.into()),
            AdapterRegistryError::UnsupportedKind(kind)
            | AdapterRegistryError::DuplicateKind(kind) => {
                SessionError::Create(SessionCreateError::UnsupportedKind(kind))
            }
        })?;
        self.attach(SessionBinding::new(adapter, note_marks, document_marks))
    }

    /// Kills one session. Killing an already killed session does nothing.
    pub fn kill(&mut self, id: SessionId) -> Result<(), SessionError> {
        let Some(mut session) = self.sessions.remove(&id) else {
            if self.killed.contains_key(&id) {
                return Ok(());
            }
            return Err(SessionError::UnknownSession(id));
        };
        self.by_document.remove(session.document_id());
        let result = session.kill(&self.store);
        self.killed.insert(id, session.snapshot());
        result
    }

    /// Kills every session; returns the first persistence failure.
    pub fn kill_all(&mut self) -> Result<(), SessionError> {
        let ids: BTreeSet<SessionId> = self.sessions.keys().copied().collect();
        let mut first_error = None;
        for id in ids {
            if let Err(err) = self.kill(id) {
                first_error.get_or_insert(err);
            }
        }
        info!(
            "event=session_kill_all module=session status={}",
            if first_error.is_some() { "error" } else { "ok" }
        );
        first_error.map_or(Ok(()), Err)
    }

    /// Runs `on_navigate` once for every session with queued events.
    pub fn dispatch_pending(&mut self) -> DispatchReport {
        let pending: BTreeSet<SessionId> = self.events.try_iter().map(|event| event.session).collect();
        let mut report = DispatchReport::default();
        for id in pending {
            let Some(session) = self.sessions.get_mut(&id) else {
                continue;
            };
            match session.on_navigate(&self.store) {
                Ok(true) => report.refreshed.push(id),
                Ok(false) => {}
                Err(SessionError::RootMissing) => {
                    warn!(
                        "event=session_navigate module=session status=error session={} error=root_missing",
                        id
                    );
                    let _ = self.kill(id);
                    report.killed.push(id);
                }
                Err(err) => {
                    warn!(
                        "event=session_navigate module=session status=error session={} error={}",
                        id, err
                    );
                    report.failures.push((id, err));
                }
            }
        }
        report
    }

    pub fn insert_note(
        &mut self,
        id: SessionId,
        request: &NoteRequest,
    ) -> Result<InsertedNote, SessionError> {
        self.with_session(
            id,
            || InsertedNote::unwritten(request.title.trim()),
            |session, store| session.insert_note(store, request),
        )
    }

    pub fn sync_to_current(&mut self, id: SessionId) -> Result<(), SessionError> {
        self.with_session(id, || (), |session, store| session.sync_to_current(store))
    }

    pub fn sync_to_previous(&mut self, id: SessionId) -> Result<(), SessionError> {
        self.with_session(id, || (), |session, store| session.sync_to_previous(store))
    }

    pub fn sync_to_next(&mut self, id: SessionId) -> Result<(), SessionError> {
        self.with_session(id, || (), |session, store| session.sync_to_next(store))
    }

    pub fn sync_to_note_at(&mut self, id: SessionId, offset: usize) -> Result<(), SessionError> {
        self.with_session(id, || (), |session, store| {
            session.sync_to_note_at(store, offset)
        })
    }

    pub fn set_split_fraction(&mut self, id: SessionId, fraction: f64) -> Result<(), SessionError> {
        if !is_valid_split_fraction(fraction) {
            return Err(SessionError::InvalidSplitFraction(fraction));
        }
        self.with_session(id, || (), |session, store| {
            session.set_split_fraction(store, fraction)
        })
    }

    /// Current view of a live session, or the final view of a killed one.
    pub fn snapshot(&self, id: SessionId) -> Result<SessionSnapshot, SessionError> {
        if let Some(session) = self.sessions.get(&id) {
            return Ok(session.snapshot());
        }
        self.killed
            .get(&id)
            .cloned()
            .ok_or(SessionError::UnknownSession(id))
    }

    /// Runs `command` on a live session. Killed ids get `on_killed()`.
    fn with_session<T>(
        &mut self,
        id: SessionId,
        on_killed: impl FnOnce() -> T,
        command: impl FnOnce(&mut Session, &dyn NoteStore) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let Some(session) = self.sessions.get_mut(&id) else {
            if self.killed.contains_key(&id) {
                debug!(
                    "event=session_command module=session status=skipped session={} reason=killed",
                    id
                );
                return Ok(on_killed());
            }
            return Err(SessionError::UnknownSession(id));
        };
        let result = command(session, &self.store);
        if matches!(result, Err(SessionError::RootMissing)) {
            let _ = self.kill(id);
        }
        result
    }
}

impl<S: NoteStore> Drop for SessionManager<S> {
    fn drop(&mut self) {
        if !self.sessions.is_empty() {
            let _ = self.kill_all();
        }
    }
}
