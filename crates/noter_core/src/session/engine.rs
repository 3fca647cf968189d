//! Session state machine.
//!
//! # Invariants
//! - `root` always indexes the root entry of the current `tree`.
//! - Note edits are staged on a copy of the tree, saved, then swapped in;
//!   a failed save leaves the session unchanged.
//! - The recorded viewport only changes when a recomputation runs.

use super::{
    Direction, InsertedNote, NoteRequest, SessionBinding, SessionCreateError, SessionError,
    SessionId, SessionSnapshot, SessionState,
};
use crate::adapter::{DocumentAdapter, NavigationListener};
use crate::config::{is_valid_split_fraction, NoterConfig};
use crate::highlight::{content_hash, plan_highlights, HighlightCoordinator, HighlightPlan};
use crate::model::entry::EntryId;
use crate::model::literal::Literal;
use crate::model::location::{DocumentKind, Location, LocationError, LocationOrder, Viewport};
use crate::store::{NoteKey, NoteSourceResolver, NoteStore};
use crate::tree::{NewEntry, NoteTree, Partition};
use log::{debug, info, warn};

/// One adapter bound to one root entry of a note document.
pub struct Session {
    id: SessionId,
    state: SessionState,
    kind: DocumentKind,
    document_id: String,
    note_key: NoteKey,
    adapter: Box<dyn DocumentAdapter>,
    highlights: HighlightCoordinator,
    tree: NoteTree,
    root: EntryId,
    current: Location,
    viewport: Option<Viewport>,
    partition: Partition,
    split_fraction: f64,
}

impl Session {
    /// Binds `binding` to the root entry for its document, creating the root
    /// when the note document has none.
    ///
    /// # Errors
    /// - `VirtualDocument` when the adapter has no stable document id.
    /// - `Tree` / `Store` when the note document cannot be loaded or the new
    ///   root cannot be saved.
    /// - `KindMismatch` / `Location` when the adapter reports an unusable
    ///   location. A root created for this call is not saved then.
    pub fn create(
        id: SessionId,
        binding: SessionBinding,
        store: &dyn NoteStore,
        config: &NoterConfig,
        listener: NavigationListener,
    ) -> Result<Self, SessionCreateError> {
        let SessionBinding {
            mut adapter,
            note_marks,
            document_marks,
        } = binding;
        let document_id = adapter.document_id()?;
        let kind = adapter.kind();
        let note_key = NoteSourceResolver::from_config(config).resolve(&document_id, kind);

        let mut tree = NoteTree::open(store, &note_key, &config.property_keys)
            .map_err(SessionCreateError::Tree)?;
        let (root, created_root) = match tree.find_root(&document_id) {
            Some(root) => (root, false),
            None => {
                let title = adapter
                    .document_title()
                    .filter(|title| !title.trim().is_empty())
                    .unwrap_or_else(|| config.default_root_title.clone());
                let root = tree
                    .append_root(&title, &document_id)
                    .map_err(SessionCreateError::Tree)?;
                (root, true)
            }
        };

        let root_entry = tree.entry(root);
        let split_fraction = root_entry
            .reserved
            .split_fraction
            .unwrap_or(config.default_split_fraction);
        if config.resume_on_create {
            if let Some(saved) = root_entry.location_for(kind) {
                if let Err(err) = adapter.navigate_to(&saved) {
                    warn!(
                        "event=session_resume module=session status=error kind={} error={}",
                        kind, err
                    );
                }
            }
        }

        let current = adapter.current_location();
        if current.kind() != kind {
            return Err(SessionCreateError::KindMismatch {
                expected: kind,
                actual: current.kind(),
            });
        }
        let viewport = if kind.uses_viewport() {
            adapter.viewport()
        } else {
            None
        };
        adapter.on_navigation_event(listener);

        let mut session = Self {
            id,
            state: SessionState::Uninitialized,
            kind,
            document_id,
            note_key,
            adapter,
            highlights: HighlightCoordinator::new(note_marks, document_marks),
            tree,
            root,
            current,
            viewport,
            partition: Partition::default(),
            split_fraction,
        };
        session
            .recompute()
            .map_err(SessionCreateError::Location)?;
        // A new root only reaches the store once nothing else can fail.
        if created_root {
            let revision = match store.save(&session.note_key, session.tree.text()) {
                Ok(revision) => revision,
                Err(err) => {
                    session.highlights.release();
                    return Err(SessionCreateError::Store(err));
                }
            };
            session.tree.set_revision(revision);
            info!(
                "event=root_create module=session status=ok kind={} note_key={} revision={}",
                session.kind, session.note_key, revision
            );
        }
        session.state = SessionState::Active;
        info!(
            "event=session_create module=session status=ok session={} kind={} note_key={} entries={}",
            session.id,
            session.kind,
            session.note_key,
            session.partition.len()
        );
        Ok(session)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn note_key(&self) -> &NoteKey {
        &self.note_key
    }

    pub fn current_location(&self) -> &Location {
        &self.current
    }

    /// Viewport recorded at the last recomputation.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn tree(&self) -> &NoteTree {
        &self.tree
    }

    pub fn root(&self) -> EntryId {
        self.root
    }

    pub fn split_fraction(&self) -> f64 {
        self.split_fraction
    }

    pub fn highlights(&self) -> &HighlightPlan {
        self.highlights.plan()
    }

    pub fn is_killed(&self) -> bool {
        self.state == SessionState::Killed
    }

    /// Handles a navigation event from the adapter.
    ///
    /// Returns whether the partition was recomputed. Paged sessions
    /// recompute when the page changes. Ranged and node sessions recompute
    /// when the section/node changes or the viewport reaches past the bounds
    /// recorded at the last recomputation. Any session recomputes when the
    /// note document revision moved.
    ///
    /// # Errors
    /// - `RootMissing` when an external edit removed the root entry.
    pub fn on_navigate(&mut self, store: &dyn NoteStore) -> Result<bool, SessionError> {
        if self.is_killed() {
            return Ok(false);
        }
        let location = self.observe_location()?;
        let viewport = self.observe_viewport();
        let revision = store.revision(&self.note_key)?.unwrap_or(0);

        let moved = if self.kind.uses_viewport() {
            !location.same_anchor(&self.current)
                || match (viewport, self.viewport) {
                    (Some(seen), Some(recorded)) => seen.widens(&recorded),
                    (Some(_), None) => true,
                    (None, _) => location != self.current,
                }
        } else {
            location != self.current
        };
        let stale = revision != self.tree.revision();

        self.current = location;
        if !moved && !stale {
            return Ok(false);
        }
        self.viewport = viewport;
        self.reload(store)?;
        self.recompute()?;
        Ok(true)
    }

    /// Inserts a note at the current location, or appends to the current
    /// note with the same title.
    ///
    /// The anchor is the end of the last current note, else the end of the
    /// nearest previous note, else the end of the root's own text.
    pub fn insert_note(
        &mut self,
        store: &dyn NoteStore,
        request: &NoteRequest,
    ) -> Result<InsertedNote, SessionError> {
        if self.is_killed() {
            return Ok(InsertedNote::unwritten(request.title.trim()));
        }
        self.on_navigate(store)?;

        let title = match request.title.trim() {
            "" => format!("Notes for {}", self.current.describe()),
            title => title.to_string(),
        };
        let remark = request.remark.filter(|range| !range.is_empty());
        let remarked_text = remark.and_then(|range| self.adapter.region_text(range));
        let remark_hash = remarked_text
            .as_deref()
            .map(|text| Literal::Text(content_hash(text)).to_string());
        let keys = self.tree.keys().clone();

        let mut staged = self.tree.clone();
        let existing = self
            .partition
            .current
            .iter()
            .copied()
            .find(|id| self.tree.entry(*id).title == title);

        let (created, cursor) = match existing {
            Some(id) => {
                if let Some(range) = remark {
                    staged.set_property(id, &keys.remark_range, &range.serialize())?;
                    if let Some(hash) = remark_hash.as_deref() {
                        staged.set_property(id, &keys.remark_hash, hash)?;
                    }
                }
                let body = request
                    .body
                    .as_deref()
                    .or(remarked_text.as_deref())
                    .unwrap_or("");
                let cursor = if body.is_empty() {
                    staged.entry(id).body_range.end
                } else {
                    staged.append_body(id, body)?
                };
                (false, cursor)
            }
            None => {
                let anchor = self.insertion_anchor();
                let mut entry =
                    NewEntry::new(title.as_str()).with_property(&keys.location, self.current.serialize());
                if let Some(range) = remark {
                    entry = entry.with_property(&keys.remark_range, range.serialize());
                    if let Some(hash) = remark_hash {
                        entry = entry.with_property(&keys.remark_hash, hash);
                    }
                }
                if let Some(body) = request.body.as_deref() {
                    entry = entry.with_body(body);
                }
                let id = staged.insert(self.root, anchor, &entry)?;
                (true, staged.entry(id).body_range.end)
            }
        };

        self.commit(store, staged)?;
        info!(
            "event=note_insert module=session status=ok session={} created={} location={}",
            self.id, created, self.current
        );
        Ok(InsertedNote {
            title,
            created,
            cursor,
            written: true,
        })
    }

    /// Moves the viewer to the first note at the current location.
    ///
    /// Does nothing when no note is at the current location.
    pub fn sync_to_current(&mut self, store: &dyn NoteStore) -> Result<(), SessionError> {
        if self.is_killed() {
            return Ok(());
        }
        match self.partition.first_current() {
            Some(id) => self.navigate_to_entry(store, id),
            None => Ok(()),
        }
    }

    /// Moves the viewer to the nearest previous note.
    pub fn sync_to_previous(&mut self, store: &dyn NoteStore) -> Result<(), SessionError> {
        self.sync_adjacent(store, Direction::Previous)
    }

    /// Moves the viewer to the nearest following note.
    pub fn sync_to_next(&mut self, store: &dyn NoteStore) -> Result<(), SessionError> {
        self.sync_adjacent(store, Direction::Next)
    }

    /// Moves the viewer to the note enclosing `offset` in the note text.
    pub fn sync_to_note_at(
        &mut self,
        store: &dyn NoteStore,
        offset: usize,
    ) -> Result<(), SessionError> {
        if self.is_killed() {
            return Ok(());
        }
        if self.reload(store)? {
            self.recompute()?;
        }
        let id = self
            .tree
            .enclosing_child(self.root, offset)
            .ok_or(SessionError::NoLocationAtPoint)?;
        self.navigate_to_entry(store, id)
    }

    /// Validates and persists a split fraction on the root entry.
    pub fn set_split_fraction(
        &mut self,
        store: &dyn NoteStore,
        fraction: f64,
    ) -> Result<(), SessionError> {
        if !is_valid_split_fraction(fraction) {
            return Err(SessionError::InvalidSplitFraction(fraction));
        }
        if self.is_killed() {
            return Ok(());
        }
        self.reload(store)?;
        let mut staged = self.tree.clone();
        let key = staged.keys().split_fraction.clone();
        staged.set_property(self.root, &key, &Literal::Decimal(fraction).to_string())?;
        self.commit(store, staged)?;
        self.split_fraction = fraction;
        Ok(())
    }

    /// Persists the current location on the root, releases all marks and
    /// ends the session.
    ///
    /// The session is killed even when persisting fails; the failure is
    /// returned. Killing a killed session does nothing.
    pub fn kill(&mut self, store: &dyn NoteStore) -> Result<(), SessionError> {
        if self.is_killed() {
            return Ok(());
        }
        let persisted = self.persist_location(store);
        self.highlights.release();
        self.state = SessionState::Killed;
        match &persisted {
            Ok(()) => info!(
                "event=session_kill module=session status=ok session={} location={}",
                self.id, self.current
            ),
            Err(err) => warn!(
                "event=session_kill module=session status=error session={} error={}",
                self.id, err
            ),
        }
        persisted
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let titles = |ids: &[EntryId]| -> Vec<String> {
            ids.iter()
                .filter_map(|id| self.tree.get(*id))
                .map(|entry| entry.title.clone())
                .collect()
        };
        SessionSnapshot {
            id: self.id,
            state: self.state,
            kind: self.kind,
            document_id: self.document_id.clone(),
            note_key: self.note_key.clone(),
            location: self.current.clone(),
            previous: titles(&self.partition.previous),
            current: titles(&self.partition.current),
            after: titles(&self.partition.after),
            split_fraction: self.split_fraction,
            revision: self.tree.revision(),
        }
    }

    fn sync_adjacent(
        &mut self,
        store: &dyn NoteStore,
        direction: Direction,
    ) -> Result<(), SessionError> {
        if self.is_killed() {
            return Ok(());
        }
        let target = match direction {
            Direction::Previous => self.partition.nearest_previous(),
            Direction::Next => self.partition.nearest_after(),
        };
        let id = target.ok_or(SessionError::NoAdjacentNote(direction))?;
        self.navigate_to_entry(store, id)
    }

    fn navigate_to_entry(&mut self, store: &dyn NoteStore, id: EntryId) -> Result<(), SessionError> {
        let location = self
            .tree
            .get(id)
            .and_then(|entry| entry.location_for(self.kind))
            .ok_or(SessionError::NoLocationAtPoint)?;
        self.adapter.navigate_to(&location)?;
        debug!(
            "event=session_sync module=session status=ok session={} target={}",
            self.id, location
        );
        self.on_navigate(store)?;
        Ok(())
    }

    fn insertion_anchor(&self) -> usize {
        let last_current = self.partition.current.last().copied();
        match last_current.or_else(|| self.partition.nearest_previous()) {
            Some(id) => self.tree.entry(id).subtree_end,
            None => self.tree.entry(self.root).body_range.end,
        }
    }

    fn persist_location(&mut self, store: &dyn NoteStore) -> Result<(), SessionError> {
        self.reload(store)?;
        let mut staged = self.tree.clone();
        let key = staged.keys().location.clone();
        staged.set_property(self.root, &key, &self.current.serialize())?;
        if staged.text() == self.tree.text() {
            return Ok(());
        }
        let revision = store.save(&self.note_key, staged.text())?;
        staged.set_revision(revision);
        self.tree = staged;
        self.root = self
            .tree
            .find_root(&self.document_id)
            .ok_or(SessionError::RootMissing)?;
        Ok(())
    }

    /// Saves `staged`, adopts it and recomputes partition and marks.
    fn commit(&mut self, store: &dyn NoteStore, mut staged: NoteTree) -> Result<(), SessionError> {
        if staged.text() != self.tree.text() {
            let revision = store.save(&self.note_key, staged.text())?;
            staged.set_revision(revision);
        }
        self.tree = staged;
        self.root = self
            .tree
            .find_root(&self.document_id)
            .ok_or(SessionError::RootMissing)?;
        self.recompute()?;
        Ok(())
    }

    /// Reloads the tree when the store revision moved; returns whether it did.
    fn reload(&mut self, store: &dyn NoteStore) -> Result<bool, SessionError> {
        let Some(mut fresh) = self.tree.reloaded(store, &self.note_key)? else {
            return Ok(false);
        };
        let root = fresh
            .find_root(&self.document_id)
            .ok_or(SessionError::RootMissing)?;
        self.tree = fresh;
        self.root = root;
        if let Some(fraction) = self.tree.entry(self.root).reserved.split_fraction {
            self.split_fraction = fraction;
        }
        debug!(
            "event=tree_reload module=session status=ok session={} revision={}",
            self.id,
            self.tree.revision()
        );
        Ok(true)
    }

    fn recompute(&mut self) -> Result<(), LocationError> {
        let order = LocationOrder::with_viewport(self.viewport);
        self.partition = self.tree.partition(self.root, &self.current, &order)?;
        let plan = plan_highlights(&self.tree, self.root, &self.partition, self.adapter.as_ref());
        self.highlights.apply(plan);
        debug!(
            "event=partition module=session status=ok session={} previous={} current={} after={}",
            self.id,
            self.partition.previous.len(),
            self.partition.current.len(),
            self.partition.after.len()
        );
        Ok(())
    }

    fn observe_location(&self) -> Result<Location, SessionError> {
        let location = self.adapter.current_location();
        if location.kind() != self.kind {
            return Err(SessionError::KindMismatch {
                expected: self.kind,
                actual: location.kind(),
            });
        }
        Ok(location)
    }

    fn observe_viewport(&self) -> Option<Viewport> {
        if self.kind.uses_viewport() {
            self.adapter.viewport()
        } else {
            None
        }
    }
}
