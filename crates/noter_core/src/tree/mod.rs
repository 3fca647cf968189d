//! Parsed note document with cached lookups and text edits.
//!
//! # Responsibility
//! - Parse a note document into an arena of `NoteEntry` values.
//! - Cache the parse and root lookups per modification counter.
//! - Apply the few edits the engine performs (insert, append, property
//!   write) by rewriting text and reparsing.
//!
//! # Invariants
//! - `revision` mirrors the note store's modification counter for the text
//!   this tree was built from.
//! - A failed edit leaves the tree unchanged.
//! - Entry ids are invalidated by every successful edit or reload.

mod edit;
mod parse;
mod partition;

pub use edit::NewEntry;
pub use parse::{ParseError, ParseErrorKind, PropertyWarning};
pub use partition::Partition;

use crate::model::entry::{EntryId, NoteEntry, PropertyKeys};
use crate::model::literal::Literal;
use crate::store::{NoteKey, NoteStore, StoreError};
use log::{debug, warn};
use parse::parse_outline;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::Range;

/// Errors from tree loading and editing.
#[derive(Debug)]
pub enum TreeError {
    Parse(ParseError),
    Store(StoreError),
    /// Edit offset is past the end of the text or splits a character.
    InvalidOffset(usize),
    /// Entry id does not belong to this tree revision.
    UnknownEntry(EntryId),
    /// An edit reparsed without producing the expected heading.
    InconsistentEdit(&'static str),
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::InvalidOffset(offset) => write!(f, "invalid note text offset: {offset}"),
            Self::UnknownEntry(id) => write!(f, "unknown note entry: {}", id.index()),
            Self::InconsistentEdit(details) => write!(f, "inconsistent note edit: {details}"),
        }
    }
}

impl Error for TreeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for TreeError {
    fn from(value: ParseError) -> Self {
        Self::Parse(value)
    }
}

impl From<StoreError> for TreeError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Parsed note document.
#[derive(Debug, Clone)]
pub struct NoteTree {
    text: String,
    revision: u64,
    keys: PropertyKeys,
    entries: Vec<NoteEntry>,
    top_level: Vec<EntryId>,
    warnings: Vec<PropertyWarning>,
    roots: HashMap<String, Option<EntryId>>,
}

impl NoteTree {
    /// Parses `text` as the note document at `revision`.
    ///
    /// # Errors
    /// - `ParseError` when the outline structure is invalid. Malformed
    ///   property values are recorded in `warnings()` instead.
    pub fn load(
        text: impl Into<String>,
        revision: u64,
        keys: &PropertyKeys,
    ) -> Result<Self, ParseError> {
        let text = text.into();
        let parsed = parse_outline(&text, keys)?;
        for warning in &parsed.warnings {
            warn!(
                "event=property_decode module=tree status=recovered key={} offset={} error={}",
                warning.key, warning.offset, warning.error
            );
        }
        debug!(
            "event=tree_load module=tree status=ok revision={} entries={} bytes={}",
            revision,
            parsed.entries.len(),
            text.len()
        );
        Ok(Self {
            text,
            revision,
            keys: keys.clone(),
            entries: parsed.entries,
            top_level: parsed.top_level,
            warnings: parsed.warnings,
            roots: HashMap::new(),
        })
    }

    /// Loads the note document stored under `key`; a missing document
    /// yields an empty tree at revision 0.
    pub fn open(
        store: &dyn NoteStore,
        key: &NoteKey,
        keys: &PropertyKeys,
    ) -> Result<Self, TreeError> {
        match store.load(key)? {
            Some(document) => Ok(Self::load(document.text, document.revision, keys)?),
            None => Ok(Self::load(String::new(), 0, keys)?),
        }
    }

    /// Reparses from `store` only when its modification counter moved.
    ///
    /// Returns `None` when this tree is still current.
    pub fn reloaded(&self, store: &dyn NoteStore, key: &NoteKey) -> Result<Option<Self>, TreeError> {
        let revision = store.revision(key)?.unwrap_or(0);
        if revision == self.revision {
            return Ok(None);
        }
        Self::open(store, key, &self.keys).map(Some)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Records the counter assigned by the store after saving this text.
    pub fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    pub fn keys(&self) -> &PropertyKeys {
        &self.keys
    }

    pub fn warnings(&self) -> &[PropertyWarning] {
        &self.warnings
    }

    /// Entries in document order.
    pub fn entries(&self) -> &[NoteEntry] {
        &self.entries
    }

    pub fn top_level(&self) -> &[EntryId] {
        &self.top_level
    }

    pub fn get(&self, id: EntryId) -> Option<&NoteEntry> {
        self.entries.get(id.0)
    }

    /// Returns the entry for `id`.
    ///
    /// # Panics
    /// - When `id` does not come from this tree revision.
    pub fn entry(&self, id: EntryId) -> &NoteEntry {
        &self.entries[id.0]
    }

    /// Finds the entry whose document-id property equals `document_id`.
    ///
    /// The first match in document order wins. Lookups are cached until the
    /// next reload or edit.
    pub fn find_root(&mut self, document_id: &str) -> Option<EntryId> {
        if let Some(cached) = self.roots.get(document_id) {
            return *cached;
        }
        let found = self
            .entries
            .iter()
            .find(|entry| entry.document_id() == Some(document_id))
            .map(|entry| entry.id);
        self.roots.insert(document_id.to_string(), found);
        found
    }

    /// Returns the child of `root`, one level deeper than `root`, whose
    /// subtree encloses `offset`.
    pub fn enclosing_child(&self, root: EntryId, offset: usize) -> Option<EntryId> {
        let root_entry = self.get(root)?;
        let target_level = root_entry.level + 1;
        let offset = offset.min(self.text.len().saturating_sub(1));
        let mut cursor = self
            .entries
            .iter()
            .rev()
            .find(|entry| entry.contains_offset(offset))?
            .id;
        loop {
            let entry = self.entry(cursor);
            if entry.parent == Some(root) && entry.level == target_level {
                return Some(cursor);
            }
            cursor = entry.parent?;
        }
    }

    /// Inserts `new_entry` at `anchor` as a child of `root`, one level deeper
    /// than `root`, and returns the id of the new heading.
    pub fn insert(
        &mut self,
        root: EntryId,
        anchor: usize,
        new_entry: &NewEntry,
    ) -> Result<EntryId, TreeError> {
        let level = self.checked(root)?.level + 1;
        self.ensure_offset(anchor)?;
        let mut insertion = self.line_break_before(anchor).to_string();
        let heading_start = anchor + insertion.len();
        insertion.push_str(&new_entry.render(level));
        self.splice(anchor..anchor, &insertion)?;
        self.heading_at(heading_start)
            .ok_or(TreeError::InconsistentEdit("inserted heading not found"))
    }

    /// Appends `body` to the text owned by `id`, before any child heading.
    ///
    /// Returns the offset right after the appended text.
    pub fn append_body(&mut self, id: EntryId, body: &str) -> Result<usize, TreeError> {
        let at = self.checked(id)?.body_range.end;
        let mut insertion = self.line_break_before(at).to_string();
        insertion.push_str(&edit::escape_body(body));
        let heading_count = self.entries.len();
        self.splice(at..at, &insertion)?;
        if self.entries.len() != heading_count {
            return Err(TreeError::InconsistentEdit("appended body created a heading"));
        }
        Ok(at + insertion.len())
    }

    /// Writes `key: value` into the property drawer of `id`, replacing an
    /// existing line for `key` or creating the drawer.
    pub fn set_property(&mut self, id: EntryId, key: &str, value: &str) -> Result<(), TreeError> {
        let entry = self.checked(id)?;
        let line = format!(":{key}: {value}\n");
        let (range, replacement) = match (&entry.drawer, entry.properties.line(key)) {
            (Some(_), Some(existing)) => {
                let range = existing.line_range.clone();
                let mut replacement = line;
                if !self.text[range.clone()].ends_with('\n') {
                    replacement.pop();
                }
                (range, replacement)
            }
            (Some(drawer), None) => (drawer.end_line_start..drawer.end_line_start, line),
            (None, _) => {
                let at = entry.heading_range.end;
                let mut insertion = self.line_break_before(at).to_string();
                insertion.push_str(":PROPERTIES:\n");
                insertion.push_str(&line);
                insertion.push_str(":END:\n");
                (at..at, insertion)
            }
        };
        self.splice(range, &replacement)
    }

    /// Appends a top-level root entry owned by `document_id`.
    pub fn append_root(&mut self, title: &str, document_id: &str) -> Result<EntryId, TreeError> {
        let at = self.text.len();
        let mut insertion = self.line_break_before(at).to_string();
        let heading_start = at + insertion.len();
        let root = NewEntry::new(title).with_property(
            &self.keys.document,
            Literal::Text(document_id.to_string()).to_string(),
        );
        insertion.push_str(&root.render(1));
        self.splice(at..at, &insertion)?;
        self.heading_at(heading_start)
            .ok_or(TreeError::InconsistentEdit("root heading not found"))
    }

    fn checked(&self, id: EntryId) -> Result<&NoteEntry, TreeError> {
        self.get(id).ok_or(TreeError::UnknownEntry(id))
    }

    fn ensure_offset(&self, offset: usize) -> Result<(), TreeError> {
        if offset > self.text.len() || !self.text.is_char_boundary(offset) {
            return Err(TreeError::InvalidOffset(offset));
        }
        Ok(())
    }

    fn line_break_before(&self, offset: usize) -> &'static str {
        if offset == 0 || self.text[..offset].ends_with('\n') {
            ""
        } else {
            "\n"
        }
    }

    fn heading_at(&self, start: usize) -> Option<EntryId> {
        self.entries
            .iter()
            .find(|entry| entry.heading_range.start == start)
            .map(|entry| entry.id)
    }

    fn splice(&mut self, range: Range<usize>, replacement: &str) -> Result<(), TreeError> {
        self.ensure_offset(range.start)?;
        self.ensure_offset(range.end)?;
        let mut text = String::with_capacity(self.text.len() + replacement.len());
        text.push_str(&self.text[..range.start]);
        text.push_str(replacement);
        text.push_str(&self.text[range.end..]);

        let parsed = parse_outline(&text, &self.keys)?;
        self.text = text;
        self.entries = parsed.entries;
        self.top_level = parsed.top_level;
        self.warnings = parsed.warnings;
        self.roots.clear();
        Ok(())
    }
}
