//! Mark planning and scoped mark ownership.
//!
//! # Responsibility
//! - Derive note-side and document-side marks from a partition.
//! - Own the marks placed on host surfaces and release them as a set.
//!
//! # Invariants
//! - Every `apply` releases the whole previous mark set before placing the
//!   new one; marks are never patched in place.
//! - Marks never outlive their coordinator.
//! - A remark whose stored hash differs from the live text is skipped,
//!   never shown and never deleted.

use crate::adapter::DocumentAdapter;
use crate::model::entry::EntryId;
use crate::tree::{NoteTree, Partition};
use sha2::{Digest, Sha256};
use std::ops::Range;

/// Visual role of a mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkStyle {
    /// Heading of a note at the current location.
    CurrentNote,
    /// Heading shown when no note exists for the current location.
    NoCurrentNote,
    /// Remarked span in the viewed document.
    Remark,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mark {
    pub range: Range<u64>,
    pub style: MarkStyle,
}

/// Handle of a mark placed on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkId(pub u64);

/// Host capability to place and remove range marks.
pub trait MarkSurface {
    fn add_mark(&mut self, mark: &Mark) -> MarkId;
    fn remove_mark(&mut self, id: MarkId);
}

/// Marks derived from one partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightPlan {
    pub note_marks: Vec<Mark>,
    pub document_marks: Vec<Mark>,
}

impl HighlightPlan {
    pub fn is_empty(&self) -> bool {
        self.note_marks.is_empty() && self.document_marks.is_empty()
    }
}

/// Hex SHA-256 of `text`, the stored remark hash format.
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Computes the marks for `partition` of the children of `root`.
pub fn plan_highlights(
    tree: &NoteTree,
    root: EntryId,
    partition: &Partition,
    adapter: &dyn DocumentAdapter,
) -> HighlightPlan {
    let mut plan = HighlightPlan::default();

    if partition.current.is_empty() {
        let fallback = partition.nearest_previous().unwrap_or(root);
        if let Some(entry) = tree.get(fallback) {
            plan.note_marks
                .push(heading_mark(tree, entry.heading_range.clone(), MarkStyle::NoCurrentNote));
        }
        return plan;
    }

    for &id in &partition.current {
        let Some(entry) = tree.get(id) else {
            continue;
        };
        plan.note_marks
            .push(heading_mark(tree, entry.heading_range.clone(), MarkStyle::CurrentNote));

        let Some(range) = entry.reserved.remark_range else {
            continue;
        };
        let fresh = match entry.reserved.remark_hash.as_deref() {
            None => true,
            Some(stored) => adapter
                .region_text(range)
                .is_some_and(|live| content_hash(&live) == stored),
        };
        if fresh {
            plan.document_marks.push(Mark {
                range: range.begin..range.end,
                style: MarkStyle::Remark,
            });
        }
    }
    plan
}

fn heading_mark(tree: &NoteTree, heading: Range<usize>, style: MarkStyle) -> Mark {
    let end = if tree.text()[heading.clone()].ends_with('\n') {
        heading.end - 1
    } else {
        heading.end
    };
    Mark {
        range: heading.start as u64..end as u64,
        style,
    }
}

/// Owner of the marks one session places on its two surfaces.
pub struct HighlightCoordinator {
    note_surface: Box<dyn MarkSurface>,
    document_surface: Box<dyn MarkSurface>,
    note_marks: Vec<MarkId>,
    document_marks: Vec<MarkId>,
    plan: HighlightPlan,
}

impl HighlightCoordinator {
    pub fn new(note_surface: Box<dyn MarkSurface>, document_surface: Box<dyn MarkSurface>) -> Self {
        Self {
            note_surface,
            document_surface,
            note_marks: Vec::new(),
            document_marks: Vec::new(),
            plan: HighlightPlan::default(),
        }
    }

    /// Replaces the active mark set with `plan`.
    pub fn apply(&mut self, plan: HighlightPlan) {
        self.release();
        self.note_marks = plan
            .note_marks
            .iter()
            .map(|mark| self.note_surface.add_mark(mark))
            .collect();
        self.document_marks = plan
            .document_marks
            .iter()
            .map(|mark| self.document_surface.add_mark(mark))
            .collect();
        self.plan = plan;
    }

    /// Removes every active mark.
    pub fn release(&mut self) {
        for id in self.note_marks.drain(..) {
            self.note_surface.remove_mark(id);
        }
        for id in self.document_marks.drain(..) {
            self.document_surface.remove_mark(id);
        }
        self.plan = HighlightPlan::default();
    }

    /// Marks currently placed.
    pub fn plan(&self) -> &HighlightPlan {
        &self.plan
    }

    pub fn active_count(&self) -> usize {
        self.note_marks.len() + self.document_marks.len()
    }
}

impl Drop for HighlightCoordinator {
    fn drop(&mut self) {
        self.release();
    }
}
