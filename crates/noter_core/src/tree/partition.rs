//! Classification of annotated entries relative to a location.

use super::NoteTree;
use crate::model::entry::EntryId;
use crate::model::location::{Location, LocationError, LocationOrder};
use std::cmp::Ordering;

/// Direct annotated children of a root, split around one location.
///
/// `previous` and `after` are ordered nearest first; navigation always
/// takes their heads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub previous: Vec<EntryId>,
    pub current: Vec<EntryId>,
    pub after: Vec<EntryId>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.previous.len() + self.current.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.previous.contains(&id) || self.current.contains(&id) || self.after.contains(&id)
    }

    pub fn nearest_previous(&self) -> Option<EntryId> {
        self.previous.first().copied()
    }

    pub fn nearest_after(&self) -> Option<EntryId> {
        self.after.first().copied()
    }

    pub fn first_current(&self) -> Option<EntryId> {
        self.current.first().copied()
    }
}

impl NoteTree {
    /// Splits the children of `root` that sit exactly one level deeper than
    /// `root` into previous/current/after relative to `current`.
    ///
    /// Children without a location decodable for `current`'s kind are left
    /// out of all three lists; for node documents so are children stored on
    /// another node, since offsets of distinct nodes are not comparable.
    ///
    /// # Errors
    /// - `LocationError` only on a comparator contract violation.
    pub fn partition(
        &self,
        root: EntryId,
        current: &Location,
        order: &LocationOrder,
    ) -> Result<Partition, LocationError> {
        let mut partition = Partition::default();
        let Some(root_entry) = self.get(root) else {
            return Ok(partition);
        };
        let kind = current.kind();
        let target_level = root_entry.level + 1;

        for &child in &root_entry.children {
            let entry = self.entry(child);
            if entry.level != target_level {
                continue;
            }
            let Some(location) = entry.location_for(kind) else {
                continue;
            };
            if matches!(location, Location::Node { .. }) && !location.same_anchor(current) {
                continue;
            }
            match order.compare(&location, current)? {
                Ordering::Less => partition.previous.push(child),
                Ordering::Equal => partition.current.push(child),
                Ordering::Greater => partition.after.push(child),
            }
        }

        partition.previous.reverse();
        Ok(partition)
    }
}
