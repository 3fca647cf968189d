//! In-process note store.

use super::{NoteDocument, NoteKey, NoteStore, StoreResult};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Note store kept in memory, for tests and one-shot tools.
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    documents: RefCell<BTreeMap<NoteKey, (String, u64)>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a store with one document at revision 1.
    pub fn with_document(key: NoteKey, text: impl Into<String>) -> Self {
        let store = Self::new();
        store.documents.borrow_mut().insert(key, (text.into(), 1));
        store
    }

    pub fn keys(&self) -> Vec<NoteKey> {
        self.documents.borrow().keys().cloned().collect()
    }
}

impl NoteStore for MemoryNoteStore {
    fn revision(&self, key: &NoteKey) -> StoreResult<Option<u64>> {
        Ok(self.documents.borrow().get(key).map(|(_, revision)| *revision))
    }

    fn load(&self, key: &NoteKey) -> StoreResult<Option<NoteDocument>> {
        Ok(self
            .documents
            .borrow()
            .get(key)
            .map(|(text, revision)| NoteDocument {
                key: key.clone(),
                text: text.clone(),
                revision: *revision,
            }))
    }

    fn save(&self, key: &NoteKey, text: &str) -> StoreResult<u64> {
        let mut documents = self.documents.borrow_mut();
        let slot = documents.entry(key.clone()).or_insert((String::new(), 0));
        slot.0 = text.to_string();
        slot.1 += 1;
        Ok(slot.1)
    }
}
