//! Mapping from viewed documents to note documents.

use super::NoteKey;
use crate::config::NoterConfig;
use crate::model::location::DocumentKind;
use std::path::Path;

/// Picks the note document for a viewed document.
///
/// Node-like kinds share one fixed note document; every other document gets
/// its own, named after the document without its extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSourceResolver {
    node_notes_key: String,
    notes_suffix: String,
}

impl NoteSourceResolver {
    pub fn new(node_notes_key: impl Into<String>, notes_suffix: impl Into<String>) -> Self {
        Self {
            node_notes_key: node_notes_key.into(),
            notes_suffix: notes_suffix.into(),
        }
    }

    pub fn from_config(config: &NoterConfig) -> Self {
        Self::new(config.node_notes_key.as_str(), config.notes_suffix.as_str())
    }

    pub fn resolve(&self, document_id: &str, kind: DocumentKind) -> NoteKey {
        if kind.is_node_like() {
            return NoteKey::new(self.node_notes_key.as_str());
        }
        let stem = Path::new(document_id).with_extension("");
        let mut key = stem.to_string_lossy().into_owned();
        if key.is_empty() {
            key = document_id.to_string();
        }
        key.push_str(&self.notes_suffix);
        NoteKey::new(key)
    }
}
