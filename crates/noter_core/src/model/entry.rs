//! Note entry model.
//!
//! # Responsibility
//! - Describe one parsed heading of the note document with its text spans.
//! - Hold raw properties plus the decoded values of reserved keys.
//!
//! # Invariants
//! - Byte ranges refer to the note text of the tree revision that produced
//!   the entry; they are invalid after any edit.
//! - Unknown property keys are preserved verbatim and otherwise ignored.

use crate::model::literal::{Literal, PropertyDecodeError};
use crate::model::location::{DocumentKind, Location};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Index of one entry inside a parsed `NoteTree`.
///
/// Valid only for the tree revision it was obtained from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) usize);

impl EntryId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Property keys reserved per semantic role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyKeys {
    /// Owning-document identifier, set on root entries.
    pub document: String,
    /// Serialized `Location`.
    pub location: String,
    /// Serialized `(begin end)` remark range.
    pub remark_range: String,
    /// Hex content hash of the remarked span.
    pub remark_hash: String,
    /// Decimal split-fraction override, set on root entries.
    pub split_fraction: String,
}

impl Default for PropertyKeys {
    fn default() -> Self {
        Self {
            document: "NOTER_DOCUMENT".to_string(),
            location: "NOTER_PAGE".to_string(),
            remark_range: "NOTER_REMARK_RANGE".to_string(),
            remark_hash: "NOTER_REMARK_HASH".to_string(),
            split_fraction: "NOTER_SPLIT_FRACTION".to_string(),
        }
    }
}

impl PropertyKeys {
    /// Returns `(role, key)` pairs in a stable order.
    pub fn roles(&self) -> [(&'static str, &str); 5] {
        [
            ("document", self.document.as_str()),
            ("location", self.location.as_str()),
            ("remark_range", self.remark_range.as_str()),
            ("remark_hash", self.remark_hash.as_str()),
            ("split_fraction", self.split_fraction.as_str()),
        ]
    }
}

/// Span of source-document text a note remarks on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RemarkRange {
    pub begin: u64,
    pub end: u64,
}

impl RemarkRange {
    pub fn new(begin: u64, end: u64) -> Self {
        Self {
            begin: begin.min(end),
            end: begin.max(end),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    pub fn serialize(&self) -> String {
        Literal::List(vec![
            Literal::Integer(i128::from(self.begin)),
            Literal::Integer(i128::from(self.end)),
        ])
        .to_string()
    }

    pub fn from_literal(literal: &Literal) -> Result<Self, PropertyDecodeError> {
        if let Some([begin, end]) = literal.as_list() {
            let begin = begin.as_integer().and_then(|v| u64::try_from(v).ok());
            let end = end.as_integer().and_then(|v| u64::try_from(v).ok());
            if let (Some(begin), Some(end)) = (begin, end) {
                if begin <= end {
                    return Ok(Self { begin, end });
                }
            }
        }
        Err(PropertyDecodeError::unexpected(
            &literal.to_string(),
            "a (begin end) range",
        ))
    }
}

/// One `:KEY: value` line of a property drawer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyLine {
    pub key: String,
    pub value: String,
    /// Full line span, including the trailing newline when present.
    pub line_range: Range<usize>,
}

/// Ordered raw properties of one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    lines: Vec<PropertyLine>,
}

impl Properties {
    pub(crate) fn push(&mut self, line: PropertyLine) {
        self.lines.push(line);
    }

    /// Returns the raw value for `key` (case-insensitive, last line wins).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.line(key).map(|line| line.value.as_str())
    }

    pub fn line(&self, key: &str) -> Option<&PropertyLine> {
        self.lines
            .iter()
            .rev()
            .find(|line| line.key.eq_ignore_ascii_case(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Location of the property drawer inside the note text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drawer {
    /// From the `:PROPERTIES:` line start to the end of the `:END:` line.
    pub range: Range<usize>,
    /// Start offset of the `:END:` line.
    pub end_line_start: usize,
}

/// Decoded values of the reserved property keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservedValues {
    pub document_id: Option<String>,
    pub location: Option<Literal>,
    pub remark_range: Option<RemarkRange>,
    pub remark_hash: Option<String>,
    pub split_fraction: Option<f64>,
}

/// One heading of the note document.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEntry {
    pub id: EntryId,
    pub parent: Option<EntryId>,
    pub children: Vec<EntryId>,
    /// Number of leading stars.
    pub level: usize,
    pub title: String,
    pub properties: Properties,
    pub reserved: ReservedValues,
    /// Heading line, including its newline when present.
    pub heading_range: Range<usize>,
    pub drawer: Option<Drawer>,
    /// Text owned by this entry alone: after the heading line up to the next
    /// heading of any level.
    pub body_range: Range<usize>,
    /// End of this entry including all descendants.
    pub subtree_end: usize,
}

impl NoteEntry {
    /// Decodes the stored location for a document of `kind`.
    ///
    /// Returns `None` when the property is absent or encodes another kind.
    pub fn location_for(&self, kind: DocumentKind) -> Option<Location> {
        let literal = self.reserved.location.as_ref()?;
        Location::from_literal_for(kind, literal).ok()
    }

    pub fn document_id(&self) -> Option<&str> {
        self.reserved.document_id.as_deref()
    }

    pub fn subtree_range(&self) -> Range<usize> {
        self.heading_range.start..self.subtree_end
    }

    /// Offset right after the heading line and its property drawer.
    pub fn content_start(&self) -> usize {
        self.drawer
            .as_ref()
            .map_or(self.heading_range.end, |drawer| drawer.range.end)
    }

    pub fn contains_offset(&self, offset: usize) -> bool {
        self.heading_range.start <= offset && offset < self.subtree_end
    }
}
