//! Outline parser for note documents.
//!
//! # Responsibility
//! - Split note text into headings, property drawers and body spans.
//! - Decode reserved property values, recovering from malformed literals.
//!
//! # Invariants
//! - Entries are produced in document order; `EntryId` equals arena index.
//! - A property drawer is recognized only on the line right after a heading.
//! - Structural errors abort the parse; value errors only produce warnings.

use crate::model::entry::{
    Drawer, EntryId, NoteEntry, Properties, PropertyKeys, PropertyLine, RemarkRange,
    ReservedValues,
};
use crate::model::literal::{Literal, PropertyDecodeError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\*+)[ \t]+(.*?)[ \t]*$").expect("valid heading regex"));
static DRAWER_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[ \t]*:PROPERTIES:[ \t]*$").expect("valid drawer regex"));
static DRAWER_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[ \t]*:END:[ \t]*$").expect("valid drawer end regex"));
static PROPERTY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*:([^:\s]+):(?:[ \t]+(.*?))?[ \t]*$").expect("valid property regex")
});

/// Whether `line` opens or closes a property drawer.
pub(super) fn is_drawer_delimiter(line: &str) -> bool {
    let line = line.trim_end_matches(['\n', '\r']);
    DRAWER_OPEN_RE.is_match(line) || DRAWER_END_RE.is_match(line)
}

/// Structural failure while parsing a note document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-based line number where the problem was detected.
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// `:PROPERTIES:` without a matching `:END:`.
    UnterminatedDrawer,
    /// A line inside a drawer that is not `:KEY: value`.
    MalformedDrawerLine(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ParseErrorKind::UnterminatedDrawer => {
                write!(f, "line {}: property drawer is never closed", self.line)
            }
            ParseErrorKind::MalformedDrawerLine(line) => {
                write!(f, "line {}: invalid property line `{line}`", self.line)
            }
        }
    }
}

impl Error for ParseError {}

/// Property value that was dropped during load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyWarning {
    /// Byte offset of the property line.
    pub offset: usize,
    pub key: String,
    pub error: PropertyDecodeError,
}

#[derive(Debug)]
pub(crate) struct ParsedOutline {
    pub entries: Vec<NoteEntry>,
    pub top_level: Vec<EntryId>,
    pub warnings: Vec<PropertyWarning>,
}

struct OpenDrawer {
    entry: EntryId,
    start: usize,
    line: usize,
    properties: Properties,
}

pub(crate) fn parse_outline(text: &str, keys: &PropertyKeys) -> Result<ParsedOutline, ParseError> {
    let mut entries: Vec<NoteEntry> = Vec::new();
    let mut top_level = Vec::new();
    let mut warnings = Vec::new();
    let mut ancestors: Vec<EntryId> = Vec::new();
    let mut drawer: Option<OpenDrawer> = None;
    let mut after_heading = false;
    let mut offset = 0;

    for (index, raw) in text.split_inclusive('\n').enumerate() {
        let line_no = index + 1;
        let start = offset;
        let end = offset + raw.len();
        offset = end;
        let line = raw.trim_end_matches(['\n', '\r']);

        if let Some(open) = drawer.as_mut() {
            if DRAWER_END_RE.is_match(line) {
                if let Some(open) = drawer.take() {
                    close_drawer(&mut entries, open, start, end, keys, &mut warnings);
                }
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }
            if HEADING_RE.is_match(line) {
                return Err(ParseError {
                    line: open.line,
                    kind: ParseErrorKind::UnterminatedDrawer,
                });
            }
            let Some(caps) = PROPERTY_RE.captures(line) else {
                return Err(ParseError {
                    line: line_no,
                    kind: ParseErrorKind::MalformedDrawerLine(line.to_string()),
                });
            };
            open.properties.push(PropertyLine {
                key: caps[1].to_string(),
                value: caps.get(2).map_or("", |m| m.as_str()).to_string(),
                line_range: start..end,
            });
            continue;
        }

        if let Some(caps) = HEADING_RE.captures(line) {
            let level = caps[1].len();
            if let Some(previous) = entries.last_mut() {
                previous.body_range.end = start;
            }
            while let Some(&top) = ancestors.last() {
                if entries[top.0].level < level {
                    break;
                }
                entries[top.0].subtree_end = start;
                ancestors.pop();
            }

            let id = EntryId(entries.len());
            let parent = ancestors.last().copied();
            match parent {
                Some(parent) => entries[parent.0].children.push(id),
                None => top_level.push(id),
            }
            entries.push(NoteEntry {
                id,
                parent,
                children: Vec::new(),
                level,
                title: caps.get(2).map_or("", |m| m.as_str()).to_string(),
                properties: Properties::default(),
                reserved: ReservedValues::default(),
                heading_range: start..end,
                drawer: None,
                body_range: end..end,
                subtree_end: end,
            });
            ancestors.push(id);
            after_heading = true;
            continue;
        }

        if after_heading && DRAWER_OPEN_RE.is_match(line) {
            if let Some(&entry) = ancestors.last() {
                drawer = Some(OpenDrawer {
                    entry,
                    start,
                    line: line_no,
                    properties: Properties::default(),
                });
            }
        }
        after_heading = false;
    }

    if let Some(open) = drawer {
        return Err(ParseError {
            line: open.line,
            kind: ParseErrorKind::UnterminatedDrawer,
        });
    }

    let text_end = text.len();
    if let Some(last) = entries.last_mut() {
        last.body_range.end = text_end;
    }
    for id in ancestors {
        entries[id.0].subtree_end = text_end;
    }

    Ok(ParsedOutline {
        entries,
        top_level,
        warnings,
    })
}

fn close_drawer(
    entries: &mut [NoteEntry],
    open: OpenDrawer,
    end_line_start: usize,
    end: usize,
    keys: &PropertyKeys,
    warnings: &mut Vec<PropertyWarning>,
) {
    let entry = &mut entries[open.entry.0];
    entry.reserved = decode_reserved(&open.properties, keys, warnings);
    entry.properties = open.properties;
    entry.drawer = Some(Drawer {
        range: open.start..end,
        end_line_start,
    });
}

fn decode_reserved(
    properties: &Properties,
    keys: &PropertyKeys,
    warnings: &mut Vec<PropertyWarning>,
) -> ReservedValues {
    let mut read = |key: &str| -> Option<(Literal, usize)> {
        let line = properties.line(key)?;
        match Literal::parse(&line.value) {
            Ok(literal) => Some((literal, line.line_range.start)),
            Err(error) => {
                warnings.push(PropertyWarning {
                    offset: line.line_range.start,
                    key: line.key.clone(),
                    error,
                });
                None
            }
        }
    };

    let document = read(&keys.document);
    let location = read(&keys.location).map(|(literal, _)| literal);
    let remark_range = read(&keys.remark_range);
    let remark_hash = read(&keys.remark_hash);
    let split_fraction = read(&keys.split_fraction);

    let mut shaped = |key: &str, offset: usize, error: PropertyDecodeError| {
        warnings.push(PropertyWarning {
            offset,
            key: key.to_string(),
            error,
        });
    };

    let document_id = document.and_then(|(literal, offset)| match literal {
        Literal::Text(value) if !value.trim().is_empty() => Some(value),
        Literal::Integer(value) => Some(value.to_string()),
        other => {
            shaped(
                &keys.document,
                offset,
                PropertyDecodeError::unexpected(&other.to_string(), "a document identifier"),
            );
            None
        }
    });
    let remark_range =
        remark_range.and_then(|(literal, offset)| match RemarkRange::from_literal(&literal) {
            Ok(range) => Some(range),
            Err(error) => {
                shaped(&keys.remark_range, offset, error);
                None
            }
        });
    let remark_hash = remark_hash.and_then(|(literal, offset)| match literal {
        Literal::Text(value) if !value.is_empty() => Some(value.to_ascii_lowercase()),
        other => {
            shaped(
                &keys.remark_hash,
                offset,
                PropertyDecodeError::unexpected(&other.to_string(), "a content hash"),
            );
            None
        }
    });
    let split_fraction = split_fraction.and_then(|(literal, offset)| {
        match literal.as_decimal().filter(|value| *value > 0.0 && *value < 1.0) {
            Some(value) => Some(value),
            None => {
                shaped(
                    &keys.split_fraction,
                    offset,
                    PropertyDecodeError::unexpected(
                        &literal.to_string(),
                        "a fraction between 0 and 1",
                    ),
                );
                None
            }
        }
    });

    ReservedValues {
        document_id,
        location,
        remark_range,
        remark_hash,
        split_fraction,
    }
}
