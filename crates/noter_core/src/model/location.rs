//! Location model for paged, ranged and node documents.
//!
//! # Responsibility
//! - Define the tagged location value, one variant per document kind.
//! - Define the equality/ordering relation used to partition notes.
//! - Encode/decode locations as property literals.
//!
//! # Invariants
//! - Comparing locations of different kinds is a contract violation and
//!   returns `LocationError::VariantMismatch`, never a boolean.
//! - For every same-kind pair exactly one of equal/less/greater holds.
//! - Ranged/node equality also depends on the viewport handed to
//!   `LocationOrder`; the viewport is never read from ambient state.

use crate::model::literal::{Literal, PropertyDecodeError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Category of viewable document.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Page-addressed documents (PDF, DjVu).
    Paged,
    /// Scrolling content split into indexed sections (EPUB spine items).
    Ranged,
    /// Node-graph content addressed by node name (help/hypertext trees).
    Node,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paged => "paged",
            Self::Ranged => "ranged",
            Self::Node => "node",
        }
    }

    /// Node-like kinds share one fixed note document.
    pub fn is_node_like(self) -> bool {
        matches!(self, Self::Node)
    }

    /// Whether navigation events are filtered through viewport widening.
    pub fn uses_viewport(self) -> bool {
        !matches!(self, Self::Paged)
    }
}

impl Display for DocumentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visible `[start, end)` offset bounds of a ranged or node document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub start: u64,
    pub end: u64,
}

impl Viewport {
    /// Creates bounds, swapping inverted input.
    pub fn new(start: u64, end: u64) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn contains(&self, offset: u64) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Returns whether these bounds reach past `recorded` on either side.
    pub fn widens(&self, recorded: &Viewport) -> bool {
        self.start < recorded.start || self.end > recorded.end
    }
}

/// Position inside a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    Paged { page: u32 },
    Ranged { index: u32, offset: u64 },
    Node { node: String, offset: u64 },
}

impl Location {
    pub fn paged(page: u32) -> Self {
        Self::Paged { page }
    }

    pub fn ranged(index: u32, offset: u64) -> Self {
        Self::Ranged { index, offset }
    }

    pub fn node(node: impl Into<String>, offset: u64) -> Self {
        Self::Node {
            node: node.into(),
            offset,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Paged { .. } => DocumentKind::Paged,
            Self::Ranged { .. } => DocumentKind::Ranged,
            Self::Node { .. } => DocumentKind::Node,
        }
    }

    /// Returns whether both locations address the same page, section or node.
    ///
    /// Offsets are ignored. Locations of different kinds never share an
    /// anchor.
    pub fn same_anchor(&self, other: &Location) -> bool {
        match (self, other) {
            (Self::Paged { page: left }, Self::Paged { page: right }) => left == right,
            (Self::Ranged { index: left, .. }, Self::Ranged { index: right, .. }) => {
                left == right
            }
            (Self::Node { node: left, .. }, Self::Node { node: right, .. }) => left == right,
            _ => false,
        }
    }

    /// Human-readable label used for default note titles.
    pub fn describe(&self) -> String {
        match self {
            Self::Paged { page } => format!("page {page}"),
            Self::Ranged { index, .. } => format!("section {index}"),
            Self::Node { node, .. } => format!("node {node}"),
        }
    }

    pub fn to_literal(&self) -> Literal {
        match self {
            Self::Paged { page } => Literal::Integer(i128::from(*page)),
            Self::Ranged { index, offset } => Literal::List(vec![
                Literal::Integer(i128::from(*index)),
                Literal::Integer(i128::from(*offset)),
            ]),
            Self::Node { node, offset } => Literal::List(vec![
                Literal::Text(node.clone()),
                Literal::Integer(i128::from(*offset)),
            ]),
        }
    }

    /// Canonical property encoding.
    pub fn serialize(&self) -> String {
        self.to_literal().to_string()
    }

    /// Decodes a location from its property encoding, inferring the kind
    /// from the literal shape.
    pub fn parse(text: &str) -> Result<Self, PropertyDecodeError> {
        let literal = Literal::parse(text)?;
        Self::from_literal(&literal)
    }

    /// Decodes a location and requires it to be of `kind`.
    pub fn parse_for(kind: DocumentKind, text: &str) -> Result<Self, PropertyDecodeError> {
        let literal = Literal::parse(text)?;
        Self::from_literal_for(kind, &literal)
    }

    pub fn from_literal(literal: &Literal) -> Result<Self, PropertyDecodeError> {
        match literal {
            Literal::Integer(_) => Self::from_literal_for(DocumentKind::Paged, literal),
            Literal::List(items) if matches!(items.first(), Some(Literal::Text(_))) => {
                Self::from_literal_for(DocumentKind::Node, literal)
            }
            Literal::List(_) => Self::from_literal_for(DocumentKind::Ranged, literal),
            other => Err(PropertyDecodeError::unexpected(
                &other.to_string(),
                "a location",
            )),
        }
    }

    pub fn from_literal_for(
        kind: DocumentKind,
        literal: &Literal,
    ) -> Result<Self, PropertyDecodeError> {
        let rendered = || literal.to_string();
        match kind {
            DocumentKind::Paged => literal
                .as_integer()
                .and_then(|value| u32::try_from(value).ok())
                .map(Self::paged)
                .ok_or_else(|| PropertyDecodeError::unexpected(&rendered(), "a page number")),
            DocumentKind::Ranged => match literal.as_list() {
                Some([index, offset]) => {
                    let index = index.as_integer().and_then(|v| u32::try_from(v).ok());
                    let offset = offset.as_integer().and_then(|v| u64::try_from(v).ok());
                    match (index, offset) {
                        (Some(index), Some(offset)) => Ok(Self::ranged(index, offset)),
                        _ => Err(PropertyDecodeError::unexpected(
                            &rendered(),
                            "an (index offset) pair",
                        )),
                    }
                }
                _ => Err(PropertyDecodeError::unexpected(
                    &rendered(),
                    "an (index offset) pair",
                )),
            },
            DocumentKind::Node => match literal.as_list() {
                Some([node, offset]) => {
                    let offset = offset.as_integer().and_then(|v| u64::try_from(v).ok());
                    match (node.as_text(), offset) {
                        (Some(node), Some(offset)) if !node.is_empty() => {
                            Ok(Self::node(node, offset))
                        }
                        _ => Err(PropertyDecodeError::unexpected(
                            &rendered(),
                            "a (\"node\" offset) pair",
                        )),
                    }
                }
                _ => Err(PropertyDecodeError::unexpected(
                    &rendered(),
                    "a (\"node\" offset) pair",
                )),
            },
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_literal())
    }
}

/// Internal contract error for location comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationError {
    /// Two locations of different kinds were compared.
    VariantMismatch {
        left: DocumentKind,
        right: DocumentKind,
    },
}

impl Display for LocationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VariantMismatch { left, right } => {
                write!(f, "cannot compare {left} location with {right} location")
            }
        }
    }
}

impl Error for LocationError {}

/// Comparator over locations, carrying the viewport that ranged and node
/// equality depend on.
///
/// Without a viewport, equality is exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationOrder {
    viewport: Option<Viewport>,
}

impl LocationOrder {
    pub fn exact() -> Self {
        Self { viewport: None }
    }

    pub fn within(viewport: Viewport) -> Self {
        Self {
            viewport: Some(viewport),
        }
    }

    pub fn with_viewport(viewport: Option<Viewport>) -> Self {
        Self { viewport }
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Orders `left` relative to `right`.
    ///
    /// - Paged: by page number.
    /// - Ranged: equal when both offsets of one index are visible, else by
    ///   `(index, offset)`.
    /// - Node: equal when both offsets of one node are visible, else by
    ///   offset. Node names only break offset ties so distinct nodes are
    ///   never equal; callers must not rely on cross-node order.
    pub fn compare(&self, left: &Location, right: &Location) -> Result<Ordering, LocationError> {
        match (left, right) {
            (Location::Paged { page: l }, Location::Paged { page: r }) => Ok(l.cmp(r)),
            (
                Location::Ranged {
                    index: li,
                    offset: lo,
                },
                Location::Ranged {
                    index: ri,
                    offset: ro,
                },
            ) => {
                if li == ri && self.both_visible(*lo, *ro) {
                    return Ok(Ordering::Equal);
                }
                Ok((li, lo).cmp(&(ri, ro)))
            }
            (
                Location::Node {
                    node: ln,
                    offset: lo,
                },
                Location::Node {
                    node: rn,
                    offset: ro,
                },
            ) => {
                if ln == rn && self.both_visible(*lo, *ro) {
                    return Ok(Ordering::Equal);
                }
                Ok(lo.cmp(ro).then_with(|| ln.cmp(rn)))
            }
            _ => Err(LocationError::VariantMismatch {
                left: left.kind(),
                right: right.kind(),
            }),
        }
    }

    pub fn equal(&self, left: &Location, right: &Location) -> Result<bool, LocationError> {
        Ok(self.compare(left, right)? == Ordering::Equal)
    }

    pub fn less_than(&self, left: &Location, right: &Location) -> Result<bool, LocationError> {
        Ok(self.compare(left, right)? == Ordering::Less)
    }

    pub fn greater_than(&self, left: &Location, right: &Location) -> Result<bool, LocationError> {
        Ok(self.compare(left, right)? == Ordering::Greater)
    }

    fn both_visible(&self, left: u64, right: u64) -> bool {
        self.viewport
            .is_some_and(|viewport| viewport.contains(left) && viewport.contains(right))
    }
}
