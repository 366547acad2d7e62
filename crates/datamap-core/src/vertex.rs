//! Vertex kinds for the datamap schema graph.
//!
//! A vertex is one of five closed kinds. Only [`VertexKind::Identifier`] may
//! be the source of an edge; every other kind is a leaf that constrains the
//! literal values an attribute may hold.
use std::fmt;

use petgraph::graph::NodeIndex;
use serde::{Serialize, Serializer};

/// Dense, zero-based vertex identity: the petgraph [`NodeIndex`] of the
/// vertex in the store.
///
/// Ids are reassigned by [`SchemaGraph::reduce`](crate::graph::SchemaGraph::reduce).
/// An id obtained before a compaction call must not be used after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(pub(crate) NodeIndex);

impl VertexId {
    /// Wraps a raw slot index.
    pub fn new(index: usize) -> Self {
        Self(NodeIndex::new(index))
    }

    /// Returns the slot index backing this id.
    pub fn index(self) -> usize {
        self.0.index()
    }
}

impl From<NodeIndex> for VertexId {
    fn from(node: NodeIndex) -> Self {
        Self(node)
    }
}

impl From<VertexId> for NodeIndex {
    fn from(id: VertexId) -> Self {
        id.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.index())
    }
}

impl Serialize for VertexId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.index() as u64)
    }
}

/// Marks one occupant of a vertex slot.
///
/// Every vertex placed into the store receives a fresh stamp. Edge handles
/// cache the stamp of the occupant they were attached to, which is how
/// [`SchemaGraph::resolve`](crate::graph::SchemaGraph::resolve) detects
/// handles that still point at a replaced vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexStamp(pub(crate) u64);

/// Inclusive integer bounds. `None` on either side means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IntegerRange {
    /// Smallest accepted value, or `None` for no lower bound.
    pub low: Option<i64>,
    /// Largest accepted value, or `None` for no upper bound.
    pub high: Option<i64>,
}

impl IntegerRange {
    /// A range with no bounds on either side.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Returns `true` if `value` lies within the bounds.
    pub fn contains(&self, value: i64) -> bool {
        self.low.is_none_or(|low| value >= low) && self.high.is_none_or(|high| value <= high)
    }
}

/// Inclusive floating-point bounds. `None` on either side means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FloatRange {
    /// Smallest accepted value, or `None` for no lower bound.
    pub low: Option<f64>,
    /// Largest accepted value, or `None` for no upper bound.
    pub high: Option<f64>,
}

impl FloatRange {
    /// A range with no bounds on either side.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Returns `true` if `value` lies within the bounds.
    ///
    /// `NaN` is never contained.
    pub fn contains(&self, value: f64) -> bool {
        !value.is_nan()
            && self.low.is_none_or(|low| value >= low)
            && self.high.is_none_or(|high| value <= high)
    }
}

/// The payload-carrying kind of a schema vertex.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VertexKind {
    /// A structural node that may carry named outgoing edges.
    Identifier,
    /// A finite, ordered set of accepted literal strings.
    Enumeration {
        /// Accepted literals in declaration order.
        values: Vec<String>,
    },
    /// Integer values within inclusive bounds.
    IntegerRange(IntegerRange),
    /// Floating-point values within inclusive bounds.
    FloatRange(FloatRange),
    /// Any literal string.
    StringValue,
}

impl VertexKind {
    /// Builds an [`VertexKind::Enumeration`] from any iterator of literals.
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enumeration {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` only for [`VertexKind::Identifier`].
    pub fn allows_emanating_edges(&self) -> bool {
        matches!(self, Self::Identifier)
    }

    /// Returns `true` if a literal value token fits this vertex.
    ///
    /// Identifiers never accept a literal. Float ranges accept integer
    /// literals as well as decimal ones.
    pub fn accepts(&self, literal: &str) -> bool {
        match self {
            Self::Identifier => false,
            Self::Enumeration { values } => values.iter().any(|v| v == literal),
            Self::IntegerRange(range) => literal
                .parse::<i64>()
                .is_ok_and(|value| range.contains(value)),
            Self::FloatRange(range) => literal
                .parse::<f64>()
                .is_ok_and(|value| range.contains(value)),
            Self::StringValue => true,
        }
    }

    /// Short lowercase name of the kind, used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Enumeration { .. } => "enumeration",
            Self::IntegerRange(_) => "integer_range",
            Self::FloatRange(_) => "float_range",
            Self::StringValue => "string",
        }
    }
}

/// A vertex as held in the store: its slot id, occupant stamp and kind.
///
/// Identity, not structure, is what matters for identifiers: two identifier
/// vertices with identical children are still distinct locations in the
/// schema. [`Vertex::same_shape`] compares leaf payloads by value and treats
/// identifiers as equal only to themselves.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub(crate) id: VertexId,
    pub(crate) stamp: VertexStamp,
    pub(crate) kind: VertexKind,
}

impl Vertex {
    /// The vertex's current id.
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// The stamp of this occupant.
    pub fn stamp(&self) -> VertexStamp {
        self.stamp
    }

    /// The vertex's kind and payload.
    pub fn kind(&self) -> &VertexKind {
        &self.kind
    }

    /// Shorthand for `self.kind().allows_emanating_edges()`.
    pub fn is_identifier(&self) -> bool {
        self.kind.allows_emanating_edges()
    }

    /// Compares two vertices the way the schema editor does.
    ///
    /// Leaves compare by payload. An identifier equals only the very same
    /// occupant.
    pub fn same_shape(&self, other: &Vertex) -> bool {
        match (&self.kind, &other.kind) {
            (VertexKind::Identifier, VertexKind::Identifier) => {
                self.id == other.id && self.stamp == other.stamp
            }
            (a, b) => a == b,
        }
    }
}
