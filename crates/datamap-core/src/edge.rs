//! Named, directed edges of the schema graph and their coverage flags.
use std::fmt;

use serde::Serialize;

use crate::vertex::{VertexId, VertexStamp};

/// Locates one edge: its source vertex and its position in that vertex's
/// emanating-edge list.
///
/// Positions are stable under [`SchemaGraph::add_edge`](crate::graph::SchemaGraph::add_edge).
/// [`SchemaGraph::remove_edge`](crate::graph::SchemaGraph::remove_edge)
/// shifts every later edge of the same source down by one, and
/// [`SchemaGraph::reduce`](crate::graph::SchemaGraph::reduce) invalidates
/// all refs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EdgeRef {
    /// The edge's source vertex.
    pub source: VertexId,
    /// Zero-based position among the source's emanating edges.
    pub position: usize,
}

impl fmt::Display for EdgeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.source, self.position)
    }
}

/// A cached pointer from an edge to one of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexHandle {
    pub(crate) id: VertexId,
    pub(crate) stamp: VertexStamp,
}

impl VertexHandle {
    /// The endpoint's vertex id.
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// The stamp of the occupant this handle was last attached to.
    pub fn stamp(&self) -> VertexStamp {
        self.stamp
    }
}

/// Whether a conformance check has exercised an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize)]
pub struct Coverage {
    /// Matched by at least one rule condition.
    pub tested: bool,
    /// Matched by at least one rule action.
    pub created: bool,
}

impl Coverage {
    /// Neither tested nor created.
    pub fn is_unexercised(&self) -> bool {
        !self.tested && !self.created
    }
}

/// A directed, named arc from an identifier vertex to any vertex.
///
/// Several edges may share the same source and name; that models an
/// attribute whose value may be of more than one schema type.
#[derive(Debug, Clone)]
pub struct Edge {
    pub(crate) source: VertexHandle,
    pub(crate) name: String,
    pub(crate) target: VertexHandle,
    pub(crate) comment: Option<String>,
    pub(crate) coverage: Coverage,
    /// Insertion sequence number; orders the source's emanating edges.
    pub(crate) sequence: u64,
}

impl Edge {
    /// Id of the source vertex.
    pub fn source(&self) -> VertexId {
        self.source.id
    }

    /// Id of the target vertex.
    pub fn target(&self) -> VertexId {
        self.target.id
    }

    /// Cached handle to the source occupant.
    pub fn source_handle(&self) -> VertexHandle {
        self.source
    }

    /// Cached handle to the target occupant.
    pub fn target_handle(&self) -> VertexHandle {
        self.target
    }

    /// Attribute name carried by the edge.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form comment attached by the schema author.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Current coverage flags.
    pub fn coverage(&self) -> Coverage {
        self.coverage
    }

    /// Sets the `tested` flag.
    pub fn mark_tested(&mut self) {
        self.coverage.tested = true;
    }

    /// Sets the `created` flag.
    pub fn mark_created(&mut self) {
        self.coverage.created = true;
    }

    /// Clears both coverage flags.
    pub fn clear_coverage(&mut self) {
        self.coverage = Coverage::default();
    }
}
