//! The datamap schema graph: vertex store, edge index, and graph algorithms.
//!
//! The store is a `petgraph` [`DiGraph`] with [`Vertex`] node weights and
//! [`Edge`] edge weights. A [`VertexId`] is the vertex's [`NodeIndex`].
//! Nodes are only ever removed by [`SchemaGraph::reduce`], which rebuilds
//! the whole graph, so ids stay dense. Every "pointer" in the graph is an
//! index, so cycles and shared identifiers need no special ownership.
//!
//! petgraph lists a vertex's edges newest first, and that order does not
//! survive `filter_map`. Every edge therefore carries an insertion sequence
//! number, and the emanating edges of a vertex are reported in that order.
//!
//! # Submodules
//!
//! - [`traversal`]: petgraph BFS/DFS over a shareable visited map,
//!   reachability, and the all-pairs connectivity check.
//! - [`cycles`]: Kahn's algorithm topological order and cycle extraction.
//! - [`ancestors`]: parent and matching-parent search from the root.
//! - [`compaction`]: mark-and-compact [`SchemaGraph::reduce`] and handle
//!   repair [`SchemaGraph::resolve`].
//!
//! # Readers and writers
//!
//! Structural mutation (`add_*`, `remove_edge`, `replace_vertex`, `reduce`)
//! requires `&mut SchemaGraph`, as does a conformance check, which only
//! touches coverage flags. The borrow checker therefore rules out mutating
//! topology while a check is in flight.

pub mod ancestors;
pub mod compaction;
pub mod cycles;
pub mod traversal;


use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeIndex, EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef as _;

use crate::edge::{Edge, EdgeRef, VertexHandle};
use crate::vertex::{Vertex, VertexId, VertexKind, VertexStamp};

pub use ancestors::MatchingParent;
pub use compaction::ReduceSummary;
pub use cycles::TopologicalOrder;
pub use traversal::{VisitedSet, Visitor};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Misuse of the graph API by the caller.
///
/// These are programming errors in the layer that builds or edits the
/// schema, never findings about a rule. Rule findings are reported as
/// [`Diagnostic`](crate::diagnostics::Diagnostic) values instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The id is outside the live range of the vertex store.
    #[error("vertex {0} is not in the store")]
    InvalidReference(VertexId),
    /// An edge was requested from a vertex that is not an identifier.
    #[error("vertex {0} is not an identifier and cannot be an edge source")]
    IllegalEdgeSource(VertexId),
    /// The edge ref does not name an existing edge.
    #[error("edge {0} does not exist")]
    InvalidEdge(EdgeRef),
    /// The root must be an identifier.
    #[error("vertex {0} is not an identifier and cannot be the root")]
    IllegalRoot(VertexId),
    /// An identifier with emanating edges cannot be replaced by a leaf.
    #[error("vertex {0} still has emanating edges and cannot become a leaf")]
    EmanatingEdgesOnLeaf(VertexId),
    /// The reduce start list does not reach the root vertex.
    #[error("root vertex {0} is not reachable from the reduce start vertices")]
    RootNotRetained(VertexId),
    /// An edge handle caches the stamp of a vertex that has since been
    /// replaced. Cleared by [`SchemaGraph::resolve`].
    #[error("edge {edge} holds a stale handle to vertex {vertex}")]
    StaleHandle {
        /// The edge holding the stale handle.
        edge: EdgeRef,
        /// The endpoint whose occupant changed.
        vertex: VertexId,
    },
}

// ---------------------------------------------------------------------------
// SchemaGraph
// ---------------------------------------------------------------------------

/// A directed multigraph modelling the legal shape of working memory.
///
/// Construct with [`SchemaGraph::new`], which creates the root identifier
/// (the top state) at id `0`.
#[derive(Debug, Clone)]
pub struct SchemaGraph {
    graph: DiGraph<Vertex, Edge>,
    root: VertexId,
    next_stamp: u64,
    next_sequence: u64,
}

impl Default for SchemaGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaGraph {
    /// Creates a graph holding only the root identifier.
    pub fn new() -> Self {
        Self::with_capacity(1)
    }

    /// Like [`SchemaGraph::new`], reserving space for `vertices` vertices.
    pub fn with_capacity(vertices: usize) -> Self {
        let mut graph = Self {
            graph: DiGraph::with_capacity(vertices.max(1), vertices),
            root: VertexId::new(0),
            next_stamp: 0,
            next_sequence: 0,
        };
        graph.root = graph.add_vertex(VertexKind::Identifier);
        graph
    }

    /// Returns the number of live vertices.
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns a reference to the underlying petgraph store.
    pub fn graph(&self) -> &DiGraph<Vertex, Edge> {
        &self.graph
    }

    /// The root (top-state) vertex.
    pub fn root(&self) -> VertexId {
        self.root
    }

    /// Designates a different identifier as the root.
    ///
    /// # Errors
    ///
    /// - [`GraphError::InvalidReference`] if `id` is not live.
    /// - [`GraphError::IllegalRoot`] if the vertex is not an identifier.
    pub fn set_root(&mut self, id: VertexId) -> Result<(), GraphError> {
        if !self.vertex(id)?.is_identifier() {
            return Err(GraphError::IllegalRoot(id));
        }
        self.root = id;
        Ok(())
    }

    /// Returns `true` if `id` names a live vertex.
    pub fn contains(&self, id: VertexId) -> bool {
        id.index() < self.graph.node_count()
    }

    pub(crate) fn check_id(&self, id: VertexId) -> Result<(), GraphError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(GraphError::InvalidReference(id))
        }
    }

    fn fresh_stamp(&mut self) -> VertexStamp {
        let stamp = VertexStamp(self.next_stamp);
        self.next_stamp += 1;
        stamp
    }

    /// Appends a vertex and returns its id.
    pub fn add_vertex(&mut self, kind: VertexKind) -> VertexId {
        let id = VertexId::new(self.graph.node_count());
        let stamp = self.fresh_stamp();
        VertexId::from(self.graph.add_node(Vertex { id, stamp, kind }))
    }

    /// Looks up a vertex by id.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidReference`] if `id` is not live.
    pub fn vertex(&self, id: VertexId) -> Result<&Vertex, GraphError> {
        self.graph
            .node_weight(NodeIndex::from(id))
            .ok_or(GraphError::InvalidReference(id))
    }

    /// Iterates over all vertices in id order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.graph.raw_nodes().iter().map(|node| &node.weight)
    }

    /// Iterates over all vertex ids in order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + use<> {
        self.graph.node_indices().map(VertexId::from)
    }

    /// Puts a new occupant into the slot `id`, returning its stamp.
    ///
    /// The slot keeps its id and its emanating edges, but every edge handle
    /// that pointed at the previous occupant is now stale until
    /// [`SchemaGraph::resolve`] runs.
    ///
    /// # Errors
    ///
    /// - [`GraphError::InvalidReference`] if `id` is not live.
    /// - [`GraphError::EmanatingEdgesOnLeaf`] if `kind` is a leaf kind and
    ///   the slot still has emanating edges.
    /// - [`GraphError::IllegalRoot`] if `id` is the root and `kind` is not
    ///   an identifier.
    pub fn replace_vertex(
        &mut self,
        id: VertexId,
        kind: VertexKind,
    ) -> Result<VertexStamp, GraphError> {
        self.check_id(id)?;
        if !kind.allows_emanating_edges() {
            if id == self.root {
                return Err(GraphError::IllegalRoot(id));
            }
            if self.graph.edges(NodeIndex::from(id)).next().is_some() {
                return Err(GraphError::EmanatingEdgesOnLeaf(id));
            }
        }
        let stamp = self.fresh_stamp();
        let slot = self
            .graph
            .node_weight_mut(NodeIndex::from(id))
            .ok_or(GraphError::InvalidReference(id))?;
        *slot = Vertex { id, stamp, kind };
        Ok(stamp)
    }

    fn handle(&self, id: VertexId) -> Result<VertexHandle, GraphError> {
        let vertex = self.vertex(id)?;
        Ok(VertexHandle {
            id,
            stamp: vertex.stamp,
        })
    }

    /// Adds a named edge from `source` to `target`.
    ///
    /// Edges sharing `(source, name)` are allowed and model union-typed
    /// attributes.
    ///
    /// # Errors
    ///
    /// - [`GraphError::InvalidReference`] if either endpoint is not live.
    /// - [`GraphError::IllegalEdgeSource`] if `source` is not an identifier.
    pub fn add_edge(
        &mut self,
        source: VertexId,
        name: impl Into<String>,
        target: VertexId,
        comment: Option<String>,
    ) -> Result<EdgeRef, GraphError> {
        let source_handle = self.handle(source)?;
        let target_handle = self.handle(target)?;
        if !self.vertex(source)?.is_identifier() {
            return Err(GraphError::IllegalEdgeSource(source));
        }

        let position = self.graph.edges(NodeIndex::from(source)).count();
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.graph.add_edge(
            NodeIndex::from(source),
            NodeIndex::from(target),
            Edge {
                source: source_handle,
                name: name.into(),
                target: target_handle,
                comment,
                coverage: Default::default(),
                sequence,
            },
        );
        Ok(EdgeRef { source, position })
    }

    /// Emanating edges of `source` sorted by insertion sequence.
    fn ordered_edges(&self, source: VertexId) -> Vec<EdgeReference<'_, Edge>> {
        let mut edges: Vec<EdgeReference<'_, Edge>> =
            self.graph.edges(NodeIndex::from(source)).collect();
        edges.sort_unstable_by_key(|edge| edge.weight().sequence);
        edges
    }

    fn edge_index(&self, edge: EdgeRef) -> Result<EdgeIndex, GraphError> {
        if !self.contains(edge.source) {
            return Err(GraphError::InvalidEdge(edge));
        }
        self.ordered_edges(edge.source)
            .get(edge.position)
            .map(|found| found.id())
            .ok_or(GraphError::InvalidEdge(edge))
    }

    /// Removes an edge and returns it.
    ///
    /// Later edges of the same source shift down one position.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidEdge`] if `edge` does not exist.
    pub fn remove_edge(&mut self, edge: EdgeRef) -> Result<Edge, GraphError> {
        let index = self.edge_index(edge)?;
        self.graph
            .remove_edge(index)
            .ok_or(GraphError::InvalidEdge(edge))
    }

    /// Looks up a single edge.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidEdge`] if `edge` does not exist.
    pub fn edge(&self, edge: EdgeRef) -> Result<&Edge, GraphError> {
        let index = self.edge_index(edge)?;
        self.graph
            .edge_weight(index)
            .ok_or(GraphError::InvalidEdge(edge))
    }

    pub(crate) fn edge_mut(&mut self, edge: EdgeRef) -> Result<&mut Edge, GraphError> {
        let index = self.edge_index(edge)?;
        self.graph
            .edge_weight_mut(index)
            .ok_or(GraphError::InvalidEdge(edge))
    }

    /// The edges whose source is `id`, in insertion order.
    ///
    /// Leaves always yield an empty list. The position of an edge in the
    /// list is its [`EdgeRef::position`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidReference`] if `id` is not live.
    pub fn emanating_edges(&self, id: VertexId) -> Result<Vec<&Edge>, GraphError> {
        self.check_id(id)?;
        Ok(self
            .ordered_edges(id)
            .into_iter()
            .map(|edge| edge.weight())
            .collect())
    }

    /// The edges whose target is `id`, ordered by [`EdgeRef`].
    ///
    /// Walks petgraph's incoming list for `id`, then ranks each edge among
    /// its source's emanating edges to recover the position.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidReference`] if `id` is not live.
    pub fn incident_edges(&self, id: VertexId) -> Result<Vec<(EdgeRef, &Edge)>, GraphError> {
        self.check_id(id)?;
        let mut incident: Vec<(EdgeRef, &Edge)> = self
            .graph
            .edges_directed(NodeIndex::from(id), Direction::Incoming)
            .map(|incoming| {
                let edge = incoming.weight();
                let position = self
                    .graph
                    .edges(incoming.source())
                    .filter(|sibling| sibling.weight().sequence < edge.sequence)
                    .count();
                let source = VertexId::from(incoming.source());
                (EdgeRef { source, position }, edge)
            })
            .collect();
        incident.sort_unstable_by_key(|&(edge_ref, _)| edge_ref);
        Ok(incident)
    }

    /// Iterates over every edge, grouped by source in id order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeRef, &Edge)> {
        self.vertex_ids().flat_map(move |source| {
            self.ordered_edges(source)
                .into_iter()
                .enumerate()
                .map(move |(position, edge)| (EdgeRef { source, position }, edge.weight()))
        })
    }

    pub(crate) fn edges_mut(&mut self) -> impl Iterator<Item = &mut Edge> {
        self.graph.edge_weights_mut()
    }

    /// Verifies the structural invariants of the store.
    ///
    /// Checks that every vertex's own id matches its node index, every edge
    /// weight agrees with the endpoints petgraph holds for it, every edge
    /// source is an identifier, and every handle stamp matches the current
    /// occupant.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant as a [`GraphError`].
    pub fn check_integrity(&self) -> Result<(), GraphError> {
        for node in self.graph.node_indices() {
            let vertex = &self.graph[node];
            if vertex.id.index() != node.index() {
                return Err(GraphError::InvalidReference(vertex.id));
            }
        }

        for source in self.vertex_ids() {
            for (position, stored) in self.ordered_edges(source).into_iter().enumerate() {
                let edge_ref = EdgeRef { source, position };
                let edge = stored.weight();
                if edge.source() != source || edge.target() != VertexId::from(stored.target()) {
                    return Err(GraphError::InvalidEdge(edge_ref));
                }
                let source_vertex = self.vertex(edge.source())?;
                let target_vertex = self.vertex(edge.target())?;
                if !source_vertex.is_identifier() {
                    return Err(GraphError::IllegalEdgeSource(source));
                }
                for (handle, vertex) in [(edge.source, source_vertex), (edge.target, target_vertex)]
                {
                    if handle.stamp != vertex.stamp {
                        return Err(GraphError::StaleHandle {
                            edge: edge_ref,
                            vertex: vertex.id,
                        });
                    }
                }
            }
        }
        if !self.vertex(self.root).is_ok_and(Vertex::is_identifier) {
            return Err(GraphError::IllegalRoot(self.root));
        }
        Ok(())
    }
}
