//! Mark-and-compact garbage collection and edge handle repair.
//!
//! # Preconditions
//!
//! [`SchemaGraph::reduce`] renumbers every vertex. Any [`VertexId`] or
//! [`EdgeRef`](crate::edge::EdgeRef) obtained before the call is
//! meaningless afterwards and may silently name a different vertex. Callers
//! must re-derive ids (for example from the root) after compacting.
use tracing::debug;

use crate::graph::{GraphError, SchemaGraph, VisitedSet};
use crate::vertex::{Vertex, VertexId, VertexStamp};

/// What a [`SchemaGraph::reduce`] call removed and kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReduceSummary {
    /// Vertices marked reachable and kept.
    pub vertices_kept: usize,
    /// Vertices dropped as holes.
    pub vertices_removed: usize,
    /// Edges kept.
    pub edges_kept: usize,
    /// Edges dropped with their source vertex.
    pub edges_removed: usize,
}

impl SchemaGraph {
    /// Drops every vertex not reachable from `starts` and renumbers the
    /// rest densely, preserving relative id order.
    ///
    /// The mark phase runs a depth-first walk from each start not already
    /// marked. The compact phase is a petgraph `filter_map` over the marked
    /// set; edges whose source is dropped are dropped with it. Emanating
    /// edge order survives because it is keyed by insertion sequence.
    ///
    /// All previously obtained ids are invalidated; see the module docs.
    ///
    /// # Errors
    ///
    /// - [`GraphError::InvalidReference`] if a start is not live.
    /// - [`GraphError::RootNotRetained`] if the root is not reachable from
    ///   the starts. The graph is left untouched in both cases.
    pub fn reduce(&mut self, starts: &[VertexId]) -> Result<ReduceSummary, GraphError> {
        for &start in starts {
            self.check_id(start)?;
        }

        let mut marked = VisitedSet::for_graph(self);
        for &start in starts {
            if !marked.contains(start) {
                self.depth_first(start, &mut marked, &mut |_: VertexId| {})?;
            }
        }
        if !marked.contains(self.root) {
            return Err(GraphError::RootNotRetained(self.root));
        }

        let old_vertex_count = self.vertex_count();
        let old_edge_count = self.edge_count();

        let mut mapping: Vec<Option<VertexId>> = vec![None; old_vertex_count];
        for (new_index, id) in marked.iter().enumerate() {
            if let Some(slot) = mapping.get_mut(id.index()) {
                *slot = Some(VertexId::new(new_index));
            }
        }
        let remap = |id: VertexId| mapping.get(id.index()).copied().flatten();

        // `filter_map` keeps surviving nodes in index order and drops every
        // edge with a dropped endpoint, so new ids match `mapping`.
        self.graph = self.graph.filter_map(
            |node, vertex| {
                remap(VertexId::from(node)).map(|id| Vertex {
                    id,
                    ..vertex.clone()
                })
            },
            |_, edge| {
                let mut edge = edge.clone();
                edge.source.id = remap(edge.source.id)?;
                edge.target.id = remap(edge.target.id)?;
                Some(edge)
            },
        );
        if let Some(root) = remap(self.root) {
            self.root = root;
        }

        let summary = ReduceSummary {
            vertices_kept: self.vertex_count(),
            vertices_removed: old_vertex_count - self.vertex_count(),
            edges_kept: self.edge_count(),
            edges_removed: old_edge_count - self.edge_count(),
        };
        debug!(
            kept = summary.vertices_kept,
            removed = summary.vertices_removed,
            edges_removed = summary.edges_removed,
            "reduced schema graph"
        );
        Ok(summary)
    }

    /// Re-attaches every edge handle to the current occupant of its slot.
    ///
    /// Returns the number of handles that were stale. Running it again
    /// immediately returns `0` and changes nothing.
    pub fn resolve(&mut self) -> usize {
        let stamps: Vec<VertexStamp> = self.vertices().map(Vertex::stamp).collect();
        let mut repaired = 0usize;
        for edge in self.graph.edge_weights_mut() {
            for handle in [&mut edge.source, &mut edge.target] {
                let Some(&stamp) = stamps.get(handle.id.index()) else {
                    continue;
                };
                if stamp != handle.stamp {
                    handle.stamp = stamp;
                    repaired += 1;
                }
            }
        }
        if repaired > 0 {
            debug!(repaired, "resolved stale edge handles");
        }
        repaired
    }
}
