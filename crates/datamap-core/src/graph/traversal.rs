//! Breadth-first and depth-first traversal over emanating edges.
//!
//! Both walks drive petgraph's [`Bfs`] and [`Dfs`] with explicit worklists,
//! so stack depth does not grow with schema depth. Their discovered map is
//! borrowed from a [`VisitedSet`] that may be shared across several calls,
//! which is how [`SchemaGraph::reduce`] marks everything reachable from a
//! list of starts in one mark phase.
//!
//! Siblings are discovered in petgraph's adjacency order, which lists the
//! most recently added edge first.
use std::collections::{BTreeSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Dfs, VisitMap, Visitable};

use crate::edge::Edge;
use crate::graph::{GraphError, SchemaGraph};
use crate::vertex::{Vertex, VertexId};

/// Callback invoked once per vertex, in traversal order.
pub trait Visitor {
    /// Called when `vertex` is first reached.
    fn visit(&mut self, graph: &SchemaGraph, vertex: VertexId);
}

impl<F> Visitor for F
where
    F: FnMut(VertexId),
{
    fn visit(&mut self, _graph: &SchemaGraph, vertex: VertexId) {
        self(vertex);
    }
}

type Marks = <DiGraph<Vertex, Edge> as Visitable>::Map;

/// One mark bit per vertex, backed by petgraph's visit map.
///
/// The set grows on demand, so a set created before vertices were added
/// still covers them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VisitedSet {
    marks: Marks,
}

impl VisitedSet {
    /// A set sized for `graph` with nothing marked.
    pub fn for_graph(graph: &SchemaGraph) -> Self {
        Self {
            marks: graph.graph.visit_map(),
        }
    }

    /// Extends the set to cover every vertex of `graph`.
    fn cover(&mut self, graph: &SchemaGraph) {
        self.marks.grow(graph.vertex_count());
    }

    /// Marks `id`, returning `true` if it was not already marked.
    pub fn insert(&mut self, id: VertexId) -> bool {
        if id.index() >= self.marks.len() {
            self.marks.grow(id.index() + 1);
        }
        !self.marks.put(id.index())
    }

    /// Clears the mark on `id`, returning `true` if it was marked.
    pub fn remove(&mut self, id: VertexId) -> bool {
        let marked = self.contains(id);
        if marked {
            self.marks.set(id.index(), false);
        }
        marked
    }

    /// Returns `true` if `id` is marked.
    pub fn contains(&self, id: VertexId) -> bool {
        self.marks.contains(id.index())
    }

    /// Number of marked vertices.
    pub fn len(&self) -> usize {
        self.marks.count_ones(..)
    }

    /// Returns `true` if nothing is marked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Marked ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.marks.ones().map(VertexId::new)
    }
}

impl SchemaGraph {
    /// Breadth-first walk from `start`, visiting each unmarked vertex once.
    ///
    /// Vertices already marked in `visited` are neither visited nor
    /// expanded.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidReference`] if `start` is not live.
    pub fn breadth_first<V: Visitor>(
        &self,
        start: VertexId,
        visited: &mut VisitedSet,
        visitor: &mut V,
    ) -> Result<(), GraphError> {
        self.check_id(start)?;
        visited.cover(self);

        let mut bfs = Bfs {
            stack: VecDeque::new(),
            discovered: std::mem::take(&mut visited.marks),
        };
        if bfs.discovered.visit(NodeIndex::from(start)) {
            bfs.stack.push_back(NodeIndex::from(start));
        }
        while let Some(node) = bfs.next(&self.graph) {
            visitor.visit(self, VertexId::from(node));
        }
        visited.marks = bfs.discovered;
        Ok(())
    }

    /// Depth-first pre-order walk from `start`, visiting each unmarked
    /// vertex once.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidReference`] if `start` is not live.
    pub fn depth_first<V: Visitor>(
        &self,
        start: VertexId,
        visited: &mut VisitedSet,
        visitor: &mut V,
    ) -> Result<(), GraphError> {
        self.check_id(start)?;
        visited.cover(self);

        let mut dfs = Dfs {
            stack: vec![NodeIndex::from(start)],
            discovered: std::mem::take(&mut visited.marks),
        };
        while let Some(node) = dfs.next(&self.graph) {
            visitor.visit(self, VertexId::from(node));
        }
        visited.marks = dfs.discovered;
        Ok(())
    }

    /// Returns every vertex reachable from `start` by one or more edges.
    ///
    /// `start` itself is included only if it lies on a cycle.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidReference`] if `start` is not live.
    pub fn reachable_from(&self, start: VertexId) -> Result<BTreeSet<VertexId>, GraphError> {
        self.check_id(start)?;

        let mut visited = VisitedSet::for_graph(self);
        let mut reached: BTreeSet<VertexId> = BTreeSet::new();
        for target in self.graph.neighbors(NodeIndex::from(start)) {
            self.breadth_first(VertexId::from(target), &mut visited, &mut |v: VertexId| {
                reached.insert(v);
            })?;
        }
        Ok(reached)
    }

    /// Returns `true` if every vertex in `vertices` reaches every other
    /// vertex in `vertices`.
    ///
    /// Runs one reachability walk per member, O(V·(V+E)). This is stronger
    /// than weak connectivity and is meant for integrity checks, not for
    /// the checking hot path. An empty or single-member set is connected.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidReference`] if any member is not live.
    pub fn is_connected(&self, vertices: &[VertexId]) -> Result<bool, GraphError> {
        for &id in vertices {
            self.check_id(id)?;
        }
        for &from in vertices {
            let reached = self.reachable_from(from)?;
            if vertices
                .iter()
                .any(|&other| other != from && !reached.contains(&other))
            {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
