//! Topological ordering and cycle detection.
//!
//! Uses Kahn's algorithm: compute an in-degree table over all edges, seed a
//! FIFO queue with every zero-in-degree vertex, then repeatedly dequeue a
//! vertex and decrement the in-degree of each of its targets, enqueueing
//! any target that reaches zero. The graph is acyclic iff the queue drains
//! every vertex. Vertices left over sit on, or downstream of, a cycle.
//!
//! Shared identifiers in a datamap can legitimately close cycles (a
//! superstate link back to the top state, for instance), so acyclicity is
//! reported rather than enforced.
use std::collections::VecDeque;

use petgraph::Direction;

use crate::graph::{SchemaGraph, VisitedSet};
use crate::vertex::VertexId;

/// Result of a Kahn's-algorithm pass over a [`SchemaGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopologicalOrder {
    /// Vertices in the order they were dequeued.
    pub order: Vec<VertexId>,
    /// Vertices never dequeued, in ascending id order.
    pub remainder: Vec<VertexId>,
}

impl TopologicalOrder {
    /// Returns `true` if every vertex was visited.
    pub fn is_acyclic(&self) -> bool {
        self.remainder.is_empty()
    }

    /// Number of vertices visited.
    pub fn visited_count(&self) -> usize {
        self.order.len()
    }
}

impl SchemaGraph {
    /// Runs Kahn's algorithm over the whole graph.
    ///
    /// O(V + E); each vertex is dequeued at most once.
    pub fn topological_order(&self) -> TopologicalOrder {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|node| self.graph.edges_directed(node, Direction::Incoming).count())
            .collect();

        let mut queue: VecDeque<VertexId> = in_degree
            .iter()
            .enumerate()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(index, _)| VertexId::new(index))
            .collect();

        let mut order: Vec<VertexId> = Vec::with_capacity(self.vertex_count());
        let mut visited = VisitedSet::for_graph(self);

        while let Some(vertex) = queue.pop_front() {
            if !visited.insert(vertex) {
                continue;
            }
            order.push(vertex);

            for edge in self.emanating_edges(vertex).unwrap_or_default() {
                let target = edge.target();
                if let Some(degree) = in_degree.get_mut(target.index()) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        queue.push_back(target);
                    }
                }
            }
        }

        let remainder = self
            .vertex_ids()
            .filter(|&id| !visited.contains(id))
            .collect();

        TopologicalOrder { order, remainder }
    }

    /// Returns `true` if the graph has no directed cycle.
    pub fn is_acyclic(&self) -> bool {
        self.topological_order().is_acyclic()
    }

    /// Extracts individual directed cycles.
    ///
    /// Returns an empty `Vec` for an acyclic graph. Otherwise each inner
    /// vector is a closed cycle in traversal order, with the first vertex
    /// repeated at the end. A cyclic graph always yields at least one cycle,
    /// but the list is not an enumeration of every elementary cycle.
    pub fn detect_cycles(&self) -> Vec<Vec<VertexId>> {
        let topo = self.topological_order();
        if topo.is_acyclic() {
            return Vec::new();
        }

        let mut candidates = VisitedSet::for_graph(self);
        for &id in &topo.remainder {
            candidates.insert(id);
        }
        self.extract_cycles(&topo.remainder, &candidates)
    }

    /// Iterative DFS over the Kahn remainder. A child already on the current
    /// path closes a cycle.
    fn extract_cycles(
        &self,
        remainder: &[VertexId],
        candidates: &VisitedSet,
    ) -> Vec<Vec<VertexId>> {
        let mut cycles: Vec<Vec<VertexId>> = Vec::new();
        let mut finished = VisitedSet::for_graph(self);

        for &start in remainder {
            if finished.contains(start) {
                continue;
            }

            let mut path: Vec<VertexId> = vec![start];
            let mut on_path = VisitedSet::for_graph(self);
            on_path.insert(start);
            // (vertex, successors inside the remainder, next successor index)
            let mut stack: Vec<(VertexId, Vec<VertexId>, usize)> =
                vec![(start, self.successors_within(start, candidates), 0)];

            while let Some((vertex, children, next)) = stack.last_mut() {
                let vertex = *vertex;
                let Some(&child) = children.get(*next) else {
                    stack.pop();
                    path.pop();
                    on_path.remove(vertex);
                    finished.insert(vertex);
                    continue;
                };
                *next += 1;

                if on_path.contains(child) {
                    if let Some(at) = path.iter().position(|&v| v == child) {
                        let mut cycle = path[at..].to_vec();
                        cycle.push(child);
                        cycles.push(cycle);
                    }
                    continue;
                }
                if finished.contains(child) {
                    continue;
                }

                path.push(child);
                on_path.insert(child);
                stack.push((child, self.successors_within(child, candidates), 0));
            }
        }

        cycles
    }

    fn successors_within(&self, vertex: VertexId, candidates: &VisitedSet) -> Vec<VertexId> {
        self.emanating_edges(vertex)
            .unwrap_or_default()
            .into_iter()
            .map(|edge| edge.target())
            .filter(|&target| candidates.contains(target))
            .collect()
    }
}
