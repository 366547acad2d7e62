//! Read-side queries over edge coverage flags.
//!
//! The editor uses these to highlight datamap attributes that no rule tests
//! or creates.
use serde::Serialize;

use crate::edge::EdgeRef;
use crate::graph::SchemaGraph;

/// Counts of edges by coverage state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CoverageSummary {
    /// All edges.
    pub edges: usize,
    /// Edges with `tested` set.
    pub tested: usize,
    /// Edges with `created` set.
    pub created: usize,
    /// Edges with neither flag set.
    pub unexercised: usize,
}

impl SchemaGraph {
    /// Clears `tested` and `created` on every edge.
    pub fn reset_coverage(&mut self) {
        for edge in self.edges_mut() {
            edge.clear_coverage();
        }
    }

    /// Edges no condition has tested.
    pub fn untested_edges(&self) -> Vec<EdgeRef> {
        self.edges()
            .filter(|(_, edge)| !edge.coverage().tested)
            .map(|(edge_ref, _)| edge_ref)
            .collect()
    }

    /// Edges no action has created.
    pub fn uncreated_edges(&self) -> Vec<EdgeRef> {
        self.edges()
            .filter(|(_, edge)| !edge.coverage().created)
            .map(|(edge_ref, _)| edge_ref)
            .collect()
    }

    /// Edges neither tested nor created.
    pub fn unexercised_edges(&self) -> Vec<EdgeRef> {
        self.edges()
            .filter(|(_, edge)| edge.coverage().is_unexercised())
            .map(|(edge_ref, _)| edge_ref)
            .collect()
    }

    /// Tallies coverage over every edge.
    pub fn coverage_summary(&self) -> CoverageSummary {
        self.edges()
            .fold(CoverageSummary::default(), |mut summary, (_, edge)| {
                let coverage = edge.coverage();
                summary.edges += 1;
                summary.tested += usize::from(coverage.tested);
                summary.created += usize::from(coverage.created);
                summary.unexercised += usize::from(coverage.is_unexercised());
                summary
            })
    }
}
