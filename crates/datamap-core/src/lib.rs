#![deny(clippy::print_stdout, clippy::print_stderr)]
//! Schema graph ("datamap") for hierarchical working memory, and a checker
//! that verifies extracted rule patterns against it.
//!
//! The graph is built by the caller from project files; rule patterns are
//! produced by an external parser. This crate returns diagnostics and sets
//! per-edge coverage flags for the editor to display.

pub mod check;
pub mod coverage;
pub mod diagnostics;
pub mod edge;
pub mod graph;
pub mod vertex;

#[cfg(test)]
mod test_helpers;

pub use check::{
    BindingEnvironment, CheckConfig, CheckSummary, Rule, RuleContext, Token, Triple, check_rule,
    check_rules,
};
pub use coverage::CoverageSummary;
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, diagnostics_to_json};
pub use edge::{Coverage, Edge, EdgeRef, VertexHandle};
pub use graph::{
    GraphError, MatchingParent, ReduceSummary, SchemaGraph, TopologicalOrder, VisitedSet, Visitor,
};
pub use vertex::{FloatRange, IntegerRange, Vertex, VertexId, VertexKind, VertexStamp};

/// Returns the current version of the datamap-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
