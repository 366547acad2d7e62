//! Shared fixtures for unit tests.
//!
//! Compiled only in test builds. Integration tests under
//! `crates/datamap-core/tests/` define their own helpers because they link
//! against the non-test library build.
#![allow(clippy::expect_used)]

use crate::check::triple::{Rule, RuleContext, Triple};
use crate::edge::EdgeRef;
use crate::graph::SchemaGraph;
use crate::vertex::{IntegerRange, VertexId, VertexKind};

/// A small top-state datamap:
///
/// ```text
/// root ^name     -> enumeration {idle, working}
///      ^io       -> io
///      ^operator -> operator
///      ^count    -> integer [0, 10]
/// io   ^input-link  -> input
///      ^output-link -> output
/// operator ^name -> string
/// ```
pub struct StateGraph {
    pub graph: SchemaGraph,
    pub io: VertexId,
    pub input: VertexId,
    pub output: VertexId,
    pub operator: VertexId,
    pub name_edge: EdgeRef,
    pub io_edge: EdgeRef,
    pub operator_edge: EdgeRef,
    pub count_edge: EdgeRef,
    pub operator_name_edge: EdgeRef,
}

pub fn state_graph() -> StateGraph {
    let mut graph = SchemaGraph::new();
    let root = graph.root();

    let state_names = graph.add_vertex(VertexKind::enumeration(["idle", "working"]));
    let io = graph.add_vertex(VertexKind::Identifier);
    let input = graph.add_vertex(VertexKind::Identifier);
    let output = graph.add_vertex(VertexKind::Identifier);
    let operator = graph.add_vertex(VertexKind::Identifier);
    let operator_name = graph.add_vertex(VertexKind::StringValue);
    let count = graph.add_vertex(VertexKind::IntegerRange(IntegerRange {
        low: Some(0),
        high: Some(10),
    }));

    let name_edge = graph
        .add_edge(root, "name", state_names, None)
        .expect("root is an identifier");
    let io_edge = graph.add_edge(root, "io", io, None).expect("valid edge");
    let operator_edge = graph
        .add_edge(root, "operator", operator, None)
        .expect("valid edge");
    let count_edge = graph.add_edge(root, "count", count, None).expect("valid edge");
    graph
        .add_edge(io, "input-link", input, None)
        .expect("valid edge");
    graph
        .add_edge(io, "output-link", output, None)
        .expect("valid edge");
    let operator_name_edge = graph
        .add_edge(operator, "name", operator_name, None)
        .expect("valid edge");

    StateGraph {
        graph,
        io,
        input,
        output,
        operator,
        name_edge,
        io_edge,
        operator_edge,
        count_edge,
        operator_name_edge,
    }
}

/// The triple binding `<s>` to the top state.
pub fn state_triple() -> Triple {
    Triple::condition("<s>", "state", "root")
}

/// A rule named `name` at line 1 with the given triples.
pub fn rule(name: &str, triples: Vec<Triple>) -> Rule {
    Rule::new(RuleContext::new(name, 1, 1), triples)
}
