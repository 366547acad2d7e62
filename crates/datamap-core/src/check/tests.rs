#![allow(clippy::expect_used)]

use super::*;
use crate::diagnostics::diagnostics_to_json;
use crate::test_helpers::{rule, state_graph, state_triple};
use crate::vertex::VertexKind;

fn run(graph: &mut SchemaGraph, triples: Vec<Triple>) -> Vec<Diagnostic> {
    run_with(graph, triples, &CheckConfig::default())
}

fn run_with(
    graph: &mut SchemaGraph,
    triples: Vec<Triple>,
    config: &CheckConfig,
) -> Vec<Diagnostic> {
    let mut sink: Vec<Diagnostic> = Vec::new();
    let emitted = check_rule(graph, &rule("test*rule", triples), config, &mut sink);
    assert_eq!(emitted, sink.len(), "return value counts this rule's reports");
    sink
}

fn kinds(diagnostics: &[Diagnostic]) -> Vec<&DiagnosticKind> {
    diagnostics.iter().map(|d| &d.kind).collect()
}

fn tested(graph: &SchemaGraph, edge: EdgeRef) -> bool {
    graph.edge(edge).expect("edge exists").coverage().tested
}

fn created(graph: &SchemaGraph, edge: EdgeRef) -> bool {
    graph.edge(edge).expect("edge exists").coverage().created
}

// ---------------------------------------------------------------------------
// State variable detection
// ---------------------------------------------------------------------------

#[test]
fn matching_condition_marks_edge_tested() {
    let mut fixture = state_graph();
    let diagnostics = run(
        &mut fixture.graph,
        vec![state_triple(), Triple::condition("<s>", "name", "idle")],
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert!(tested(&fixture.graph, fixture.name_edge));
    assert!(!created(&fixture.graph, fixture.name_edge));
}

#[test]
fn unknown_attribute_is_a_bad_constraint() {
    let mut fixture = state_graph();
    let bad = Triple::condition("<s>", "color", "red");
    let diagnostics = run(&mut fixture.graph, vec![state_triple(), bad.clone()]);
    assert_eq!(
        kinds(&diagnostics),
        vec![&DiagnosticKind::BadConstraint { triple: bad }]
    );
    assert_eq!(fixture.graph.coverage_summary().unexercised, fixture.graph.edge_count());
}

#[test]
fn missing_state_triple_stops_the_rule() {
    let mut fixture = state_graph();
    let diagnostics = run(
        &mut fixture.graph,
        vec![
            Triple::condition("<s>", "name", "idle"),
            Triple::condition("<x>", "color", "red"),
        ],
    );
    assert_eq!(kinds(&diagnostics), vec![&DiagnosticKind::NoStateVariable]);
    assert!(!tested(&fixture.graph, fixture.name_edge));
}

#[test]
fn several_state_triples_stop_the_rule() {
    let mut fixture = state_graph();
    let diagnostics = run(
        &mut fixture.graph,
        vec![
            state_triple(),
            Triple::condition("<t>", "state", "root"),
            Triple::condition("<s>", "name", "idle"),
        ],
    );
    assert_eq!(
        kinds(&diagnostics),
        vec![&DiagnosticKind::TooManyStateVariables { count: 2 }]
    );
    assert!(!tested(&fixture.graph, fixture.name_edge));
}

#[test]
fn state_attribute_is_configurable() {
    let mut fixture = state_graph();
    let config = CheckConfig {
        state_attribute: "top-state".to_owned(),
        ..CheckConfig::default()
    };
    let diagnostics = run_with(
        &mut fixture.graph,
        vec![
            Triple::condition("<s>", "top-state", "root"),
            Triple::condition("<s>", "name", "working"),
        ],
        &config,
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert!(tested(&fixture.graph, fixture.name_edge));
}

// ---------------------------------------------------------------------------
// Literal values
// ---------------------------------------------------------------------------

#[test]
fn enumeration_rejects_unlisted_symbol() {
    let mut fixture = state_graph();
    let diagnostics = run(
        &mut fixture.graph,
        vec![state_triple(), Triple::condition("<s>", "name", "sleeping")],
    );
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind.code(), "bad-constraint");
    assert!(!tested(&fixture.graph, fixture.name_edge));
}

#[test]
fn literal_check_can_be_disabled() {
    let mut fixture = state_graph();
    let config = CheckConfig {
        check_literal_values: false,
        ..CheckConfig::default()
    };
    let diagnostics = run_with(
        &mut fixture.graph,
        vec![state_triple(), Triple::condition("<s>", "name", "sleeping")],
        &config,
    );
    assert!(diagnostics.is_empty());
    assert!(tested(&fixture.graph, fixture.name_edge));
}

#[test]
fn integer_range_bounds_literal() {
    let mut fixture = state_graph();
    let in_range = run(
        &mut fixture.graph,
        vec![state_triple(), Triple::condition("<s>", "count", "10")],
    );
    assert!(in_range.is_empty());

    let out_of_range = run(
        &mut fixture.graph,
        vec![state_triple(), Triple::condition("<s>", "count", "11")],
    );
    assert_eq!(out_of_range.len(), 1);
}

#[test]
fn union_attribute_marks_only_accepting_target() {
    let mut fixture = state_graph();
    let root = fixture.graph.root();
    let free_text = fixture.graph.add_vertex(VertexKind::StringValue);
    let free_edge = fixture
        .graph
        .add_edge(root, "name", free_text, None)
        .expect("valid");

    let diagnostics = run(
        &mut fixture.graph,
        vec![state_triple(), Triple::condition("<s>", "name", "busy")],
    );
    assert!(diagnostics.is_empty());
    assert!(!tested(&fixture.graph, fixture.name_edge));
    assert!(tested(&fixture.graph, free_edge));
}

#[test]
fn numeric_operator_value_is_not_checked() {
    let mut fixture = state_graph();
    let diagnostics = run(
        &mut fixture.graph,
        vec![state_triple(), Triple::condition("<s>", "operator", "5")],
    );
    assert!(diagnostics.is_empty());
    assert!(!tested(&fixture.graph, fixture.operator_edge));

    let symbolic = run(
        &mut fixture.graph,
        vec![state_triple(), Triple::condition("<s>", "operator", "wait")],
    );
    assert_eq!(symbolic.len(), 1, "identifier never accepts a literal");
}

// ---------------------------------------------------------------------------
// Variables and propagation
// ---------------------------------------------------------------------------

#[test]
fn value_variables_chain_through_identifiers() {
    let mut fixture = state_graph();
    let diagnostics = run(
        &mut fixture.graph,
        vec![
            state_triple(),
            Triple::condition("<s>", "io", "<io>"),
            Triple::condition("<io>", "input-link", "<il>"),
        ],
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert!(tested(&fixture.graph, fixture.io_edge));
    let input_link = fixture
        .graph
        .edges()
        .find(|(_, edge)| edge.name() == "input-link")
        .map(|(edge_ref, _)| edge_ref)
        .expect("fixture has input-link");
    assert!(tested(&fixture.graph, input_link));
}

#[test]
fn triples_are_processed_in_source_order() {
    let mut fixture = state_graph();
    let early = Triple::condition("<io>", "input-link", "<il>");
    let diagnostics = run(
        &mut fixture.graph,
        vec![
            state_triple(),
            early.clone(),
            Triple::condition("<s>", "io", "<io>"),
        ],
    );
    assert_eq!(
        kinds(&diagnostics),
        vec![
            &DiagnosticKind::BadConstraint { triple: early },
            &DiagnosticKind::VariableNotMatched {
                variable: "<il>".to_owned()
            },
        ]
    );
}

#[test]
fn unseen_variable_is_reported_twice() {
    let mut fixture = state_graph();
    let bad = Triple::condition("<x>", "name", "idle");
    let diagnostics = run(&mut fixture.graph, vec![state_triple(), bad.clone()]);
    assert_eq!(
        kinds(&diagnostics),
        vec![
            &DiagnosticKind::BadConstraint { triple: bad },
            &DiagnosticKind::VariableNotMatched {
                variable: "<x>".to_owned()
            },
        ]
    );
}

#[test]
fn unmatched_reporting_can_be_disabled() {
    let mut fixture = state_graph();
    let config = CheckConfig {
        report_unmatched_variables: false,
        ..CheckConfig::default()
    };
    let diagnostics = run_with(
        &mut fixture.graph,
        vec![state_triple(), Triple::condition("<x>", "name", "idle")],
        &config,
    );
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind.code(), "bad-constraint");
}

#[test]
fn attribute_variable_matches_every_edge() {
    let mut fixture = state_graph();
    let diagnostics = run(
        &mut fixture.graph,
        vec![state_triple(), Triple::condition("<s>", "<attr>", "<value>")],
    );
    assert!(diagnostics.is_empty());
    for edge in [
        fixture.name_edge,
        fixture.io_edge,
        fixture.operator_edge,
        fixture.count_edge,
    ] {
        assert!(tested(&fixture.graph, edge), "{edge} should be tested");
    }
    assert!(!tested(&fixture.graph, fixture.operator_name_edge));
}

#[test]
fn attribute_variable_with_literal_value_filters_targets() {
    let mut fixture = state_graph();
    let diagnostics = run(
        &mut fixture.graph,
        vec![state_triple(), Triple::condition("<s>", "<attr>", "idle")],
    );
    assert!(diagnostics.is_empty());
    assert!(tested(&fixture.graph, fixture.name_edge));
    assert!(!tested(&fixture.graph, fixture.count_edge));
}

#[test]
fn leaf_bound_variable_matches_nothing() {
    let mut fixture = state_graph();
    let diagnostics = run(
        &mut fixture.graph,
        vec![
            state_triple(),
            Triple::condition("<s>", "name", "<n>"),
            Triple::condition("<n>", "anything", "<v>"),
        ],
    );
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].kind.code(), "bad-constraint");
    assert_eq!(
        diagnostics[1].kind,
        DiagnosticKind::VariableNotMatched {
            variable: "<v>".to_owned()
        }
    );
}

#[test]
fn action_marks_edge_created() {
    let mut fixture = state_graph();
    let diagnostics = run(
        &mut fixture.graph,
        vec![
            state_triple(),
            Triple::condition("<s>", "operator", "<o>"),
            Triple::action("<o>", "name", "wait"),
        ],
    );
    assert!(diagnostics.is_empty());
    assert!(tested(&fixture.graph, fixture.operator_edge));
    assert!(created(&fixture.graph, fixture.operator_name_edge));
    assert!(!tested(&fixture.graph, fixture.operator_name_edge));
}

#[test]
fn checking_leaves_topology_alone() {
    let mut fixture = state_graph();
    let vertices = fixture.graph.vertex_count();
    let edges = fixture.graph.edge_count();
    run(
        &mut fixture.graph,
        vec![
            state_triple(),
            Triple::condition("<s>", "<a>", "<b>"),
            Triple::action("<b>", "<c>", "<d>"),
        ],
    );
    assert_eq!(fixture.graph.vertex_count(), vertices);
    assert_eq!(fixture.graph.edge_count(), edges);
    fixture.graph.check_integrity().expect("still consistent");
}

// ---------------------------------------------------------------------------
// Batches and output
// ---------------------------------------------------------------------------

fn batch() -> Vec<Rule> {
    vec![
        rule(
            "clean",
            vec![state_triple(), Triple::condition("<s>", "name", "idle")],
        ),
        rule(
            "typo",
            vec![
                state_triple(),
                Triple::condition("<s>", "nmae", "idle").at_line(4),
            ],
        ),
        rule("stateless", vec![Triple::condition("<s>", "name", "idle")]),
    ]
}

#[test]
fn batch_summary_counts_rules_and_diagnostics() {
    let mut fixture = state_graph();
    let mut sink: Vec<Diagnostic> = Vec::new();
    let summary = check_rules(&mut fixture.graph, &batch(), &CheckConfig::default(), &mut sink);
    assert_eq!(
        summary,
        CheckSummary {
            rules_checked: 3,
            rules_with_diagnostics: 2,
            diagnostics: 2,
        }
    );
    assert!(!summary.is_clean());
    assert_eq!(sink[0].rule.name, "typo");
    assert_eq!(sink[0].line(), 4);
    assert_eq!(sink[1].rule.name, "stateless");
}

#[test]
fn empty_batch_is_clean() {
    let mut fixture = state_graph();
    let mut sink: Vec<Diagnostic> = Vec::new();
    let summary = check_rules(&mut fixture.graph, &[], &CheckConfig::default(), &mut sink);
    assert!(summary.is_clean());
    assert_eq!(summary.rules_checked, 0);
}

#[test]
fn repeated_runs_are_byte_identical() {
    let render = || {
        let mut fixture = state_graph();
        let mut sink: Vec<Diagnostic> = Vec::new();
        check_rules(&mut fixture.graph, &batch(), &CheckConfig::default(), &mut sink);
        let coverage: Vec<_> = fixture
            .graph
            .edges()
            .map(|(edge_ref, edge)| (edge_ref, edge.coverage()))
            .collect();
        (diagnostics_to_json(&sink).expect("serializable"), coverage)
    };
    assert_eq!(render(), render());
}

#[test]
fn rechecking_the_same_graph_changes_nothing() {
    let mut fixture = state_graph();
    let graph = &mut fixture.graph;
    let pass = |graph: &mut SchemaGraph| {
        let mut sink: Vec<Diagnostic> = Vec::new();
        let summary = check_rules(graph, &batch(), &CheckConfig::default(), &mut sink);
        let coverage: Vec<_> = graph
            .edges()
            .map(|(edge_ref, edge)| (edge_ref, edge.coverage()))
            .collect();
        (
            summary,
            diagnostics_to_json(&sink).expect("serializable"),
            coverage,
        )
    };

    let first = pass(graph);
    let second = pass(graph);
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1, "diagnostics JSON is stable");
    assert_eq!(first.2, second.2, "coverage flags are not toggled");
    assert!(second.2.iter().any(|(_, coverage)| coverage.tested));
    assert_eq!(graph.edge_count(), 7);
}
