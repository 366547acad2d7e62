//! Conformance checking of rule patterns against a schema graph.
//!
//! Each rule is checked in one forward pass over its triples:
//!
//! 1. **Initialize.** Exactly one triple must use the reserved state
//!    attribute; its variable is bound to the root. Zero or several such
//!    triples end the rule with a single diagnostic.
//! 2. **Propagate.** Every other triple, in source order, is matched
//!    against the emanating edges of the vertices its variable is bound to.
//!    Matching edges get their `tested` (condition) or `created` (action)
//!    flag set, and a value variable picks up the edge targets. A triple
//!    with no match is reported as a bad constraint; checking continues.
//! 3. **Finalize.** Every variable of the rule that never bound anything is
//!    reported.
//!
//! Triples never revisit earlier ones, so source order is significant. The
//! checker only ever writes coverage flags; topology is untouched.

pub mod bindings;
pub mod triple;

#[cfg(test)]
mod tests;

use serde::Serialize;
use tracing::{debug, trace};

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::edge::EdgeRef;
use crate::graph::SchemaGraph;
use crate::vertex::VertexId;

pub use bindings::BindingEnvironment;
pub use triple::{Rule, RuleContext, Token, Triple};

/// Knobs for a checking pass.
///
/// # Default
///
/// ```
/// # use datamap_core::CheckConfig;
/// let cfg = CheckConfig::default();
/// assert_eq!(cfg.state_attribute, "state");
/// assert_eq!(cfg.operator_attribute, "operator");
/// assert!(cfg.check_literal_values);
/// assert!(cfg.report_unmatched_variables);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    /// Attribute name that marks the triple binding the state variable.
    pub state_attribute: String,
    /// Attribute under which numeric literal values are not checked.
    pub operator_attribute: String,
    /// Require a literal value to be accepted by the edge target.
    pub check_literal_values: bool,
    /// Emit [`DiagnosticKind::VariableNotMatched`] at the end of each rule.
    pub report_unmatched_variables: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            state_attribute: "state".to_owned(),
            operator_attribute: "operator".to_owned(),
            check_literal_values: true,
            report_unmatched_variables: true,
        }
    }
}

/// Totals for a batch of rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CheckSummary {
    /// Rules checked.
    pub rules_checked: usize,
    /// Rules that produced at least one diagnostic.
    pub rules_with_diagnostics: usize,
    /// Diagnostics emitted across all rules.
    pub diagnostics: usize,
}

impl CheckSummary {
    /// Returns `true` if no rule produced a diagnostic.
    pub fn is_clean(&self) -> bool {
        self.diagnostics == 0
    }
}

/// Checks one rule, reporting into `sink` and updating edge coverage.
///
/// Returns the number of diagnostics reported for this rule.
pub fn check_rule(
    graph: &mut SchemaGraph,
    rule: &Rule,
    config: &CheckConfig,
    sink: &mut dyn DiagnosticSink,
) -> usize {
    let mut emitted = 0usize;
    let mut report = |kind: DiagnosticKind| {
        sink.report(Diagnostic::new(rule.context.clone(), kind));
        emitted += 1;
    };

    let is_state_triple = |triple: &&Triple| {
        triple.attribute.as_literal() == Some(config.state_attribute.as_str())
    };

    let state_triples: Vec<&Triple> = rule
        .triples
        .iter()
        .filter(|triple| is_state_triple(triple))
        .collect();
    let state_variable = match state_triples.as_slice() {
        [] => {
            report(DiagnosticKind::NoStateVariable);
            debug!(rule = %rule.context.name, "rule has no state variable");
            return emitted;
        }
        [single] => single.variable.as_str(),
        [_, _, ..] => {
            report(DiagnosticKind::TooManyStateVariables {
                count: state_triples.len(),
            });
            debug!(
                rule = %rule.context.name,
                count = state_triples.len(),
                "rule has several state variables"
            );
            return emitted;
        }
    };

    let mut env = BindingEnvironment::new();
    env.bind_vertex(state_variable, graph.root());

    for triple in rule.triples.iter().filter(|triple| !is_state_triple(triple)) {
        if !propagate(graph, triple, config, &mut env) {
            trace!(rule = %rule.context.name, %triple, "no matching edge");
            report(DiagnosticKind::BadConstraint {
                triple: triple.clone(),
            });
        }
    }

    if config.report_unmatched_variables {
        for variable in env.unmatched() {
            report(DiagnosticKind::VariableNotMatched {
                variable: variable.to_owned(),
            });
        }
    }

    debug!(
        rule = %rule.context.name,
        triples = rule.triples.len(),
        diagnostics = emitted,
        "checked rule"
    );
    emitted
}

/// Checks every rule in order against the same graph.
pub fn check_rules(
    graph: &mut SchemaGraph,
    rules: &[Rule],
    config: &CheckConfig,
    sink: &mut dyn DiagnosticSink,
) -> CheckSummary {
    let mut summary = CheckSummary::default();
    for rule in rules {
        let emitted = check_rule(graph, rule, config, sink);
        summary.rules_checked += 1;
        summary.diagnostics += emitted;
        if emitted > 0 {
            summary.rules_with_diagnostics += 1;
        }
    }
    debug!(
        rules = summary.rules_checked,
        diagnostics = summary.diagnostics,
        "checked rule batch"
    );
    summary
}

/// Edges and bindings one triple produced.
#[derive(Default)]
struct TripleMatch {
    edges: Vec<EdgeRef>,
    values: Vec<VertexId>,
    attributes: Vec<String>,
}

/// Matches one triple, applying coverage and bindings. Returns `false` if
/// nothing matched.
fn propagate(
    graph: &mut SchemaGraph,
    triple: &Triple,
    config: &CheckConfig,
    env: &mut BindingEnvironment,
) -> bool {
    env.introduce(&triple.variable);
    if let Some(variable) = triple.attribute.as_variable() {
        env.introduce(variable);
    }
    if let Some(variable) = triple.value.as_variable() {
        env.introduce(variable);
    }

    if triple.attribute.as_literal() == Some(config.operator_attribute.as_str())
        && triple.value.is_numeric_literal()
    {
        trace!(%triple, "skipping numeric operator value");
        return true;
    }

    let found = collect_matches(graph, triple, config, env);
    if found.edges.is_empty() {
        return false;
    }

    for &edge_ref in &found.edges {
        if let Ok(edge) = graph.edge_mut(edge_ref) {
            if triple.is_condition {
                edge.mark_tested();
            } else {
                edge.mark_created();
            }
        }
    }
    if let Some(variable) = triple.value.as_variable() {
        for &target in &found.values {
            env.bind_vertex(variable, target);
        }
    }
    if let Some(variable) = triple.attribute.as_variable() {
        for name in &found.attributes {
            env.bind_attribute(variable, name);
        }
    }
    true
}

fn collect_matches(
    graph: &SchemaGraph,
    triple: &Triple,
    config: &CheckConfig,
    env: &BindingEnvironment,
) -> TripleMatch {
    let mut found = TripleMatch::default();

    for source in env.vertices(&triple.variable) {
        let Ok(vertex) = graph.vertex(source) else {
            continue;
        };
        if !vertex.is_identifier() {
            continue;
        }
        let Ok(edges) = graph.emanating_edges(source) else {
            continue;
        };

        for (position, edge) in edges.iter().enumerate() {
            let name_matches = match &triple.attribute {
                Token::Literal(name) => edge.name() == name,
                Token::Variable(_) => true,
            };
            if !name_matches {
                continue;
            }

            let value_matches = match &triple.value {
                Token::Variable(_) => true,
                Token::Literal(literal) => {
                    !config.check_literal_values
                        || graph
                            .vertex(edge.target())
                            .is_ok_and(|target| target.kind().accepts(literal))
                }
            };
            if !value_matches {
                continue;
            }

            found.edges.push(EdgeRef { source, position });
            found.values.push(edge.target());
            if triple.attribute.as_variable().is_some() {
                found.attributes.push(edge.name().to_owned());
            }
        }
    }

    found
}
