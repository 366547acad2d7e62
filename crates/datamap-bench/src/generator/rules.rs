//! Rule strategies: random walks from the root turned into chained
//! condition and action triples, with optional misspelled attributes.

use datamap_core::{Rule, RuleContext, SchemaGraph, Triple, VertexId, VertexKind};
use rand::Rng;
use rand::rngs::StdRng;

use super::GeneratorConfig;

/// Suffix appended to an attribute name to make a triple that never matches.
pub const TYPO_SUFFIX: &str = "-typo";

/// A literal every vertex of `kind` accepts, or `None` for identifiers.
fn accepted_literal(kind: &VertexKind) -> Option<String> {
    match kind {
        VertexKind::Identifier => None,
        VertexKind::Enumeration { values } => values.first().cloned(),
        VertexKind::IntegerRange(range) => Some(range.low.unwrap_or(0).to_string()),
        VertexKind::FloatRange(range) => Some(format!("{:?}", range.low.unwrap_or(0.0))),
        VertexKind::StringValue => Some("text".to_owned()),
    }
}

/// Builds `config.num_rules` rules.
///
/// Each rule starts with the state triple and walks at most
/// `config.triples_per_rule` edges. An identifier target introduces a fresh
/// variable and the walk continues from it; a leaf target gets an accepted
/// literal and the walk restarts at the state variable. Without noise every
/// generated rule checks clean.
pub fn build_rules(
    config: &GeneratorConfig,
    graph: &SchemaGraph,
    rng: &mut StdRng,
) -> Vec<Rule> {
    let noise = config.noise_fraction.clamp(0.0, 1.0);
    (0..config.num_rules)
        .map(|r| {
            let mut triples = vec![Triple::condition("<s>", "state", "root")];
            let mut variable = "<s>".to_owned();
            let mut current: VertexId = graph.root();

            for t in 0..config.triples_per_rule {
                let Ok(edges) = graph.emanating_edges(current) else {
                    break;
                };
                if edges.is_empty() {
                    break;
                }
                let edge = &edges[rng.gen_range(0..edges.len())];

                if rng.gen_bool(noise) {
                    let name = format!("{}{TYPO_SUFFIX}", edge.name());
                    triples.push(Triple::condition(variable.as_str(), name.as_str(), "x"));
                    continue;
                }

                let Ok(target) = graph.vertex(edge.target()) else {
                    break;
                };
                match accepted_literal(target.kind()) {
                    None => {
                        let next = format!("<v{t}>");
                        triples.push(Triple::condition(
                            variable.as_str(),
                            edge.name(),
                            next.as_str(),
                        ));
                        variable = next;
                        current = target.id();
                    }
                    Some(literal) => {
                        let triple = if rng.gen_bool(0.2) {
                            Triple::action(variable.as_str(), edge.name(), literal.as_str())
                        } else {
                            Triple::condition(variable.as_str(), edge.name(), literal.as_str())
                        };
                        triples.push(triple);
                        variable = "<s>".to_owned();
                        current = graph.root();
                    }
                }
            }

            Rule::new(RuleContext::new(format!("rule-{r}"), r * 10 + 1, 1), triples)
        })
        .collect()
}
