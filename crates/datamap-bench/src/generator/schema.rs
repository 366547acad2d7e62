//! Schema strategies: identifier spanning tree, typed leaves, union
//! attributes, shared identifier links, and optional back edges.

use datamap_core::{FloatRange, GraphError, IntegerRange, SchemaGraph, VertexKind};
use rand::Rng;
use rand::rngs::StdRng;

use super::GeneratorConfig;

/// Symbols used for every generated enumeration.
pub const ENUM_VALUES: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

fn leaf_kind(rng: &mut StdRng) -> VertexKind {
    match rng.gen_range(0..4u8) {
        0 => VertexKind::enumeration(ENUM_VALUES),
        1 => VertexKind::IntegerRange(IntegerRange {
            low: Some(0),
            high: Some(100),
        }),
        2 => VertexKind::FloatRange(FloatRange {
            low: Some(0.0),
            high: Some(1.0),
        }),
        _ => VertexKind::StringValue,
    }
}

/// Builds the whole schema. Identifier `i > 0` hangs under identifier
/// `(i - 1) / branching_factor`, so the tree is breadth-first numbered.
pub fn build_schema(
    config: &GeneratorConfig,
    rng: &mut StdRng,
) -> Result<SchemaGraph, GraphError> {
    let branching = config.branching_factor.max(1);
    let per_identifier = 1 + config.leaves_per_identifier * 2;
    let mut graph = SchemaGraph::with_capacity(config.num_identifiers * per_identifier);

    let mut identifiers = vec![graph.root()];
    for i in 1..config.num_identifiers {
        let parent = identifiers[(i - 1) / branching];
        let child = graph.add_vertex(VertexKind::Identifier);
        graph.add_edge(parent, format!("node-{i}"), child, None)?;
        identifiers.push(child);
    }

    for &identifier in &identifiers {
        for k in 0..config.leaves_per_identifier {
            let name = format!("leaf-{k}");
            let leaf = graph.add_vertex(leaf_kind(rng));
            graph.add_edge(identifier, name.clone(), leaf, None)?;
            if rng.gen_bool(config.union_fraction.clamp(0.0, 1.0)) {
                let alternative = graph.add_vertex(VertexKind::StringValue);
                graph.add_edge(identifier, name, alternative, None)?;
            }
        }
    }

    // Shared links always point at a higher-numbered identifier so they
    // never close a cycle on their own.
    let shared = (config.num_identifiers as f64 * config.shared_fraction) as usize;
    if identifiers.len() > 1 {
        for n in 0..shared {
            let from = rng.gen_range(0..identifiers.len() - 1);
            let to = rng.gen_range(from + 1..identifiers.len());
            graph.add_edge(
                identifiers[from],
                format!("shared-{n}"),
                identifiers[to],
                None,
            )?;
        }
    }

    if config.inject_cycles {
        let first_leaf_level = identifiers.len().saturating_sub(branching).max(1);
        let root = graph.root();
        for &deep in identifiers.iter().skip(first_leaf_level) {
            graph.add_edge(deep, "superstate", root, None)?;
        }
    }

    Ok(graph)
}
