//! Schema graph and rule batch generator.
//!
//! Produces [`SchemaGraph`] instances shaped like real agent datamaps (a
//! wide identifier tree with typed leaves, union attributes and shared
//! identifiers) plus rule batches that walk them.

pub mod rules;
pub mod schema;

use datamap_core::{GraphError, Rule, SchemaGraph};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Configuration for the generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Seed for the random number generator (deterministic).
    pub seed: u64,
    /// Number of identifier vertices, root included.
    pub num_identifiers: usize,
    /// Children per identifier in the spanning tree.
    pub branching_factor: usize,
    /// Leaf attributes hung off each identifier.
    pub leaves_per_identifier: usize,
    /// Fraction of leaf attributes that get a second, string-typed edge of
    /// the same name (0.0-1.0).
    pub union_fraction: f64,
    /// Extra identifier-to-identifier links, as a fraction of identifiers.
    pub shared_fraction: f64,
    /// Whether to link deep identifiers back to the root.
    pub inject_cycles: bool,
    /// Number of rules to generate.
    pub num_rules: usize,
    /// Upper bound on non-state triples per rule.
    pub triples_per_rule: usize,
    /// Fraction of triples with a misspelled attribute (0.0-1.0).
    pub noise_fraction: f64,
}

/// Predefined size tiers for benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    /// ~40 identifiers, ~200 vertices, 50 rules
    Small,
    /// ~400 identifiers, ~2000 vertices, 500 rules
    Medium,
    /// ~2000 identifiers, ~12000 vertices, 2000 rules
    Large,
    /// ~8000 identifiers, ~50000 vertices, 5000 rules
    XLarge,
}

impl SizeTier {
    /// Returns the default `GeneratorConfig` for this size tier.
    pub fn config(self, seed: u64) -> GeneratorConfig {
        match self {
            SizeTier::Small => GeneratorConfig {
                seed,
                num_identifiers: 40,
                branching_factor: 3,
                leaves_per_identifier: 4,
                union_fraction: 0.1,
                shared_fraction: 0.1,
                inject_cycles: false,
                num_rules: 50,
                triples_per_rule: 6,
                noise_fraction: 0.05,
            },
            SizeTier::Medium => GeneratorConfig {
                seed,
                num_identifiers: 400,
                branching_factor: 4,
                leaves_per_identifier: 4,
                union_fraction: 0.1,
                shared_fraction: 0.15,
                inject_cycles: false,
                num_rules: 500,
                triples_per_rule: 8,
                noise_fraction: 0.05,
            },
            SizeTier::Large => GeneratorConfig {
                seed,
                num_identifiers: 2000,
                branching_factor: 5,
                leaves_per_identifier: 5,
                union_fraction: 0.15,
                shared_fraction: 0.15,
                inject_cycles: false,
                num_rules: 2000,
                triples_per_rule: 10,
                noise_fraction: 0.05,
            },
            SizeTier::XLarge => GeneratorConfig {
                seed,
                num_identifiers: 8000,
                branching_factor: 6,
                leaves_per_identifier: 5,
                union_fraction: 0.15,
                shared_fraction: 0.2,
                inject_cycles: false,
                num_rules: 5000,
                triples_per_rule: 12,
                noise_fraction: 0.05,
            },
        }
    }
}

/// Generates a schema graph from the given configuration.
///
/// All randomness is deterministic, seeded from `config.seed`.
///
/// # Errors
///
/// Propagates any [`GraphError`] from graph construction.
pub fn generate_schema(config: &GeneratorConfig) -> Result<SchemaGraph, GraphError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    schema::build_schema(config, &mut rng)
}

/// Generates a rule batch walking `graph`.
///
/// Seeded from `config.seed` independently of [`generate_schema`], so the
/// same configuration always yields the same rules for the same graph.
pub fn generate_rules(config: &GeneratorConfig, graph: &SchemaGraph) -> Vec<Rule> {
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
    rules::build_rules(config, graph, &mut rng)
}
