//! Datamap and rule generator and benchmark utilities for `datamap-core`.
//!
//! This crate provides deterministic generation of schema graphs and rule
//! batches for benchmarking and property-based testing.

pub mod generator;

pub use generator::{GeneratorConfig, SizeTier, generate_rules, generate_schema};
