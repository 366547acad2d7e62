//! Per-rule variable bindings built up while triples are processed.
use std::collections::{BTreeMap, BTreeSet};

use crate::vertex::VertexId;

/// Maps each variable of one rule to the schema vertices (or, for attribute
/// variables, attribute names) it may stand for.
///
/// Variables are remembered in first-introduction order so that
/// unmatched-variable diagnostics come out in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingEnvironment {
    introduced: Vec<String>,
    vertices: BTreeMap<String, BTreeSet<VertexId>>,
    attributes: BTreeMap<String, BTreeSet<String>>,
}

impl BindingEnvironment {
    /// An environment with no variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `variable` occurs in the rule, with no bindings yet.
    pub fn introduce(&mut self, variable: &str) {
        if !self.vertices.contains_key(variable) {
            self.introduced.push(variable.to_owned());
            self.vertices.insert(variable.to_owned(), BTreeSet::new());
        }
    }

    /// Adds `vertex` to the candidates of `variable`.
    pub fn bind_vertex(&mut self, variable: &str, vertex: VertexId) {
        self.introduce(variable);
        if let Some(set) = self.vertices.get_mut(variable) {
            set.insert(vertex);
        }
    }

    /// Adds an attribute name to the candidates of an attribute variable.
    pub fn bind_attribute(&mut self, variable: &str, name: &str) {
        self.introduce(variable);
        self.attributes
            .entry(variable.to_owned())
            .or_default()
            .insert(name.to_owned());
    }

    /// Current vertex candidates of `variable`, ascending; empty if unseen.
    pub fn vertices(&self, variable: &str) -> Vec<VertexId> {
        self.vertices
            .get(variable)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Current attribute-name candidates of `variable`.
    pub fn attributes(&self, variable: &str) -> impl Iterator<Item = &str> {
        self.attributes
            .get(variable)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Returns `true` if `variable` has at least one binding of either sort.
    pub fn is_bound(&self, variable: &str) -> bool {
        self.vertices.get(variable).is_some_and(|set| !set.is_empty())
            || self.attributes.get(variable).is_some_and(|set| !set.is_empty())
    }

    /// Variables in first-introduction order.
    pub fn introduced(&self) -> &[String] {
        &self.introduced
    }

    /// Introduced variables that ended up with no binding, in
    /// first-introduction order.
    pub fn unmatched(&self) -> impl Iterator<Item = &str> {
        self.introduced
            .iter()
            .map(String::as_str)
            .filter(|variable| !self.is_bound(variable))
    }
}
