//! Diagnostic records produced by the conformance checker.
//!
//! Findings are data, not errors: one malformed rule never stops the rest
//! of a project from being checked. Every [`Diagnostic`] carries the
//! [`RuleContext`] it came from so the editor can jump back to the rule.
use std::fmt;

use serde::Serialize;

use crate::check::triple::{RuleContext, Triple};

/// What went wrong in a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// No triple binds a variable to the root state. Terminal for the rule.
    NoStateVariable,
    /// More than one triple binds a state variable. Terminal for the rule.
    TooManyStateVariables {
        /// Number of state-binding triples found.
        count: usize,
    },
    /// No bound vertex has an edge matching the triple.
    BadConstraint {
        /// The offending triple.
        triple: Triple,
    },
    /// A variable used in the rule never bound to anything.
    VariableNotMatched {
        /// The variable's name as written in the rule.
        variable: String,
    },
}

impl DiagnosticKind {
    /// Stable, machine-readable code for the kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoStateVariable => "no-state-variable",
            Self::TooManyStateVariables { .. } => "too-many-state-variables",
            Self::BadConstraint { .. } => "bad-constraint",
            Self::VariableNotMatched { .. } => "variable-not-matched",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoStateVariable => f.write_str("no state variable in rule"),
            Self::TooManyStateVariables { count } => {
                write!(f, "{count} state variables in rule, expected one")
            }
            Self::BadConstraint { triple } => {
                write!(f, "{triple} does not match the datamap")
            }
            Self::VariableNotMatched { variable } => {
                write!(f, "variable {variable} is never matched")
            }
        }
    }
}

/// A single checker finding, attributed to its rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// The rule that produced the finding.
    pub rule: RuleContext,
    /// The finding itself.
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Constructs a new [`Diagnostic`].
    pub fn new(rule: RuleContext, kind: DiagnosticKind) -> Self {
        Self { rule, kind }
    }

    /// Best source line for the finding: the triple's own line when known,
    /// otherwise the rule's.
    pub fn line(&self) -> usize {
        match &self.kind {
            DiagnosticKind::BadConstraint { triple } => triple.line.unwrap_or(self.rule.line),
            DiagnosticKind::NoStateVariable
            | DiagnosticKind::TooManyStateVariables { .. }
            | DiagnosticKind::VariableNotMatched { .. } => self.rule.line,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: [{}] {}",
            self.rule.name,
            self.line(),
            self.kind.code(),
            self.kind
        )
    }
}

/// Receives diagnostics as the checker produces them.
///
/// The sink belongs to the caller. `Vec<Diagnostic>` implements it by
/// pushing, which is what batch lint passes and tests use.
pub trait DiagnosticSink {
    /// Accepts one diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Renders diagnostics as a JSON array for the editor's reporting layer.
///
/// # Errors
///
/// Propagates any [`serde_json::Error`] from serialization.
pub fn diagnostics_to_json(diagnostics: &[Diagnostic]) -> Result<String, serde_json::Error> {
    serde_json::to_string(diagnostics)
}
