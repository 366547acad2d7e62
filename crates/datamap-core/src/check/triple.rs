//! Rule patterns as the external rule parser hands them over.
use std::fmt;

use serde::Serialize;

/// One position of a triple: a rule-scoped variable or a literal constant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "token", content = "text", rename_all = "snake_case")]
pub enum Token {
    /// A placeholder standing for an unknown vertex or attribute name.
    Variable(String),
    /// A constant symbol, string, or number.
    Literal(String),
}

impl Token {
    /// Classifies rule text: `<name>` is a variable, anything else a
    /// literal.
    pub fn parse(text: &str) -> Self {
        let is_variable = text.len() > 2 && text.starts_with('<') && text.ends_with('>');
        if is_variable {
            Self::Variable(text.to_owned())
        } else {
            Self::Literal(text.to_owned())
        }
    }

    /// Creates a variable token.
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Creates a literal token.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// The token's text.
    pub fn text(&self) -> &str {
        match self {
            Self::Variable(text) | Self::Literal(text) => text,
        }
    }

    /// The variable name, if this is a variable.
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Self::Variable(name) => Some(name),
            Self::Literal(_) => None,
        }
    }

    /// The literal text, if this is a literal.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Variable(_) => None,
            Self::Literal(text) => Some(text),
        }
    }

    /// Returns `true` if this is a literal that reads as a finite number.
    pub fn is_numeric_literal(&self) -> bool {
        self.as_literal().is_some_and(|text| {
            text.parse::<i64>().is_ok() || text.parse::<f64>().is_ok_and(f64::is_finite)
        })
    }
}

impl From<&str> for Token {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// A `(variable, attribute, value)` fact extracted from one rule.
///
/// `is_condition` distinguishes left-hand-side tests from right-hand-side
/// actions, which decides whether a match sets an edge's `tested` or
/// `created` flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Triple {
    /// The identifier variable the attribute hangs off.
    pub variable: String,
    /// The attribute name, literal or variable.
    pub attribute: Token,
    /// The value, literal or variable.
    pub value: Token,
    /// `true` for a condition, `false` for an action.
    pub is_condition: bool,
    /// Source line within the rule file, when the parser knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Triple {
    /// A condition triple.
    pub fn condition(
        variable: impl Into<String>,
        attribute: impl Into<Token>,
        value: impl Into<Token>,
    ) -> Self {
        Self {
            variable: variable.into(),
            attribute: attribute.into(),
            value: value.into(),
            is_condition: true,
            line: None,
        }
    }

    /// An action triple.
    pub fn action(
        variable: impl Into<String>,
        attribute: impl Into<Token>,
        value: impl Into<Token>,
    ) -> Self {
        Self {
            is_condition: false,
            ..Self::condition(variable, attribute, value)
        }
    }

    /// Attaches a source line.
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} ^{} {})", self.variable, self.attribute, self.value)
    }
}

/// Where a rule lives, echoed unchanged on every diagnostic it produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct RuleContext {
    /// The rule's name.
    pub name: String,
    /// One-based line of the rule's start in its source file.
    pub line: usize,
    /// One-based column of the rule's start.
    pub column: usize,
}

impl RuleContext {
    /// Context for a rule named `name` starting at `line:column`.
    pub fn new(name: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            name: name.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for RuleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.name, self.line, self.column)
    }
}

/// A rule's context and its triples in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Opaque location information.
    pub context: RuleContext,
    /// Triples in the order they appear in the rule source.
    pub triples: Vec<Triple>,
}

impl Rule {
    /// Bundles a context with its triples.
    pub fn new(context: RuleContext, triples: Vec<Triple>) -> Self {
        Self { context, triples }
    }
}
