//! The compiled query plan produced by the parser and consumed by the engine.

use std::fmt;

/// A compiled path expression: one [`StepChain`] per `|`-separated
/// alternative, plus the original source text for diagnostics.
///
/// Compilation is pure. An expression is immutable once built and may be
/// evaluated any number of times against different trees.
#[derive(Debug, Clone, PartialEq)]
pub struct PathExpression {
    source: String,
    chains: Vec<StepChain>,
}

impl PathExpression {
    pub(crate) fn new(source: String, chains: Vec<StepChain>) -> Self {
        Self { source, chains }
    }

    /// The original textual form of the expression.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn chains(&self) -> &[StepChain] {
        &self.chains
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// The ordered steps of one union alternative.
#[derive(Debug, Clone, PartialEq)]
pub struct StepChain {
    steps: Vec<Step>,
}

impl StepChain {
    pub(crate) fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

/// A single step of a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub selector: Selector,
    /// Axis designator (`parent::li` carries `parent`); `None` means the
    /// default children axis.
    pub axis: Option<String>,
    pub scope: Scope,
    pub predicate: Option<Predicate>,
}

/// Whether a step searches direct relatives or the whole subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// `/step`: candidates come from the axis (children by default).
    Normal,
    /// `//step`: candidates are the context node itself and every
    /// descendant.
    Recursive,
}

/// The selector kind, determined lexically: `@name` is an attribute,
/// `name()` a function, everything else a tag (`*` matches any tag).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Tag(String),
    Attribute(String),
    Function(String),
}

/// The bracketed filter condition attached to a step.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Bare(BareTest),
    Comparison {
        left: Operand,
        op: String,
        right: String,
    },
}

/// A predicate with no operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BareTest {
    /// `[3]`: 1-based position among same-tag siblings.
    Position(usize),
    /// `[fn()]`: truthiness of a filter function.
    Call(String),
    /// `[@attr]`: attribute existence.
    Attr(String),
    /// Any other bare token. Never matches an element.
    Literal(String),
}

/// The left side of a binary predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Call(String),
    Attr(String),
    /// A left side that is neither a call nor an attribute is a nested path
    /// expression, evaluated against the candidate node alone.
    SubQuery(Box<PathExpression>),
}
