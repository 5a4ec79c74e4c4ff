//! Comparison operators usable inside predicates.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// A tagged operator (or filter-function) result.
///
/// Predicate handling matches on the category instead of inspecting runtime
/// types: a `Bool` is used directly, an `Int` re-routes through positional
/// matching, and anything else falls back to truthiness.
#[derive(Debug, Clone, PartialEq)]
pub enum OpValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl OpValue {
    /// The documented truthiness of each category.
    pub fn truthy(&self) -> bool {
        match self {
            OpValue::Bool(b) => *b,
            OpValue::Int(i) => *i != 0,
            OpValue::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for OpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpValue::Bool(b) => write!(f, "{}", b),
            OpValue::Int(i) => write!(f, "{}", i),
            OpValue::Text(s) => f.write_str(s),
        }
    }
}

/// A binary comparator over the string renderings of its operands.
pub type OperatorFn = Box<dyn Fn(&str, &str) -> OpValue + Send + Sync>;

/// Name-keyed operator lookup. Built-ins cover equality, inequality, and
/// ordering; embedders may register additional tokens (any run of
/// `= ! < > ~ ^` characters the parser accepts).
pub struct OperatorRegistry {
    ops: HashMap<String, OperatorFn>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            ops: HashMap::new(),
        };
        registry.register("=", Box::new(|l, r| OpValue::Bool(compare(l, r) == Ordering::Equal)));
        registry.register("!=", Box::new(|l, r| OpValue::Bool(compare(l, r) != Ordering::Equal)));
        registry.register(">", Box::new(|l, r| OpValue::Bool(compare(l, r) == Ordering::Greater)));
        registry.register("<", Box::new(|l, r| OpValue::Bool(compare(l, r) == Ordering::Less)));
        registry.register(">=", Box::new(|l, r| OpValue::Bool(compare(l, r) != Ordering::Less)));
        registry.register("<=", Box::new(|l, r| OpValue::Bool(compare(l, r) != Ordering::Greater)));
        registry
    }

    pub fn register(&mut self, token: impl Into<String>, f: OperatorFn) {
        self.ops.insert(token.into(), f);
    }

    pub fn get(&self, token: &str) -> Option<&OperatorFn> {
        self.ops.get(token)
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Numeric comparison when both operands parse as numbers, lexicographic
/// otherwise.
fn compare(left: &str, right: &str) -> Ordering {
    match (left.trim().parse::<f64>(), right.trim().parse::<f64>()) {
        (Ok(l), Ok(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
        _ => left.cmp(right),
    }
}
