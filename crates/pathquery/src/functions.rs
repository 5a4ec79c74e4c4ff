//! The select/filter/axis function registries — the engine's sole
//! extensibility seam.
//!
//! Three independent capability namespaces share one [`Registry`]:
//! selection functions consume a whole node-list and produce a result
//! sequence, filter functions consume one node and produce a tagged scalar,
//! and axis functions consume one node and produce the candidate node-list
//! for a step. New axes and functions are added here without touching the
//! parser or the evaluator. Lookups miss at evaluation time, not compile
//! time, so registries may be extended after expressions are compiled.

use crate::axes;
use crate::dom::DocumentNode;
use crate::engine::QueryResult;
use crate::error::PathError;
use crate::operators::{OpValue, OperatorFn, OperatorRegistry};
use std::collections::HashMap;

/// A selection function: consumes the current context, returns the result
/// sequence that replaces the chain's output.
pub type SelectFn<'a, N> =
    Box<dyn Fn(&[N]) -> Result<Vec<QueryResult<N>>, PathError> + Send + Sync + 'a>;

/// A filter function: consumes one node, returns a tagged scalar for
/// predicate evaluation.
pub type FilterFn<'a, N> = Box<dyn Fn(&N) -> Result<OpValue, PathError> + Send + Sync + 'a>;

/// An axis function: consumes one node, returns the candidate node-list for
/// the step.
pub type AxisFn<'a, N> = Box<dyn Fn(&N) -> Vec<N> + Send + Sync + 'a>;

/// The registry handed by reference into every evaluation.
///
/// Built once (typically at startup) via [`Registry::new`]; it is
/// `Send + Sync`, so embedders that want a process-wide instance can park it
/// behind an `Arc` or `OnceLock`. Registration during concurrent evaluation
/// is not supported.
pub struct Registry<'a, N: DocumentNode<'a>> {
    select: HashMap<String, SelectFn<'a, N>>,
    filter: HashMap<String, FilterFn<'a, N>>,
    axis: HashMap<String, AxisFn<'a, N>>,
    operators: OperatorRegistry,
}

impl<'a, N: DocumentNode<'a>> Registry<'a, N> {
    /// A registry with the built-in functions, axes, and operators
    /// installed.
    pub fn new() -> Self {
        let mut registry = Self {
            select: HashMap::new(),
            filter: HashMap::new(),
            axis: HashMap::new(),
            operators: OperatorRegistry::new(),
        };
        registry.install_builtins();
        registry
    }

    pub fn register_select(&mut self, name: impl Into<String>, f: SelectFn<'a, N>) {
        self.select.insert(name.into(), f);
    }

    pub fn register_filter(&mut self, name: impl Into<String>, f: FilterFn<'a, N>) {
        self.filter.insert(name.into(), f);
    }

    pub fn register_axis(&mut self, name: impl Into<String>, f: AxisFn<'a, N>) {
        self.axis.insert(name.into(), f);
    }

    pub fn register_operator(&mut self, token: impl Into<String>, f: OperatorFn) {
        self.operators.register(token, f);
    }

    pub fn select(&self, name: &str) -> Result<&SelectFn<'a, N>, PathError> {
        self.select
            .get(name)
            .ok_or_else(|| PathError::UnknownFunction(name.to_string()))
    }

    pub fn filter(&self, name: &str) -> Result<&FilterFn<'a, N>, PathError> {
        self.filter
            .get(name)
            .ok_or_else(|| PathError::UnknownFunction(name.to_string()))
    }

    pub fn axis(&self, name: &str) -> Result<&AxisFn<'a, N>, PathError> {
        self.axis
            .get(name)
            .ok_or_else(|| PathError::UnknownAxis(name.to_string()))
    }

    pub fn operator(&self, token: &str) -> Result<&OperatorFn, PathError> {
        self.operators
            .get(token)
            .ok_or_else(|| PathError::UnknownOperator(token.to_string()))
    }

    fn install_builtins(&mut self) {
        // Selection functions.
        self.register_select(
            "text",
            Box::new(|nodes: &[N]| {
                Ok(nodes
                    .iter()
                    .map(|n| QueryResult::Text(n.text()))
                    .collect())
            }),
        );
        self.register_select(
            "node",
            Box::new(|nodes: &[N]| Ok(nodes.iter().copied().map(QueryResult::Element).collect())),
        );

        // Filter functions.
        self.register_filter("text", Box::new(|n: &N| Ok(OpValue::Text(n.text()))));
        self.register_filter(
            "position",
            Box::new(|n: &N| Ok(OpValue::Int(axes::same_tag_position(*n) as i64))),
        );
        self.register_filter(
            "first",
            Box::new(|n: &N| {
                let earlier = axes::preceding_siblings(*n)
                    .iter()
                    .any(|s| s.tag() == n.tag());
                Ok(OpValue::Bool(!earlier))
            }),
        );
        self.register_filter(
            "last",
            Box::new(|n: &N| {
                let later = axes::following_siblings(*n)
                    .iter()
                    .any(|s| s.tag() == n.tag());
                Ok(OpValue::Bool(!later))
            }),
        );

        // Axis functions.
        self.register_axis(
            "parent",
            Box::new(|n: &N| n.parent().into_iter().collect()),
        );
        self.register_axis("ancestor", Box::new(|n: &N| axes::ancestors(*n)));
        self.register_axis("self", Box::new(|n: &N| vec![*n]));
        self.register_axis("child", Box::new(|n: &N| n.children().collect()));
        self.register_axis(
            "descendant",
            Box::new(|n: &N| {
                let mut results = Vec::new();
                axes::collect_descendants(*n, &mut results);
                results
            }),
        );
        self.register_axis(
            "descendant-or-self",
            Box::new(|n: &N| axes::descendant_or_self(*n)),
        );
        self.register_axis(
            "following-sibling",
            Box::new(|n: &N| axes::following_siblings(*n)),
        );
        self.register_axis(
            "preceding-sibling",
            Box::new(|n: &N| axes::preceding_siblings(*n)),
        );
        self.register_axis("sibling", Box::new(|n: &N| axes::siblings(*n)));
    }
}

impl<'a, N: DocumentNode<'a>> Default for Registry<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}
