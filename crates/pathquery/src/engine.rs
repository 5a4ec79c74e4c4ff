//! The evaluator: walks a document tree step by step according to a
//! compiled plan, narrowing a working context set and producing the result
//! sequence.

use crate::ast::{BareTest, Operand, PathExpression, Predicate, Scope, Selector, Step};
use crate::axes;
use crate::dom::DocumentNode;
use crate::error::PathError;
use crate::functions::Registry;
use crate::operators::OpValue;
use std::fmt;

/// One entry of a result sequence: a matched element or an extracted
/// string. Sequences are ordered and non-unique, reflecting document order
/// within each processed node-list.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult<N> {
    Element(N),
    Text(String),
}

impl<'a, N: DocumentNode<'a>> QueryResult<N> {
    pub fn as_element(&self) -> Option<N> {
        match self {
            QueryResult::Element(n) => Some(*n),
            QueryResult::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            QueryResult::Element(_) => None,
            QueryResult::Text(s) => Some(s),
        }
    }
}

/// An element renders as its concatenated text; this is also what
/// nested-predicate joins compare against.
impl<'a, N: DocumentNode<'a>> fmt::Display for QueryResult<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Element(n) => f.write_str(&n.text()),
            QueryResult::Text(s) => f.write_str(s),
        }
    }
}

impl PathExpression {
    /// Runs every alternative against `context` and concatenates the
    /// results in declaration order (union is concatenation, not a set).
    pub fn evaluate<'a, N: DocumentNode<'a>>(
        &self,
        context: &[N],
        registry: &Registry<'a, N>,
    ) -> Result<Vec<QueryResult<N>>, PathError> {
        evaluate(self, context, registry)
    }
}

/// Evaluates a compiled expression against a starting node-list.
pub fn evaluate<'a, N: DocumentNode<'a>>(
    expression: &PathExpression,
    context: &[N],
    registry: &Registry<'a, N>,
) -> Result<Vec<QueryResult<N>>, PathError> {
    let mut results = Vec::new();
    for chain in expression.chains() {
        results.extend(evaluate_chain(chain.steps(), context, registry)?);
    }
    Ok(results)
}

fn evaluate_chain<'a, N: DocumentNode<'a>>(
    steps: &[Step],
    context: &[N],
    registry: &Registry<'a, N>,
) -> Result<Vec<QueryResult<N>>, PathError> {
    let mut results = Vec::new();
    let mut context: Vec<N> = context.to_vec();
    let last_index = steps.len().saturating_sub(1);

    for (index, step) in steps.iter().enumerate() {
        match &step.selector {
            Selector::Attribute(key) => {
                // Attribute steps emit immediately and leave the context
                // untouched for any following step. Chaining navigation
                // after one is not forbidden, just pointless.
                for node in &context {
                    emit_attribute(*node, key, &mut results);
                    if step.scope == Scope::Recursive {
                        let mut below = Vec::new();
                        axes::collect_descendants(*node, &mut below);
                        for descendant in below {
                            emit_attribute(descendant, key, &mut results);
                        }
                    }
                }
            }
            Selector::Function(name) => {
                if step.scope == Scope::Recursive {
                    // Recursive function steps only support the implicit
                    // text extraction over the whole context.
                    let text = context
                        .iter()
                        .map(|n| n.text())
                        .collect::<Vec<_>>()
                        .join(" ");
                    results.push(QueryResult::Text(text));
                } else {
                    // A selection function's output replaces whatever this
                    // chain has produced so far.
                    results = registry.select(name)?(&context)?;
                }
            }
            Selector::Tag(_) => {
                let mut narrowed = Vec::new();
                for node in &context {
                    if step.scope == Scope::Recursive {
                        for candidate in axes::descendant_or_self(*node) {
                            if filter(candidate, step, registry)? {
                                narrowed.push(candidate);
                            }
                        }
                    } else {
                        let candidates = match &step.axis {
                            Some(axis) => registry.axis(axis)?(node),
                            None => node.children().collect(),
                        };
                        for candidate in candidates {
                            if filter(candidate, step, registry)? {
                                narrowed.push(candidate);
                            }
                        }
                    }
                }
                context = narrowed;
                if index == last_index {
                    results.extend(context.iter().copied().map(QueryResult::Element));
                }
            }
        }
    }
    Ok(results)
}

/// Emits an attribute value for one node. `*` renders the whole attribute
/// set; a keyed lookup skips blank and absent values.
fn emit_attribute<'a, N: DocumentNode<'a>>(node: N, key: &str, results: &mut Vec<QueryResult<N>>) {
    if key == "*" {
        let rendered = node
            .attributes()
            .map(|(k, v)| format!("{}=\"{}\"", k, v))
            .collect::<Vec<_>>()
            .join(" ");
        results.push(QueryResult::Text(rendered));
    } else if let Some(value) = node.attr(key) {
        if !value.trim().is_empty() {
            results.push(QueryResult::Text(value.to_string()));
        }
    }
}

/// A candidate survives if its tag matches the selector and the step's
/// predicate (if any) holds.
fn filter<'a, N: DocumentNode<'a>>(
    node: N,
    step: &Step,
    registry: &Registry<'a, N>,
) -> Result<bool, PathError> {
    let Selector::Tag(tag) = &step.selector else {
        return Ok(false);
    };
    if tag != "*" && tag != node.tag() {
        return Ok(false);
    }
    let Some(predicate) = &step.predicate else {
        return Ok(true);
    };

    match predicate {
        Predicate::Bare(test) => Ok(match test {
            BareTest::Position(wanted) => axes::same_tag_position(node) == *wanted,
            BareTest::Call(name) => registry.filter(name)?(&node)?.truthy(),
            BareTest::Attr(name) => node.attr(name).is_some(),
            BareTest::Literal(_) => false,
        }),
        Predicate::Comparison { left, op, right } => {
            let operator = registry.operator(op)?;
            let keep = match left {
                Operand::Call(name) => {
                    let value = registry.filter(name)?(&node)?.to_string();
                    match operator(&value, right) {
                        OpValue::Bool(keep) => keep,
                        // An integer outcome re-routes through positional
                        // matching, mirroring the bare-numeric predicate.
                        OpValue::Int(position) => {
                            axes::same_tag_position(node) as i64 == position
                        }
                        other => other.truthy(),
                    }
                }
                Operand::Attr(name) => {
                    let value = node.attr(name).unwrap_or("");
                    operator(value, right).truthy()
                }
                Operand::SubQuery(expression) => {
                    let joined: String = evaluate(expression, &[node], registry)?
                        .iter()
                        .map(ToString::to_string)
                        .collect();
                    operator(&joined, right).truthy()
                }
            };
            Ok(keep)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::tests::{TestNode, TestTree};
    use crate::parser::compile;

    /// <html>
    ///   <body id="root">
    ///     <div class="head"><span>ok</span></div>
    ///     <div>
    ///       <ul>
    ///         <li href="">one</li>
    ///         <li href="x2">two</li>
    ///         <li>three</li>
    ///       </ul>
    ///     </div>
    ///   </body>
    /// </html>
    fn sample() -> TestTree {
        let mut tree = TestTree::new("html");
        let body = tree.child(0, "body");
        tree.set_attr(body, "id", "root");
        let head = tree.child(body, "div");
        tree.set_attr(head, "class", "head");
        let span = tree.child(head, "span");
        tree.set_text(span, "ok");
        let div2 = tree.child(body, "div");
        let ul = tree.child(div2, "ul");
        let li1 = tree.child(ul, "li");
        tree.set_attr(li1, "href", "");
        tree.set_text(li1, "one");
        let li2 = tree.child(ul, "li");
        tree.set_attr(li2, "href", "x2");
        tree.set_text(li2, "two");
        let li3 = tree.child(ul, "li");
        tree.set_text(li3, "three");
        tree
    }

    fn texts(results: &[QueryResult<TestNode<'_>>]) -> Vec<String> {
        results.iter().map(ToString::to_string).collect()
    }

    fn run<'a>(
        expr: &str,
        tree: &'a TestTree,
        registry: &Registry<'a, TestNode<'a>>,
    ) -> Vec<QueryResult<TestNode<'a>>> {
        compile(expr)
            .unwrap()
            .evaluate(&[tree.root()], registry)
            .unwrap()
    }

    #[test]
    fn child_steps_narrow_in_document_order() {
        let tree = sample();
        let registry = Registry::new();
        let results = run("/body/div/ul/li", &tree, &registry);
        assert_eq!(texts(&results), vec!["one", "two", "three"]);
    }

    #[test]
    fn recursive_tag_search_covers_any_depth() {
        let tree = sample();
        let registry = Registry::new();
        let results = run("//li", &tree, &registry);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn recursive_tag_search_includes_the_context_node() {
        let tree = sample();
        let registry = Registry::new();
        // Evaluate `//html` starting at the <html> node itself.
        let results = run("//html", &tree, &registry);
        assert_eq!(results, vec![QueryResult::Element(tree.root())]);
    }

    #[test]
    fn positional_predicate_is_one_based_among_same_tags() {
        let tree = sample();
        let registry = Registry::new();
        let results = run("//li[2]", &tree, &registry);
        assert_eq!(texts(&results), vec!["two"]);
    }

    #[test]
    fn attribute_extraction_skips_blank_values() {
        let tree = sample();
        let registry = Registry::new();
        let results = run("//li/@href", &tree, &registry);
        assert_eq!(texts(&results), vec!["x2"]);
    }

    #[test]
    fn recursive_attribute_scope_is_inclusive_of_the_context() {
        let tree = sample();
        let registry = Registry::new();
        let body = tree.node(1);
        let results = compile("//@id")
            .unwrap()
            .evaluate(&[body], &registry)
            .unwrap();
        assert_eq!(texts(&results), vec!["root"]);
    }

    #[test]
    fn attribute_wildcard_renders_the_attribute_set() {
        let tree = sample();
        let registry = Registry::new();
        let results = run("/body/div/@*", &tree, &registry);
        assert_eq!(texts(&results), vec!["class=\"head\"", ""]);
    }

    #[test]
    fn wildcard_tag_with_attribute_existence_predicate() {
        let tree = sample();
        let registry = Registry::new();
        let results = run("//*[@class]", &tree, &registry);
        assert_eq!(results.len(), 1);
        let node = results[0].as_element().unwrap();
        assert_eq!(node.tag(), "div");
    }

    #[test]
    fn nested_expression_predicate_joins_descendant_text() {
        let tree = sample();
        let registry = Registry::new();
        let results = run("//div[.//span = \"ok\"]", &tree, &registry);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].as_element().unwrap().attr("class"), Some("head"));

        let none = run("//div[.//span = \"nope\"]", &tree, &registry);
        assert!(none.is_empty());
    }

    #[test]
    fn attribute_comparison_predicate() {
        let tree = sample();
        let registry = Registry::new();
        let results = run("//li[@href='x2']", &tree, &registry);
        assert_eq!(texts(&results), vec!["two"]);
        let none = run("//li[@href='missing']", &tree, &registry);
        assert!(none.is_empty());
    }

    #[test]
    fn filter_function_comparison_coerces_through_strings() {
        let tree = sample();
        let registry = Registry::new();
        let results = run("//li[text() = 'three']", &tree, &registry);
        assert_eq!(texts(&results), vec!["three"]);
    }

    #[test]
    fn bare_filter_function_uses_truthiness() {
        let tree = sample();
        let registry = Registry::new();
        let results = run("//li[last()]", &tree, &registry);
        assert_eq!(texts(&results), vec!["three"]);
        let results = run("//li[first()]", &tree, &registry);
        assert_eq!(texts(&results), vec!["one"]);
    }

    #[test]
    fn integer_operator_outcome_matches_by_position() {
        let tree = sample();
        let mut registry: Registry<'_, TestNode<'_>> = Registry::new();
        // An operator that *returns* an index instead of a verdict.
        registry.register_operator(
            "~",
            Box::new(|_, r| OpValue::Int(r.trim().parse().unwrap_or(0))),
        );
        let results = run("//li[text() ~ 2]", &tree, &registry);
        assert_eq!(texts(&results), vec!["two"]);
    }

    #[test]
    fn union_is_concatenation_in_declaration_order() {
        let tree = sample();
        let registry = Registry::new();
        let combined = run("//span | //li[1]", &tree, &registry);
        let mut separate = run("//span", &tree, &registry);
        separate.extend(run("//li[1]", &tree, &registry));
        assert_eq!(combined, separate);
        assert_eq!(texts(&combined), vec!["ok", "one"]);
    }

    #[test]
    fn selection_function_replaces_chain_results() {
        let tree = sample();
        let registry = Registry::new();
        let results = run("//li/text()", &tree, &registry);
        assert_eq!(texts(&results), vec!["one", "two", "three"]);
    }

    #[test]
    fn recursive_function_step_concatenates_context_text() {
        let tree = sample();
        let registry = Registry::new();
        let results = run("/body/div/ul/li//text()", &tree, &registry);
        assert_eq!(texts(&results), vec!["one two three"]);
    }

    #[test]
    fn mid_chain_attribute_step_leaves_context_intact() {
        let tree = sample();
        let registry = Registry::new();
        // The attribute step emits but does not narrow; the final tag step
        // still sees the <ul> context.
        let results = run("/body/div/ul/@id/li", &tree, &registry);
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.as_element().is_some()));
    }

    #[test]
    fn unknown_function_aborts_only_the_call() {
        let tree = sample();
        let registry = Registry::new();
        let compiled = compile("//li/bogus()").unwrap();
        assert_eq!(
            compiled.evaluate(&[tree.root()], &registry).unwrap_err(),
            PathError::UnknownFunction("bogus".into())
        );
        // The compiled expression stays reusable.
        let mut extended: Registry<'_, TestNode<'_>> = Registry::new();
        extended.register_select(
            "bogus",
            Box::new(|nodes| Ok(vec![QueryResult::Text(format!("{} nodes", nodes.len()))])),
        );
        let results = compiled.evaluate(&[tree.root()], &extended).unwrap();
        assert_eq!(texts(&results), vec!["3 nodes"]);
    }

    #[test]
    fn unknown_axis_and_operator_error() {
        let tree = sample();
        let registry = Registry::new();
        assert_eq!(
            compile("/body/sideways::div")
                .unwrap()
                .evaluate(&[tree.root()], &registry)
                .unwrap_err(),
            PathError::UnknownAxis("sideways".into())
        );
        assert_eq!(
            compile("//li[@href ~= 'x']")
                .unwrap()
                .evaluate(&[tree.root()], &registry)
                .unwrap_err(),
            PathError::UnknownOperator("~=".into())
        );
    }

    #[test]
    fn axis_steps_navigate_relatives() {
        let tree = sample();
        let registry = Registry::new();
        let results = run("//li[1]/following-sibling::li", &tree, &registry);
        assert_eq!(texts(&results), vec!["two", "three"]);
        let results = run("//span/parent::div", &tree, &registry);
        assert_eq!(results.len(), 1);
        let results = run("//ul/ancestor::body", &tree, &registry);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn empty_context_or_no_match_is_not_an_error() {
        let tree = sample();
        let registry = Registry::new();
        assert!(run("//table", &tree, &registry).is_empty());
        let empty: Vec<QueryResult<TestNode<'_>>> = compile("//li")
            .unwrap()
            .evaluate(&[], &registry)
            .unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn unrecognized_bare_predicate_never_matches() {
        let tree = sample();
        let registry = Registry::new();
        assert!(run("//li[whatever]", &tree, &registry).is_empty());
    }
}
