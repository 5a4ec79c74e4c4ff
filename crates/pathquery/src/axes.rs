//! Derived, document-order navigation over [`DocumentNode`] trees.

use crate::dom::DocumentNode;

/// Appends every descendant of `node` (excluding `node` itself) in document
/// order.
pub fn collect_descendants<'a, N: DocumentNode<'a>>(node: N, results: &mut Vec<N>) {
    for child in node.children() {
        results.push(child);
        collect_descendants(child, results);
    }
}

/// `node` followed by all its descendants, in document order.
pub fn descendant_or_self<'a, N: DocumentNode<'a>>(node: N) -> Vec<N> {
    let mut results = vec![node];
    collect_descendants(node, &mut results);
    results
}

/// Ancestors from the parent outward to the root.
pub fn ancestors<'a, N: DocumentNode<'a>>(node: N) -> Vec<N> {
    let mut results = Vec::new();
    let mut current = node.parent();
    while let Some(parent) = current {
        results.push(parent);
        current = parent.parent();
    }
    results
}

/// Siblings after `node`, in document order.
pub fn following_siblings<'a, N: DocumentNode<'a>>(node: N) -> Vec<N> {
    let mut results = Vec::new();
    if let Some(parent) = node.parent() {
        let mut found_self = false;
        for sibling in parent.children() {
            if found_self {
                results.push(sibling);
            }
            if sibling == node {
                found_self = true;
            }
        }
    }
    results
}

/// Siblings before `node`, in document order.
pub fn preceding_siblings<'a, N: DocumentNode<'a>>(node: N) -> Vec<N> {
    let mut results = Vec::new();
    if let Some(parent) = node.parent() {
        for sibling in parent.children() {
            if sibling == node {
                break;
            }
            results.push(sibling);
        }
    }
    results
}

/// All siblings of `node` on either side, in document order.
pub fn siblings<'a, N: DocumentNode<'a>>(node: N) -> Vec<N> {
    let mut results = Vec::new();
    if let Some(parent) = node.parent() {
        for sibling in parent.children() {
            if sibling != node {
                results.push(sibling);
            }
        }
    }
    results
}

/// The 1-based position of `node` among siblings sharing its tag name.
/// A node with no parent counts as the first of its kind.
pub fn same_tag_position<'a, N: DocumentNode<'a>>(node: N) -> usize {
    let Some(parent) = node.parent() else {
        return 1;
    };
    let mut position = 0;
    for sibling in parent.children() {
        if sibling.tag() == node.tag() {
            position += 1;
        }
        if sibling == node {
            return position;
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::tests::TestTree;

    fn sample() -> TestTree {
        // <root> <a/> <b/> <a> <c/> </a> <b/> </root>
        let mut tree = TestTree::new("root");
        tree.child(0, "a");
        tree.child(0, "b");
        let a2 = tree.child(0, "a");
        tree.child(a2, "c");
        tree.child(0, "b");
        tree
    }

    #[test]
    fn descendants_are_document_ordered() {
        let tree = sample();
        let mut results = Vec::new();
        collect_descendants(tree.root(), &mut results);
        let tags: Vec<_> = results.iter().map(|n| n.tag()).collect();
        assert_eq!(tags, vec!["a", "b", "a", "c", "b"]);
    }

    #[test]
    fn descendant_or_self_includes_the_node_first() {
        let tree = sample();
        let all = descendant_or_self(tree.root());
        assert_eq!(all[0], tree.root());
        assert_eq!(all.len(), 6);
    }

    #[test]
    fn sibling_walks() {
        let tree = sample();
        let b1 = tree.node(2);
        let after: Vec<_> = following_siblings(b1).iter().map(|n| n.id).collect();
        assert_eq!(after, vec![3, 5]);
        let before: Vec<_> = preceding_siblings(b1).iter().map(|n| n.id).collect();
        assert_eq!(before, vec![1]);
        let around: Vec<_> = siblings(b1).iter().map(|n| n.id).collect();
        assert_eq!(around, vec![1, 3, 5]);
    }

    #[test]
    fn ancestors_walk_to_the_root() {
        let tree = sample();
        let c = tree.node(4);
        let up: Vec<_> = ancestors(c).iter().map(|n| n.id).collect();
        assert_eq!(up, vec![3, 0]);
    }

    #[test]
    fn position_counts_same_tag_siblings_only() {
        let tree = sample();
        assert_eq!(same_tag_position(tree.node(1)), 1); // first <a>
        assert_eq!(same_tag_position(tree.node(3)), 2); // second <a>
        assert_eq!(same_tag_position(tree.node(5)), 2); // second <b>
        assert_eq!(same_tag_position(tree.root()), 1); // no parent
    }
}
