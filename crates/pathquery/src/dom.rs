//! The read-only document-tree contract the query engine evaluates against.

/// The contract for an element node in an externally owned document tree.
///
/// The engine is written exclusively against this trait, so it can operate on
/// any materialized tree (an HTML parse, an XML parse, an in-memory mock)
/// that implements it. Handles are `Copy` and borrow from the tree for `'a`;
/// an evaluation can never outlive the document it walks, and the engine
/// never mutates the tree.
pub trait DocumentNode<'a>: std::fmt::Debug + Clone + Copy + PartialEq + 'a {
    /// The element's tag name.
    fn tag(&self) -> &'a str;

    /// The value of the named attribute, if present.
    fn attr(&self, name: &str) -> Option<&'a str>;

    /// All attributes as `(name, value)` pairs, in document order.
    fn attributes(&self) -> Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    /// Element children in document order. Text content is not modeled as
    /// child nodes; it is reachable through [`DocumentNode::text`].
    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// The parent element. Returns `None` for the document root.
    fn parent(&self) -> Option<Self>;

    /// The concatenated text content of this element and all its
    /// descendants, in document order.
    fn text(&self) -> String;
}

// Test utilities - publicly available for integration testing in downstream crates
pub mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct ElementData {
        tag: &'static str,
        attrs: Vec<(&'static str, &'static str)>,
        text: String,
        children: Vec<usize>,
        parent: Option<usize>,
    }

    /// A tree-owning arena; nodes are referenced by stable index, which keeps
    /// the handles `Copy` without any aliasing gymnastics.
    #[derive(Debug)]
    pub struct TestTree {
        nodes: Vec<ElementData>,
    }

    /// A cheap handle into a [`TestTree`].
    #[derive(Debug, Clone, Copy)]
    pub struct TestNode<'a> {
        pub id: usize,
        pub tree: &'a TestTree,
    }

    impl TestTree {
        /// Creates a tree whose root element (id 0) has the given tag.
        pub fn new(tag: &'static str) -> Self {
            Self {
                nodes: vec![ElementData {
                    tag,
                    attrs: Vec::new(),
                    text: String::new(),
                    children: Vec::new(),
                    parent: None,
                }],
            }
        }

        /// Appends a child element under `parent` and returns its id.
        pub fn child(&mut self, parent: usize, tag: &'static str) -> usize {
            let id = self.nodes.len();
            self.nodes.push(ElementData {
                tag,
                attrs: Vec::new(),
                text: String::new(),
                children: Vec::new(),
                parent: Some(parent),
            });
            self.nodes[parent].children.push(id);
            id
        }

        pub fn set_attr(&mut self, id: usize, name: &'static str, value: &'static str) {
            self.nodes[id].attrs.push((name, value));
        }

        pub fn set_text(&mut self, id: usize, text: &str) {
            self.nodes[id].text = text.to_string();
        }

        pub fn node(&self, id: usize) -> TestNode<'_> {
            TestNode { id, tree: self }
        }

        pub fn root(&self) -> TestNode<'_> {
            self.node(0)
        }
    }

    impl<'a> PartialEq for TestNode<'a> {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }

    impl<'a> DocumentNode<'a> for TestNode<'a> {
        fn tag(&self) -> &'a str {
            self.tree.nodes[self.id].tag
        }

        fn attr(&self, name: &str) -> Option<&'a str> {
            self.tree.nodes[self.id]
                .attrs
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| *v)
        }

        fn attributes(&self) -> Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a> {
            let attrs: Vec<(&'a str, &'a str)> = self.tree.nodes[self.id].attrs.clone();
            Box::new(attrs.into_iter())
        }

        fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            let children = tree.nodes[self.id].children.clone();
            Box::new(children.into_iter().map(move |id| TestNode { id, tree }))
        }

        fn parent(&self) -> Option<Self> {
            self.tree.nodes[self.id].parent.map(|id| TestNode {
                id,
                tree: self.tree,
            })
        }

        fn text(&self) -> String {
            let mut pieces = Vec::new();
            collect_text(*self, &mut pieces);
            pieces.join(" ")
        }
    }

    fn collect_text(node: TestNode<'_>, pieces: &mut Vec<String>) {
        let own = &node.tree.nodes[node.id].text;
        if !own.is_empty() {
            pieces.push(own.clone());
        }
        for child in node.children() {
            collect_text(child, pieces);
        }
    }

}
