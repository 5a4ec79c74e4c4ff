//! A `roxmltree`-backed document tree for integration tests.

use ferret_pathquery::DocumentNode;

#[derive(Debug, Clone, Copy)]
pub struct XmlNode<'a> {
    pub node: roxmltree::Node<'a, 'a>,
}

impl<'a> XmlNode<'a> {
    pub fn root(document: &'a roxmltree::Document<'a>) -> Self {
        Self {
            node: document.root_element(),
        }
    }
}

impl<'a> PartialEq for XmlNode<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.node.id() == other.node.id()
    }
}

impl<'a> DocumentNode<'a> for XmlNode<'a> {
    fn tag(&self) -> &'a str {
        self.node.tag_name().name()
    }

    fn attr(&self, name: &str) -> Option<&'a str> {
        self.node.attribute(name)
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a> {
        Box::new(self.node.attributes().map(|a| (a.name(), a.value())))
    }

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        Box::new(
            self.node
                .children()
                .filter(|n| n.is_element())
                .map(|node| XmlNode { node }),
        )
    }

    fn parent(&self) -> Option<Self> {
        self.node
            .parent()
            .filter(|n| n.is_element())
            .map(|node| XmlNode { node })
    }

    fn text(&self) -> String {
        self.node
            .descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect()
    }
}
