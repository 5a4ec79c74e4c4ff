//! An HTML-backed document tree for the query engine, on top of `scraper`.

use ferret_pathquery::DocumentNode;
use scraper::{ElementRef, Html};

/// An owned HTML parse. Nodes borrowed from it through [`HtmlDocument::root`]
/// are valid for as long as the document lives.
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(text: &str) -> Self {
        Self {
            html: Html::parse_document(text),
        }
    }

    /// The `<html>` element.
    pub fn root(&self) -> HtmlNode<'_> {
        HtmlNode {
            element: self.html.root_element(),
        }
    }
}

/// A query-engine handle onto one HTML element.
#[derive(Debug, Clone, Copy)]
pub struct HtmlNode<'a> {
    element: ElementRef<'a>,
}

impl<'a> PartialEq for HtmlNode<'a> {
    fn eq(&self, other: &Self) -> bool {
        // Node ids are unique within a parse; queries never mix documents.
        self.element.id() == other.element.id()
    }
}

impl<'a> DocumentNode<'a> for HtmlNode<'a> {
    fn tag(&self) -> &'a str {
        self.element.value().name()
    }

    fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a> {
        Box::new(self.element.value().attrs())
    }

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        Box::new(
            self.element
                .children()
                .filter_map(ElementRef::wrap)
                .map(|element| HtmlNode { element }),
        )
    }

    fn parent(&self) -> Option<Self> {
        self.element
            .parent()
            .and_then(ElementRef::wrap)
            .map(|element| HtmlNode { element })
    }

    fn text(&self) -> String {
        self.element.text().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferret_pathquery::{Registry, compile};

    const PAGE: &str = "<html><body>\
        <div class=\"nav\"><a href=\"/one\">one</a><a href=\"\">blank</a></div>\
        <div><a href=\"/two\">two</a></div>\
        </body></html>";

    #[test]
    fn adapter_exposes_tags_attributes_and_text() {
        let document = HtmlDocument::parse(PAGE);
        let root = document.root();
        assert_eq!(root.tag(), "html");
        let body = root.children().next().expect("body");
        assert_eq!(body.tag(), "body");
        let nav = body.children().next().expect("nav div");
        assert_eq!(nav.attr("class"), Some("nav"));
        assert_eq!(nav.text(), "oneblank");
        assert_eq!(nav.parent(), Some(body));
    }

    #[test]
    fn queries_run_against_parsed_html() {
        let document = HtmlDocument::parse(PAGE);
        let registry = Registry::new();

        let hrefs = compile("//a/@href")
            .unwrap()
            .evaluate(&[document.root()], &registry)
            .unwrap();
        let values: Vec<_> = hrefs.iter().map(ToString::to_string).collect();
        // The blank href is skipped.
        assert_eq!(values, vec!["/one", "/two"]);

        let nav_links = compile("//div[@class='nav']/a/text()")
            .unwrap()
            .evaluate(&[document.root()], &registry)
            .unwrap();
        let values: Vec<_> = nav_links.iter().map(ToString::to_string).collect();
        assert_eq!(values, vec!["one", "blank"]);
    }
}
