//! `scraper`-backed page.

use ego_tree::NodeId;
use html5ever::{LocalName, Namespace, QualName};
use scraper::{ElementRef, Html, Node, Selector, StrTendril};

use super::style::{merge_declaration, StyleOverride};
use super::{Candidate, Page};

/// Subtrees whose text is never rendered.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that break the text flow, so their neighbours don't run together.
const BREAKING_ELEMENTS: &[&str] = &[
    "br", "p", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "td", "th",
    "section", "article", "header", "footer",
];

/// A parsed HTML document.
pub struct HtmlPage {
    document: Html,
}

impl HtmlPage {
    /// Parse a full HTML document. Parsing never fails; malformed markup
    /// is repaired the way browsers do.
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Serialize the document, including any applied styles.
    pub fn html(&self) -> String {
        self.document.html()
    }

    /// Current inline `style` of the element, if any.
    pub fn inline_style(&self, handle: &NodeId) -> Option<String> {
        let node = self.document.tree.get(*handle)?;
        node.value().as_element()?.attr("style").map(str::to_string)
    }

    /// Texts of all matches, without handles.
    pub fn texts(&self, selector: &Selector) -> Vec<String> {
        self.candidates(selector)
            .into_iter()
            .map(|c| c.text)
            .collect()
    }
}

impl Page for HtmlPage {
    type Handle = NodeId;

    fn candidates(&self, selector: &Selector) -> Vec<Candidate<NodeId>> {
        self.document
            .select(selector)
            .enumerate()
            .map(|(index, element)| Candidate {
                handle: element.id(),
                index,
                text: rendered_text(element),
            })
            .collect()
    }

    fn apply_style(&mut self, handle: &NodeId, style: &StyleOverride) -> bool {
        let Some(mut node) = self.document.tree.get_mut(*handle) else {
            return false;
        };
        let Node::Element(element) = node.value() else {
            return false;
        };

        let merged = merge_declaration(element.attr("style"), style);
        element
            .attrs
            .insert(style_attr_name(), StrTendril::from(merged.as_str()));
        true
    }
}

fn style_attr_name() -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from("style"))
}

/// Approximate `innerText`: visible descendant text with whitespace runs
/// collapsed and the ends trimmed.
pub(crate) fn rendered_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(inner) => {
                let name = inner.name();
                if HIDDEN_ELEMENTS.contains(&name) {
                    continue;
                }
                let breaks = BREAKING_ELEMENTS.contains(&name);
                if breaks {
                    out.push(' ');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
                if breaks {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}
