//! The page a validator observes

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Node, Selector};

use crate::content::wikilink::WIKI_LINK_CLASS;

/// Class added to WikiLinks whose target exists
pub const VALID_CLASS: &str = "wiki-link-valid";

/// Class added to WikiLinks whose target is missing
pub const BROKEN_CLASS: &str = "wiki-link-broken";

lazy_static! {
    static ref WIKI_ANCHOR: Selector =
        Selector::parse(&format!("a.{}[data-slug]", WIKI_LINK_CLASS)).unwrap();
}

/// A document containing WikiLink anchors.
pub trait LinkDom: Send + 'static {
    /// `data-slug` of every WikiLink anchor, in document order
    fn wiki_link_slugs(&self) -> Vec<String>;

    /// Give every anchor for `slug` exactly one of the two state classes
    fn mark(&mut self, slug: &str, exists: bool);
}

/// Rendered HTML treated as a document.
///
/// The markup is kept as text and parsed on each query; parsed trees are
/// not `Send`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlPage {
    html: String,
}

impl HtmlPage {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    /// Class lists of every WikiLink anchor for a slug
    pub fn classes_of(&self, slug: &str) -> Vec<Vec<String>> {
        let fragment = Html::parse_fragment(&self.html);
        fragment
            .select(&WIKI_ANCHOR)
            .filter(|a| a.value().attr("data-slug") == Some(slug))
            .map(|a| a.value().classes().map(str::to_string).collect())
            .collect()
    }
}

impl LinkDom for HtmlPage {
    fn wiki_link_slugs(&self) -> Vec<String> {
        let fragment = Html::parse_fragment(&self.html);
        fragment
            .select(&WIKI_ANCHOR)
            .filter_map(|a| a.value().attr("data-slug"))
            .map(str::to_string)
            .collect()
    }

    fn mark(&mut self, slug: &str, exists: bool) {
        let mut fragment = Html::parse_fragment(&self.html);
        let targets: Vec<_> = fragment
            .select(&WIKI_ANCHOR)
            .filter(|a| a.value().attr("data-slug") == Some(slug))
            .map(|a| (a.id(), with_state_class(a, exists)))
            .collect();
        if targets.is_empty() {
            return;
        }

        for (id, classes) in targets {
            let Some(mut node) = fragment.tree.get_mut(id) else {
                continue;
            };
            if let Node::Element(element) = node.value() {
                for (name, value) in element.attrs.iter_mut() {
                    if &*name.local == "class" {
                        *value = classes.as_str().into();
                    }
                }
            }
        }
        self.html = fragment.root_element().inner_html();
    }
}

/// Class attribute of an anchor with the state class for `exists` set
fn with_state_class(anchor: ElementRef<'_>, exists: bool) -> String {
    let (add, remove) = if exists {
        (VALID_CLASS, BROKEN_CLASS)
    } else {
        (BROKEN_CLASS, VALID_CLASS)
    };
    let mut classes: Vec<&str> = anchor
        .value()
        .attr("class")
        .unwrap_or_default()
        .split_whitespace()
        .filter(|c| *c != add && *c != remove)
        .collect();
    classes.push(add);
    classes.join(" ")
}
