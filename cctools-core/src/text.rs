//! Presentation helpers for raw field values.
//!
//! Export values are kept exactly as the back office stores them, which for
//! descriptions and teasers means HTML. These helpers are for rendering only.

use scraper::{Html, Node};

/// Elements that start a new visual line when rendered.
const BREAKING_ELEMENTS: &[&str] = &[
    "br", "p", "div", "li", "tr", "td", "th", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol",
];

/// Converts an HTML fragment into single-line plain text.
///
/// Tags are dropped, entities decoded, block boundaries become spaces and
/// runs of whitespace collapse to one space.
pub fn html_to_plain_text(html: &str) -> String {
    if !html.contains('<') && !html.contains('&') {
        return collapse_whitespace(html);
    }

    let fragment = Html::parse_fragment(html);
    let mut text = String::with_capacity(html.len());
    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Text(chunk) => text.push_str(chunk),
            Node::Element(element) if BREAKING_ELEMENTS.contains(&element.name()) => {
                text.push(' ');
            }
            _ => {}
        }
    }
    collapse_whitespace(&text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
