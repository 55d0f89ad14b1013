use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Collapses runs of spaces and newlines into single spaces and trims.
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trimmed, non-empty text nodes below `node` in document order. Elements
/// matching `skip` are left out together with everything inside them.
pub(crate) fn text_fragments<'a>(
    node: NodeRef<'a, Node>,
    skip: Option<&Selector>,
    out: &mut Vec<&'a str>,
) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    out.push(trimmed);
                }
            }
            Node::Element(_) => {
                let skipped = match (ElementRef::wrap(child), skip) {
                    (Some(element), Some(selector)) => selector.matches(&element),
                    _ => false,
                };
                if !skipped {
                    text_fragments(child, skip, out);
                }
            }
            _ => {}
        }
    }
}

/// Text of an element with its fragments joined by `separator`.
pub fn element_text(element: ElementRef<'_>, separator: &str) -> String {
    let mut fragments = Vec::new();
    text_fragments(*element, None, &mut fragments);
    collapse_whitespace(&fragments.join(separator))
}

/// Plain text of an HTML snippet as found inside JSON payloads.
pub fn html_fragment_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html.trim());
    element_text(fragment.root_element(), " ")
}
