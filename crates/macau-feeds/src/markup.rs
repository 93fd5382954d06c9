//! Lenient XML parsing and path lookups over the parsed tree.

use roxmltree::{Document, Node, ParsingOptions};

/// Parse `content` as XML, returning `None` when it is not well-formed.
pub fn parse(content: &str) -> Option<Document<'_>> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;

    match Document::parse_with_options(content, options) {
        Ok(doc) => Some(doc),
        Err(e) => {
            tracing::debug!("XML parse error: {}", e);
            None
        }
    }
}

/// First element child of `node` named `name`.
pub fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

/// Resolve `.//first/second/...` below `node`: the first descendant named
/// `path[0]` (in document order) whose direct-child chain matches the rest.
pub fn descendant_path<'a, 'input>(
    node: Node<'a, 'input>,
    path: &[&str],
) -> Option<Node<'a, 'input>> {
    let (first, rest) = path.split_first()?;

    node.descendants()
        .filter(|d| *d != node && d.is_element() && d.tag_name().name() == *first)
        .find_map(|start| {
            rest.iter()
                .try_fold(start, |current, name| child(current, name))
        })
}

/// Trimmed text of an element, `None` if it has no non-blank text.
pub fn text_of(node: Node<'_, '_>) -> Option<String> {
    let text = node.text()?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
