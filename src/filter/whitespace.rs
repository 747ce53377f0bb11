//! Source formatting whitespace removal.
//!
//! Indentation and line breaks in the pasted markup are not content:
//! ```html
//! <p>
//!     Some <em>text</em>
//! </p>
//! ```
//! Runs of formatting whitespace collapse to one space, and that space is
//! dropped where it would render as nothing: at the edges of a phrasing run,
//! next to a `br`, or after text that already ends in a space.

use crate::dom::{Document, NodeId};
use crate::schema::{Schema, is_phrasing_content};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Direction {
    Previous,
    Next,
}

/// The nearest phrasing sibling in `direction`, climbing out of phrasing
/// parents when the node is at the edge of one.
pub(super) fn phrasing_sibling(doc: &Document, node: NodeId, direction: Direction) -> Option<NodeId> {
    let sibling = match direction {
        Direction::Previous => doc.prev_sibling(node),
        Direction::Next => doc.next_sibling(node),
    };
    if sibling.is_some() && is_phrasing_content(doc, sibling) {
        return Some(sibling);
    }

    let parent = doc.parent(node)?;
    if !is_phrasing_content(doc, parent) {
        return None;
    }
    phrasing_sibling(doc, parent, direction)
}

fn is_formatting_space(c: char) -> bool {
    matches!(c, ' ' | '\r' | '\n' | '\t')
}

fn inside_pre(doc: &Document, node: NodeId) -> bool {
    let mut current = doc.parent(node);
    while let Some(id) = current {
        if doc.is_tag(id, "pre") {
            return true;
        }
        current = doc.parent(id);
    }
    false
}

/// Collapse formatting whitespace in a text node outside `pre`.
pub fn html_formatting_remover(node: NodeId, doc: &mut Document, _schema: &Schema) {
    let Some(text) = doc.text_content(node) else {
        return;
    };
    if inside_pre(doc, node) {
        return;
    }

    let mut data = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if is_formatting_space(c) {
            if !in_space {
                data.push(' ');
            }
            in_space = true;
        } else {
            data.push(c);
            in_space = false;
        }
    }

    if data.starts_with(' ') {
        let drop = match phrasing_sibling(doc, node, Direction::Previous) {
            None => true,
            Some(prev) => doc.is_tag(prev, "br") || doc.deep_text(prev).ends_with(' '),
        };
        if drop {
            data.remove(0);
        }
    }

    if data.ends_with(' ') {
        let drop = match phrasing_sibling(doc, node, Direction::Next) {
            None => true,
            Some(next) => {
                doc.is_tag(next, "br")
                    || doc
                        .text_content(next)
                        .and_then(|t| t.chars().next())
                        .is_some_and(is_formatting_space)
            }
        };
        if drop {
            data.pop();
        }
    }

    if data.is_empty() {
        doc.detach(node);
    } else {
        doc.set_text(node, data);
    }
}
