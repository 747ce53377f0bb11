//! Embedded content promotion.
//!
//! Media sitting inside running text is moved into its own container ahead
//! of the paragraph that held it, so the sanitizer does not scatter it
//! across the surrounding text when it unwraps invalid markup:
//!
//! ```text
//! Before: p > [strong > ["test", img.one], img.two]
//! After:  figure > img.one, figure > img.two, p > [strong > "test"]
//! ```
//!
//! A linked image is promoted together with its link, so the target
//! survives. The container goes before the nearest `p` or `div` holding the
//! media; without one it wraps the media in place.

use crate::classify::{EMBED_CONTAINER, is_embedded};
use crate::dom::{Document, NodeId};
use crate::schema::Schema;

/// Promote embedded media into a fresh [`EMBED_CONTAINER`].
pub fn embedded_content_reducer(node: NodeId, doc: &mut Document, schema: &Schema) {
    if !is_embedded(doc, node, schema) {
        return;
    }

    let mut promoted = node;
    if doc.is_tag(node, "img")
        && let Some(parent) = doc.parent(node)
        && doc.is_tag(parent, "a")
        && doc.children(parent).count() == 1
    {
        promoted = parent;
    }

    let Some(parent) = doc.parent(promoted) else {
        return;
    };
    if doc.is_tag(parent, EMBED_CONTAINER) {
        return;
    }

    let anchor = paragraph_ancestor(doc, promoted).unwrap_or(promoted);
    let container = doc.create_html_element(EMBED_CONTAINER);
    doc.insert_before(anchor, container);
    doc.append(container, promoted);
}

const PARAGRAPH_WRAPPERS: &[&str] = &["p", "div"];

fn paragraph_ancestor(doc: &Document, node: NodeId) -> Option<NodeId> {
    let mut current = doc.parent(node);
    while let Some(id) = current {
        if PARAGRAPH_WRAPPERS.contains(&doc.node_name(id)) {
            return Some(id);
        }
        current = doc.parent(id);
    }
    None
}
