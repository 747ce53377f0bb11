//! Small removal and repair filters.

use crate::dom::{Document, NodeId};
use crate::schema::Schema;

use super::whitespace::{Direction, phrasing_sibling};

/// Elements that carry no pasted content.
const HEAD_ELEMENTS: &[&str] = &[
    "script", "noscript", "template", "style", "meta", "link", "title",
];

const GOOGLE_DOCS_GUID: &str = "docs-internal-guid-";

/// Drop scripts, styles and document metadata.
pub fn head_remover(node: NodeId, doc: &mut Document, _schema: &Schema) {
    if HEAD_ELEMENTS.contains(&doc.node_name(node)) {
        doc.detach(node);
    }
}

/// Drop comments.
pub fn comment_remover(node: NodeId, doc: &mut Document, _schema: &Schema) {
    if doc.is_comment(node) {
        doc.detach(node);
    }
}

/// Replace an `iframe` by a text node holding its source URL.
pub fn iframe_remover(node: NodeId, doc: &mut Document, _schema: &Schema) {
    if !doc.is_tag(node, "iframe") {
        return;
    }
    let src = doc.get_attr(node, "src").unwrap_or_default().to_string();
    let text = doc.create_text(src);
    doc.insert_before(node, text);
    doc.detach(node);
}

/// Remove the bold wrapper Google Docs puts around copied content.
///
/// Any other element carrying the guid just loses its `id`.
pub fn google_docs_uid_remover(node: NodeId, doc: &mut Document, _schema: &Schema) {
    if !doc
        .get_attr(node, "id")
        .is_some_and(|id| id.starts_with(GOOGLE_DOCS_GUID))
    {
        return;
    }
    if doc.is_tag(node, "b") {
        doc.unwrap(node);
    } else {
        doc.remove_attr(node, "id");
    }
}

/// Blank local file sources and drop 1-pixel tracking images.
pub fn image_corrector(node: NodeId, doc: &mut Document, _schema: &Schema) {
    if !doc.is_tag(node, "img") {
        return;
    }

    if doc.get_attr(node, "src").is_some_and(|src| src.starts_with("file:")) {
        doc.set_attr(node, "src", "");
    }

    let one_pixel = |name: &str| doc.get_attr(node, name).is_some_and(|v| v.trim() == "1");
    if one_pixel("width") || one_pixel("height") {
        doc.detach(node);
    }
}

/// Drop a `br` that nothing inline follows.
pub fn br_remover(node: NodeId, doc: &mut Document, _schema: &Schema) {
    if !doc.is_tag(node, "br") {
        return;
    }
    if phrasing_sibling(doc, node, Direction::Next).is_none() {
        doc.detach(node);
    }
}

/// Drop paragraphs with no children at all.
pub fn empty_paragraph_remover(node: NodeId, doc: &mut Document, _schema: &Schema) {
    if doc.is_tag(node, "p") && doc.first_child(node).is_none() {
        doc.detach(node);
    }
}
