//! Block-boundary normalization.
//!
//! Loose top-level content is gathered into paragraphs:
//!
//! ```text
//! Before: ["one", br, br, "two", em, ul]
//! After:  [p > "one", p > ["two", em], ul]
//! ```
//!
//! - Text and phrasing elements join the trailing paragraph, opening one if
//!   needed; whitespace-only text is dropped.
//! - A double `br` starts a new paragraph; a single `br` stays in the
//!   current one, unless that paragraph is still empty.
//! - Empty paragraphs are dropped, other blocks pass through.

use crate::dom::{Document, NodeId};
use crate::sanitize::is_empty;
use crate::schema::{Schema, is_phrasing_content};

/// Normalize the children of `parent` into block-level content.
pub fn normalise_blocks(doc: &mut Document, parent: NodeId) {
    let nodes = doc.child_ids(parent);
    for &node in &nodes {
        doc.detach(node);
    }

    let mut nodes = nodes.into_iter().peekable();
    while let Some(node) = nodes.next() {
        if let Some(text) = doc.text_content(node) {
            if !text.trim().is_empty() {
                let paragraph = trailing_paragraph(doc, parent);
                doc.append(paragraph, node);
            }
            continue;
        }
        if !doc.is_element(node) {
            continue;
        }

        if doc.is_tag(node, "br") {
            if nodes.next_if(|&next| doc.is_tag(next, "br")).is_some() {
                let paragraph = doc.create_html_element("p");
                doc.append(parent, paragraph);
            }
            if let Some(last) = doc.last_child(parent)
                && doc.is_tag(last, "p")
                && doc.first_child(last).is_some()
            {
                doc.append(last, node);
            }
        } else if doc.is_tag(node, "p") {
            if !is_empty(doc, node, None) {
                doc.append(parent, node);
            }
        } else if is_phrasing_content(doc, node) {
            let paragraph = trailing_paragraph(doc, parent);
            doc.append(paragraph, node);
        } else {
            doc.append(parent, node);
        }
    }
}

/// The last child of `parent` if it is a paragraph, otherwise a new one.
fn trailing_paragraph(doc: &mut Document, parent: NodeId) -> NodeId {
    if let Some(last) = doc.last_child(parent)
        && doc.is_tag(last, "p")
    {
        return last;
    }
    let paragraph = doc.create_html_element("p");
    doc.append(parent, paragraph);
    paragraph
}

/// Normalize the content of a `blockquote`.
pub fn blockquote_normaliser(node: NodeId, doc: &mut Document, _schema: &Schema) {
    if doc.is_tag(node, "blockquote") {
        normalise_blocks(doc, node);
    }
}

/// Normalize the content of a `div`.
pub fn div_normaliser(node: NodeId, doc: &mut Document, _schema: &Schema) {
    if doc.is_tag(node, "div") {
        normalise_blocks(doc, node);
    }
}
