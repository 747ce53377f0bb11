//! Legacy editor comments that stand for blocks.
//!
//! `<!--more-->` and `<!--nextpage-->` mark a read-more break and a page
//! break. They become [`COMMENT_BLOCK_ELEMENT`] markers naming their block in
//! `data-block`, which the matching raw transforms claim:
//!
//! ```text
//! Before: p > ["a", <!--more Read on-->, "b"], <!--noteaser-->
//! After:  p > "a", wp-block[data-block=core/more][data-custom-text=Read on][data-no-teaser], p > "b"
//! ```
//!
//! A `<!--more-->` inside a paragraph splits it around the marker.

use crate::dom::{Document, NodeId};
use crate::schema::Schema;

/// Element standing in for a block written as a legacy comment.
pub const COMMENT_BLOCK_ELEMENT: &str = "wp-block";

pub const MORE_BLOCK: &str = "core/more";
pub const NEXTPAGE_BLOCK: &str = "core/nextpage";

const MORE: &str = "more";
const NEXTPAGE: &str = "nextpage";
const NO_TEASER: &str = "noteaser";

/// Turn `<!--more-->` and `<!--nextpage-->` comments into block markers.
pub fn special_comment_converter(node: NodeId, doc: &mut Document, _schema: &Schema) {
    let Some(comment) = doc.comment_content(node).map(str::to_string) else {
        return;
    };

    if comment == NEXTPAGE {
        let marker = create_marker(doc, NEXTPAGE_BLOCK);
        doc.insert_before(node, marker);
        doc.detach(node);
        return;
    }

    let Some(custom_text) = comment.strip_prefix(MORE) else {
        return;
    };
    let marker = create_marker(doc, MORE_BLOCK);
    let custom_text = custom_text.trim();
    if !custom_text.is_empty() {
        doc.set_attr(marker, "data-custom-text", custom_text);
    }
    if take_no_teaser(doc, node) {
        doc.set_attr(marker, "data-no-teaser", "");
    }

    match doc.parent(node) {
        Some(paragraph) if doc.is_tag(paragraph, "p") => {
            split_paragraph(doc, paragraph, node, marker);
        }
        _ => {
            doc.insert_before(node, marker);
            doc.detach(node);
        }
    }
}

fn create_marker(doc: &mut Document, block: &str) -> NodeId {
    let marker = doc.create_html_element(COMMENT_BLOCK_ELEMENT);
    doc.set_attr(marker, "data-block", block);
    marker
}

/// Remove a following `<!--noteaser-->` sibling, reporting whether one was found.
fn take_no_teaser(doc: &mut Document, node: NodeId) -> bool {
    let mut sibling = doc.next_sibling(node);
    while sibling.is_some() {
        if doc.comment_content(sibling) == Some(NO_TEASER) {
            doc.detach(sibling);
            return true;
        }
        sibling = doc.next_sibling(sibling);
    }
    false
}

/// Replace `paragraph` by the content before `node`, the marker and the
/// content after `node`. Empty halves are dropped.
fn split_paragraph(doc: &mut Document, paragraph: NodeId, node: NodeId, marker: NodeId) {
    let children = doc.child_ids(paragraph);
    let index = children.iter().position(|&child| child == node).unwrap_or(children.len());
    let (before, rest) = children.split_at(index);
    let after = rest.get(1..).unwrap_or(&[]);

    let before = paragraph_of(doc, before);
    let after = paragraph_of(doc, after);
    for part in [before, Some(marker), after].into_iter().flatten() {
        doc.insert_before(paragraph, part);
    }
    doc.detach(paragraph);
}

fn paragraph_of(doc: &mut Document, nodes: &[NodeId]) -> Option<NodeId> {
    if nodes.is_empty() {
        return None;
    }
    let paragraph = doc.create_html_element("p");
    for &node in nodes {
        doc.append(paragraph, node);
    }
    Some(paragraph)
}
