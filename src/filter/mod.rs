//! Tree filter engine and the filter library.
//!
//! A [`Filter`] is a visitor that may reshape the tree around one node: move
//! it, wrap it, unwrap it, replace it or leave it alone. [`deep_filter`]
//! applies an ordered list of filters to every node, children before their
//! parent, so cascading effects (a container emptied by its children's
//! filters) are visible when the container itself is visited.
//!
//! Filters never assume the node is still attached when they return. Before
//! each filter runs the engine checks that the node is still reachable from
//! the document root and skips it otherwise.

mod cleanup;
mod comments;
mod embedded;
mod lists;
mod normalise;
mod phrasing;
mod whitespace;

pub use cleanup::{
    br_remover, comment_remover, empty_paragraph_remover, google_docs_uid_remover, head_remover,
    iframe_remover, image_corrector,
};
pub use comments::{COMMENT_BLOCK_ELEMENT, MORE_BLOCK, NEXTPAGE_BLOCK, special_comment_converter};
pub use embedded::embedded_content_reducer;
pub use lists::list_reducer;
pub use normalise::{blockquote_normaliser, div_normaliser, normalise_blocks};
pub use phrasing::phrasing_content_reducer;
pub use whitespace::html_formatting_remover;

use crate::dom::{Document, NodeId, parse_html};
use crate::schema::Schema;

/// A mutating visitor applied to one node.
pub type Filter = fn(NodeId, &mut Document, &Schema);

/// Apply `filters` to `nodes` and all their descendants, deepest first.
pub fn deep_filter(nodes: &[NodeId], filters: &[Filter], doc: &mut Document, schema: &Schema) {
    for &node in nodes {
        let children = doc.child_ids(node);
        deep_filter(&children, filters, doc, schema);

        for filter in filters {
            if !doc.contains(node) {
                break;
            }
            filter(node, doc, schema);
        }
    }
}

/// Run [`deep_filter`] over every node of a document.
pub fn filter_document(doc: &mut Document, filters: &[Filter], schema: &Schema) {
    let children = doc.child_ids(doc.document());
    deep_filter(&children, filters, doc, schema);
}

/// Parse `html`, filter it and serialize the result.
pub fn deep_filter_html(html: &str, filters: &[Filter], schema: &Schema) -> String {
    let mut doc = parse_html(html);
    filter_document(&mut doc, filters, schema);
    doc.to_html()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    thread_local! {
        static VISITS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    fn record(node: NodeId, doc: &mut Document, _schema: &Schema) {
        let name = doc.node_name(node).to_string();
        VISITS.with(|v| v.borrow_mut().push(name));
    }

    fn unwrap_span(node: NodeId, doc: &mut Document, _schema: &Schema) {
        if doc.is_tag(node, "span") {
            doc.unwrap(node);
        }
    }

    fn rename_em(node: NodeId, doc: &mut Document, _schema: &Schema) {
        if doc.is_tag(node, "em") {
            doc.rename(node, "i");
        }
    }

    #[test]
    fn test_children_visited_before_parent() {
        VISITS.with(|v| v.borrow_mut().clear());
        deep_filter_html("<p><em>a</em>b</p><hr>", &[record], &Schema::new());
        let visits = VISITS.with(|v| v.borrow().clone());
        assert_eq!(visits, ["#text", "em", "#text", "p", "hr"]);
    }

    #[test]
    fn test_detached_node_skips_remaining_filters() {
        VISITS.with(|v| v.borrow_mut().clear());
        deep_filter_html("<span>x</span>", &[unwrap_span, record], &Schema::new());
        let visits = VISITS.with(|v| v.borrow().clone());
        assert_eq!(visits, ["#text"]);
    }

    #[test]
    fn test_filters_applied_in_order() {
        let html = deep_filter_html(
            "<p><span><em>a</em></span></p>",
            &[unwrap_span, rename_em],
            &Schema::new(),
        );
        assert_eq!(html, "<p><i>a</i></p>");
    }
}
