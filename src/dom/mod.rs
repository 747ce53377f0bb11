//! Mutable HTML fragment DOM.
//!
//! Pasted markup is parsed with html5ever into an arena [`Document`]. The
//! parsed `<body>` children become the document root's children, so a
//! `Document` always holds exactly one fragment, the unit every filter,
//! classifier and the sanitizer work over.
//!
//! # Example
//!
//! ```
//! use blockpaste::dom::parse_html;
//!
//! let mut doc = parse_html("<p>Hello <b>there</b></p>");
//! let b = doc.find_by_tag("b").unwrap();
//! doc.unwrap(b);
//! assert_eq!(doc.to_html(), "<p>Hello there</p>");
//! ```

mod arena;
mod element_ref;
mod select;
mod serialize;
mod tree_sink;

pub use arena::{Attribute, ChildrenIter, Document, Node, NodeData, NodeId, attr_name, html_name};
pub use select::SelectorGroup;
pub use serialize::is_void_element;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use tree_sink::ArenaSink;

/// Parse an HTML fragment into a fresh [`Document`].
///
/// The fragment is parsed as body content, so leading whitespace survives
/// and `<meta>`, `<title>` or `<style>` stay where they were written. The
/// `html`/`head`/`body` scaffolding is discarded.
pub fn parse_html(html: &str) -> Document {
    let wrapped = format!("<!DOCTYPE html><html><head></head><body>{html}</body></html>");
    let sink = ArenaSink::new();
    let mut doc = parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(wrapped.as_bytes())
        .into_document();

    let root = doc.document();
    let body = doc.find_by_tag("body");
    for child in doc.child_ids(root) {
        doc.detach(child);
    }
    if let Some(body) = body {
        doc.reparent_children(body, root);
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_children_hang_off_root() {
        let doc = parse_html("one<p>two</p>");
        let root = doc.document();
        let children = doc.child_ids(root);
        assert_eq!(children.len(), 2);
        assert!(doc.is_text(children[0]));
        assert_eq!(doc.node_name(children[1]), "p");
    }

    #[test]
    fn test_leading_whitespace_is_kept() {
        assert_eq!(parse_html("  <em>a</em>").to_html(), "  <em>a</em>");
        assert_eq!(parse_html(" ").to_html(), " ");
        assert_eq!(parse_html("<p> </p>").to_html(), "<p> </p>");
    }

    #[test]
    fn test_head_elements_stay_in_place() {
        let doc = parse_html("<meta charset=\"utf-8\"><p>body</p>");
        let children = doc.child_ids(doc.document());
        assert_eq!(children.len(), 2);
        assert_eq!(doc.node_name(children[0]), "meta");
    }

    #[test]
    fn test_document_envelope_is_ignored() {
        let doc = parse_html("<html><body><p>a</p></body></html>");
        assert_eq!(doc.to_html(), "<p>a</p>");
    }

    #[test]
    fn test_empty_input() {
        let doc = parse_html("");
        assert!(doc.is_empty());
        assert_eq!(doc.to_html(), "");
    }
}
