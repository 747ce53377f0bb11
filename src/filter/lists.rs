//! List structure repair.

use crate::dom::{Document, NodeId};
use crate::schema::Schema;

fn is_list(doc: &Document, node: NodeId) -> bool {
    doc.is_tag(node, "ul") || doc.is_tag(node, "ol")
}

/// Text directly inside a node, ignoring descendants.
fn shallow_text(doc: &Document, node: NodeId) -> String {
    doc.children(node)
        .filter_map(|child| doc.text_content(child))
        .collect()
}

/// Repair list markup produced by word processors.
///
/// - A one-item list right after a list of the same type is merged into it.
/// - A list that is the only content of an item moves into the previous item.
/// - A list directly inside a list moves into the previous item, or is
///   unwrapped when there is none.
pub fn list_reducer(node: NodeId, doc: &mut Document, _schema: &Schema) {
    if !is_list(doc, node) {
        return;
    }

    if let Some(prev) = doc.prev_element_sibling(node)
        && doc.node_name(prev) == doc.node_name(node)
        && doc.element_children(node).len() == 1
    {
        doc.reparent_children(node, prev);
        doc.detach(node);
        return;
    }

    let Some(parent) = doc.parent(node) else {
        return;
    };

    if doc.is_tag(parent, "li")
        && doc.element_children(parent).len() == 1
        && shallow_text(doc, parent).trim().is_empty()
        && let Some(prev_item) = doc.prev_element_sibling(parent)
    {
        doc.append(prev_item, node);
        doc.detach(parent);
        return;
    }

    if is_list(doc, parent) {
        match doc.prev_element_sibling(node) {
            Some(prev_item) => doc.append(prev_item, node),
            None => doc.unwrap(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::deep_filter_html;

    fn run(html: &str) -> String {
        deep_filter_html(html, &[list_reducer], &Schema::new())
    }

    #[test]
    fn test_merges_single_item_lists() {
        assert_eq!(
            run("<ul><li>a</li></ul><ul><li>b</li></ul><ol><li>c</li></ol>"),
            "<ul><li>a</li><li>b</li></ul><ol><li>c</li></ol>"
        );
    }

    #[test]
    fn test_moves_list_out_of_empty_item() {
        assert_eq!(
            run("<ul><li>a</li><li><ul><li>b</li></ul></li></ul>"),
            "<ul><li>a<ul><li>b</li></ul></li></ul>"
        );
    }

    #[test]
    fn test_list_directly_in_list() {
        let mut doc = crate::dom::parse_html("<ul><li>a</li></ul>");
        let ul = doc.find_by_tag("ul").unwrap();
        let nested = doc.create_html_element("ol");
        let item = doc.create_html_element("li");
        doc.append_text(item, "b");
        doc.append(nested, item);
        doc.append(ul, nested);

        crate::filter::filter_document(&mut doc, &[list_reducer], &Schema::new());
        assert_eq!(doc.to_html(), "<ul><li>a<ol><li>b</li></ol></li></ul>");
    }

    #[test]
    fn test_leading_list_in_list_is_unwrapped() {
        let mut doc = crate::dom::parse_html("<ul></ul>");
        let ul = doc.find_by_tag("ul").unwrap();
        let nested = doc.create_html_element("ul");
        let item = doc.create_html_element("li");
        doc.append_text(item, "b");
        doc.append(nested, item);
        doc.append(ul, nested);

        crate::filter::filter_document(&mut doc, &[list_reducer], &Schema::new());
        assert_eq!(doc.to_html(), "<ul><li>b</li></ul>");
    }
}
