//! Schema enforcement over a parsed fragment.
//!
//! Nodes the schema does not know are unwrapped, never deleted: their
//! children are cleaned against the same schema level and spliced into the
//! parent. Known nodes lose attributes and classes the schema does not list
//! and have their children cleaned against the entry's children schema.
//!
//! A known node whose `require` selectors match nothing inside it fails its
//! own structure. Its children are salvaged against the *ambient* schema
//! first, then the node is unwrapped.

use log::{trace, warn};

use crate::dom::{Document, NodeId, SelectorGroup, parse_html};
use crate::schema::{Children, Schema, SchemaEntry, is_phrasing_content};

/// Clean a list of sibling nodes against `schema`.
///
/// `nodes` is a snapshot; nodes detached before their turn are skipped. In
/// `inline` mode a `br` is inserted where an unwrapped block element used to
/// separate two runs of content.
pub fn sanitize(nodes: &[NodeId], doc: &mut Document, schema: &Schema, inline: bool) {
    for &node in nodes {
        if doc.parent(node).is_none() {
            continue;
        }

        let tag = doc.node_name(node).to_string();
        match schema.get(&tag) {
            None => {
                let children = doc.child_ids(node);
                sanitize(&children, doc, schema, inline);

                if inline && !is_phrasing_content(doc, node) && doc.next_element_sibling(node).is_some() {
                    let br = doc.create_html_element("br");
                    doc.insert_after(node, br);
                }

                trace!("unwrapping <{tag}>");
                doc.unwrap(node);
            }
            Some(entry) => {
                if doc.is_element(node) {
                    sanitize_element(node, doc, schema, entry, inline);
                }
            }
        }
    }
}

fn sanitize_element(
    node: NodeId,
    doc: &mut Document,
    schema: &Schema,
    entry: &SchemaEntry,
    inline: bool,
) {
    if must_not_be_empty(entry) && is_empty(doc, node, Some(entry)) {
        doc.detach(node);
        return;
    }

    filter_attributes(doc, node, entry);

    if doc.first_child(node).is_none() {
        return;
    }

    let children = doc.child_ids(node);
    match &entry.children {
        Some(Children::Any) => return,
        None => doc.remove_children(node),
        Some(allowed) => {
            if !require_matches(doc, node, entry) {
                salvage(node, doc, schema, inline);
                return;
            }

            if doc.parent(node) == Some(doc.document()) && is_phrasing_content(doc, node) {
                sanitize(&children, doc, schema, inline);
                let block_inside = doc
                    .children(node)
                    .any(|child| !is_phrasing_content(doc, child));
                if block_inside {
                    doc.unwrap(node);
                    return;
                }
            } else if let Some(nested) = allowed.schema() {
                sanitize(&children, doc, nested, inline);
                // Cleaning may have removed the required content.
                if !require_matches(doc, node, entry) {
                    salvage(node, doc, schema, inline);
                    return;
                }
            }
        }
    }

    // Cleaning may have emptied the element.
    if must_not_be_empty(entry) && is_empty(doc, node, Some(entry)) {
        doc.detach(node);
    }
}

/// Clean the children of a node that failed its `require` constraint
/// against the ambient schema, then unwrap it.
fn salvage(node: NodeId, doc: &mut Document, schema: &Schema, inline: bool) {
    let children = doc.child_ids(node);
    sanitize(&children, doc, schema, inline);
    trace!("unwrapping <{}>: required content missing", doc.node_name(node));
    doc.unwrap(node);
}

fn must_not_be_empty(entry: &SchemaEntry) -> bool {
    entry.children.is_some() && !entry.allow_empty
}

/// Drop attributes and class tokens the entry does not allow.
fn filter_attributes(doc: &mut Document, node: NodeId, entry: &SchemaEntry) {
    let disallowed: Vec<String> = doc
        .attrs(node)
        .iter()
        .map(|a| a.name.local.to_string())
        .filter(|name| name != "class" && !entry.attributes.contains(name))
        .collect();
    for name in disallowed {
        doc.remove_attr(node, &name);
    }

    if doc.get_attr(node, "class").is_some() {
        let kept = kept_classes(doc, node, entry);
        if kept.is_empty() {
            doc.remove_attr(node, "class");
        } else {
            doc.set_attr(node, "class", &kept.join(" "));
        }
    }
}

fn kept_classes(doc: &Document, node: NodeId, entry: &SchemaEntry) -> Vec<String> {
    doc.element_classes(node)
        .filter(|class| entry.classes.contains(*class))
        .map(str::to_string)
        .collect()
}

fn require_matches(doc: &Document, node: NodeId, entry: &SchemaEntry) -> bool {
    if entry.require.is_empty() {
        return true;
    }
    let selectors = entry.require.iter().map(String::as_str).collect::<Vec<_>>().join(",");
    match SelectorGroup::parse(&selectors) {
        Ok(group) => group.query_first(doc, node).is_some(),
        Err(err) => {
            warn!("ignoring require constraint: {err}");
            false
        }
    }
}

/// Whether an element carries nothing worth keeping.
///
/// With an entry, only attributes that survive filtering count. Children
/// count when they hold non-whitespace text or a non-empty element; `br`
/// and comments do not.
pub fn is_empty(doc: &Document, node: NodeId, entry: Option<&SchemaEntry>) -> bool {
    let has_attributes = match entry {
        Some(entry) => doc.attrs(node).iter().any(|a| {
            let name = a.name.local.as_ref();
            if name == "class" {
                !kept_classes(doc, node, entry).is_empty()
            } else {
                entry.attributes.contains(name)
            }
        }),
        None => doc.has_attributes(node),
    };
    if has_attributes {
        return false;
    }

    doc.children(node).all(|child| {
        if let Some(text) = doc.text_content(child) {
            text.trim().is_empty()
        } else if doc.is_element(child) {
            doc.is_tag(child, "br") || is_empty(doc, child, None)
        } else {
            true
        }
    })
}

/// Parse `html`, clean it against `schema` and serialize the result.
pub fn remove_invalid_html(html: &str, schema: &Schema, inline: bool) -> String {
    let mut doc = parse_html(html);
    let root = doc.document();
    let children = doc.child_ids(root);
    sanitize(&children, &mut doc, schema, inline);
    doc.to_html()
}
