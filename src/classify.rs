//! Cheap structural decisions about pasted content.
//!
//! Every classifier is total: any input yields a boolean.

use crate::dom::{Document, NodeId, parse_html};
use crate::schema::{Schema, is_phrasing_content};

/// Wrapper that embedded media is promoted into.
pub const EMBED_CONTAINER: &str = "figure";
const CAPTION: &str = "figcaption";

/// Tags that are inline-compatible with each other when pasting into one of
/// them.
const INLINE_GROUPS: &[&[&str]] = &[
    &["ul", "li", "ol"],
    &["h1", "h2", "h3", "h4", "h5", "h6"],
];

/// Whether `html` collapses to a single text node once `br` becomes a newline.
///
/// ```
/// use blockpaste::classify::is_plain;
///
/// assert!(is_plain("line one\nline two"));
/// assert!(is_plain("line one<br>line two"));
/// assert!(!is_plain("<strong>x</strong>"));
/// ```
pub fn is_plain(html: &str) -> bool {
    let mut doc = parse_html(html);
    for br in doc.descendants(doc.document()) {
        if doc.is_tag(br, "br") {
            let newline = doc.create_text("\n".to_string());
            doc.insert_before(br, newline);
            doc.detach(br);
        }
    }

    let root = doc.document();
    doc.normalize(root);
    let children = doc.child_ids(root);
    children.len() == 1 && doc.is_text(children[0])
}

/// Whether `html` can replace a selection inside `context_tag` without
/// creating new blocks.
///
/// Two consecutive `br` elements anywhere mean paragraph intent. Otherwise
/// every element must be phrasing content, or share an inline group (lists,
/// headings) with `context_tag`. Comments such as clipboard fragment markers
/// are ignored.
pub fn is_inline_content(html: &str, context_tag: Option<&str>) -> bool {
    let doc = parse_html(html);
    let root = doc.document();

    let double_break = doc.descendants(root).into_iter().any(|node| {
        doc.is_tag(node, "br") && {
            let prev = doc.prev_sibling(node);
            prev.is_some() && doc.is_tag(prev, "br")
        }
    });
    if double_break {
        return false;
    }

    let context = context_tag.map(str::to_ascii_lowercase);
    doc.children(root)
        .all(|node| is_inline_tree(&doc, node, context.as_deref()))
}

fn is_inline_tree(doc: &Document, node: NodeId, context_tag: Option<&str>) -> bool {
    is_inline_node(doc, node, context_tag)
        && doc
            .children(node)
            .all(|child| is_inline_tree(doc, child, context_tag))
}

fn is_inline_node(doc: &Document, node: NodeId, context_tag: Option<&str>) -> bool {
    if doc.is_comment(node) || is_phrasing_content(doc, node) {
        return true;
    }
    let Some(context) = context_tag else {
        return false;
    };
    let tag = doc.node_name(node);
    INLINE_GROUPS
        .iter()
        .any(|group| group.contains(&tag) && group.contains(&context))
}

/// Whether a node is media that belongs in its own [`EMBED_CONTAINER`].
pub fn is_embedded(doc: &Document, node: NodeId, schema: &Schema) -> bool {
    let Some(container) = schema.get(EMBED_CONTAINER) else {
        return false;
    };
    let Some(allowed) = container.children.as_ref().and_then(|c| c.schema()) else {
        return false;
    };

    let tag = doc.node_name(node);
    tag != CAPTION && !is_phrasing_content(doc, node) && allowed.contains(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Children, SchemaEntry};

    #[test]
    fn test_plain_text() {
        assert!(is_plain("just text"));
        assert!(is_plain("a<br>b<br>c"));
        assert!(!is_plain("<p>a</p>"));
        assert!(!is_plain("a<em>b</em>"));
        assert!(!is_plain(""));
    }

    #[test]
    fn test_inline_phrasing() {
        assert!(is_inline_content("<strong>a</strong><em>b</em>", None));
        assert!(is_inline_content("plain <a href='#'>link</a> text", None));
        assert!(is_inline_content("a<br>b", None));
        assert!(is_inline_content("<span>x</span>", None));
        assert!(is_inline_content("<b>a</b> <i>b</i> <u>c</u>", None));
    }

    #[test]
    fn test_comments_do_not_force_blocks() {
        assert!(is_inline_content("<!--StartFragment--><strong>x</strong><!--EndFragment-->", None));
        assert!(is_inline_content("<em>a<!-- note -->b</em>", None));
        assert!(!is_inline_content("<!--StartFragment--><p>x</p><!--EndFragment-->", None));
    }

    #[test]
    fn test_block_tags_are_not_inline() {
        assert!(!is_inline_content("<p>a</p><p>b</p>", None));
        assert!(!is_inline_content("<strong><div>a</div></strong>", None));
    }

    #[test]
    fn test_double_break_forces_blocks() {
        assert!(!is_inline_content("a<br><br>b", None));
        assert!(!is_inline_content("<em>a<br><br>b</em>", None));
    }

    #[test]
    fn test_tag_groups() {
        assert!(is_inline_content("<li>a</li>", Some("ul")));
        assert!(is_inline_content("<ul><li>a</li></ul>", Some("ol")));
        assert!(is_inline_content("<h2>title</h2>", Some("h1")));
        assert!(!is_inline_content("<h2>title</h2>", Some("p")));
        assert!(!is_inline_content("<li>a</li>", Some("h1")));
        assert!(!is_inline_content("<li>a</li>", None));
    }

    #[test]
    fn test_embedded() {
        let schema = Schema::new().with(
            EMBED_CONTAINER,
            SchemaEntry::new().with_children(Children::Nested(
                Schema::new()
                    .with("img", SchemaEntry::new())
                    .with("a", SchemaEntry::new())
                    .with(CAPTION, SchemaEntry::new()),
            )),
        );
        let doc = parse_html("<img><figcaption>c</figcaption><a href='#'>x</a><video></video>");
        let nodes = doc.child_ids(doc.document());

        assert!(is_embedded(&doc, nodes[0], &schema));
        assert!(!is_embedded(&doc, nodes[1], &schema), "captions are never promoted");
        assert!(!is_embedded(&doc, nodes[2], &schema), "phrasing content is never promoted");
        assert!(!is_embedded(&doc, nodes[3], &schema), "not a figure child");
        assert!(!is_embedded(&doc, nodes[0], &Schema::new()));
    }
}
