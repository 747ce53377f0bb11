//! The core block set.
//!
//! Each raw transform contributes the schema its block accepts. Together
//! they form the block content schema pasted markup is sanitized against,
//! so a tag survives pasting only if some block can hold it.

use std::sync::LazyLock;

use serde_json::{Map, Value, json};

use super::{AttributeDef, Block, BlockType, RawHandler, RawTransform, Registry};
use crate::dom::{Document, NodeId};
use crate::filter::{COMMENT_BLOCK_ELEMENT, MORE_BLOCK, NEXTPAGE_BLOCK};
use crate::schema::{Children, Schema, SchemaEntry, TEXT_NODE, phrasing_schema};

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];
const ALIGN_CLASSES: &[&str] = &["alignleft", "aligncenter", "alignright", "alignnone"];

/// Phrasing content plus lists, which nest through their items.
static LIST_CONTENT: LazyLock<Schema> = LazyLock::new(|| {
    let items = || {
        Children::Nested(Schema::new().with(
            "li",
            SchemaEntry::new().with_children(Children::Shared(&LIST_CONTENT)),
        ))
    };
    phrasing_schema()
        .clone()
        .with("ul", SchemaEntry::new().with_children(items()))
        .with(
            "ol",
            SchemaEntry::new()
                .with_attributes(&["type", "start", "reversed"])
                .with_children(items()),
        )
});

fn phrasing_children(phrasing: &Schema) -> Children {
    Children::Nested(phrasing.clone())
}

fn is_tag_in(doc: &Document, node: NodeId, tags: &[&str]) -> bool {
    tags.contains(&doc.node_name(node))
}

fn is_code_block(doc: &Document, node: NodeId) -> bool {
    let children = doc.element_children(node);
    doc.is_tag(node, "pre") && children.len() == 1 && doc.is_tag(children[0], "code")
}

fn paragraph_schema(phrasing: &Schema) -> Schema {
    Schema::new().with("p", SchemaEntry::new().with_children(phrasing_children(phrasing)))
}

fn heading_schema(phrasing: &Schema) -> Schema {
    HEADINGS.iter().fold(Schema::new(), |schema, tag| {
        schema.with(tag, SchemaEntry::new().with_children(phrasing_children(phrasing)))
    })
}

fn heading_transform(doc: &Document, node: NodeId, _handler: &dyn RawHandler) -> Block {
    let level = doc
        .node_name(node)
        .strip_prefix('h')
        .and_then(|n| n.parse::<u8>().ok())
        .unwrap_or(2);
    let mut attributes = Map::new();
    attributes.insert("content".into(), Value::String(doc.inner_html(node)));
    attributes.insert("level".into(), json!(level));
    Block::new("core/heading", attributes)
}

fn list_schema(_phrasing: &Schema) -> Schema {
    let mut schema = Schema::new();
    for tag in ["ul", "ol"] {
        if let Some(entry) = LIST_CONTENT.get(tag) {
            schema.insert(tag, entry.clone());
        }
    }
    schema
}

fn list_transform(doc: &Document, node: NodeId, _handler: &dyn RawHandler) -> Block {
    let mut attributes = Map::new();
    attributes.insert("ordered".into(), json!(doc.is_tag(node, "ol")));
    attributes.insert("values".into(), Value::String(doc.inner_html(node)));
    if let Some(start) = doc.get_attr(node, "start").and_then(|s| s.trim().parse::<i64>().ok()) {
        attributes.insert("start".into(), json!(start));
    }
    if doc.get_attr(node, "reversed").is_some() {
        attributes.insert("reversed".into(), json!(true));
    }
    Block::new("core/list", attributes)
}

fn quote_schema(phrasing: &Schema) -> Schema {
    Schema::new().with(
        "blockquote",
        SchemaEntry::new().with_children(Children::Nested(
            Schema::new()
                .with("p", SchemaEntry::new().with_children(phrasing_children(phrasing)))
                .with("cite", SchemaEntry::new().with_children(phrasing_children(phrasing))),
        )),
    )
}

/// Quote content becomes inner blocks; a `cite` becomes the citation.
fn quote_transform(doc: &Document, node: NodeId, handler: &dyn RawHandler) -> Block {
    let mut body = String::new();
    let mut attributes = Map::new();
    for child in doc.children(node) {
        if doc.is_tag(child, "cite") {
            attributes.insert("citation".into(), Value::String(doc.inner_html(child)));
        } else {
            body.push_str(&doc.outer_html(child));
        }
    }
    Block::new("core/quote", attributes).with_inner_blocks(handler.raw_handler(&body))
}

fn image_content() -> Schema {
    Schema::new().with(
        "img",
        SchemaEntry::new()
            .with_attributes(&["src", "alt", "title"])
            .with_classes(ALIGN_CLASSES),
    )
}

fn image_schema(phrasing: &Schema) -> Schema {
    let children = image_content()
        .with(
            "a",
            SchemaEntry::new()
                .with_attributes(&["href", "rel", "target"])
                .with_children(Children::Nested(image_content())),
        )
        .with("figcaption", SchemaEntry::new().with_children(phrasing_children(phrasing)));
    Schema::new().with(
        "figure",
        SchemaEntry::new()
            .with_require(&["img"])
            .with_classes(ALIGN_CLASSES)
            .with_children(Children::Nested(children)),
    )
}

fn is_image_figure(doc: &Document, node: NodeId) -> bool {
    doc.is_tag(node, "figure") && doc.descendants(node).into_iter().any(|d| doc.is_tag(d, "img"))
}

fn image_transform(doc: &Document, node: NodeId, _handler: &dyn RawHandler) -> Block {
    let mut attributes = Map::new();
    let descendants = doc.descendants(node);
    let find = |tag: &str| descendants.iter().copied().find(|&d| doc.is_tag(d, tag));

    if let Some(img) = find("img") {
        for (attr, name) in [("src", "url"), ("alt", "alt"), ("title", "title")] {
            if let Some(value) = doc.get_attr(img, attr) {
                attributes.insert(name.into(), Value::String(value.to_string()));
            }
        }
    }
    attributes.entry("alt").or_insert_with(|| json!(""));

    if let Some(href) = find("a").and_then(|a| doc.get_attr(a, "href")) {
        attributes.insert("href".into(), Value::String(href.to_string()));
        attributes.insert("linkDestination".into(), json!("custom"));
    }
    if let Some(caption) = find("figcaption") {
        attributes.insert("caption".into(), Value::String(doc.inner_html(caption)));
    }
    if let Some(align) = doc
        .element_classes(node)
        .find_map(|class| class.strip_prefix("align"))
    {
        attributes.insert("align".into(), Value::String(align.to_string()));
    }
    Block::new("core/image", attributes)
}

fn code_schema(_phrasing: &Schema) -> Schema {
    Schema::new().with(
        "pre",
        SchemaEntry::new().with_children(Children::Nested(Schema::new().with(
            "code",
            SchemaEntry::new().with_children(Children::Nested(
                Schema::new().with(TEXT_NODE, SchemaEntry::new()),
            )),
        ))),
    )
}

fn preformatted_schema(phrasing: &Schema) -> Schema {
    Schema::new().with("pre", SchemaEntry::new().with_children(phrasing_children(phrasing)))
}

fn separator_schema(_phrasing: &Schema) -> Schema {
    Schema::new().with("hr", SchemaEntry::new())
}

fn embed_schema(phrasing: &Schema) -> Schema {
    Schema::new().with(
        "figure",
        SchemaEntry::new().with_require(&["iframe"]).with_children(Children::Nested(
            Schema::new()
                .with(
                    "iframe",
                    SchemaEntry::new()
                        .with_attributes(&["src", "allowfullscreen", "height", "width"]),
                )
                .with("figcaption", SchemaEntry::new().with_children(phrasing_children(phrasing))),
        )),
    )
}

fn is_embed_figure(doc: &Document, node: NodeId) -> bool {
    doc.is_tag(node, "figure") && doc.descendants(node).into_iter().any(|d| doc.is_tag(d, "iframe"))
}

fn is_comment_block(doc: &Document, node: NodeId, block: &str) -> bool {
    doc.is_tag(node, COMMENT_BLOCK_ELEMENT) && doc.get_attr(node, "data-block") == Some(block)
}

fn comment_block_schema(_phrasing: &Schema) -> Schema {
    Schema::new().with(
        COMMENT_BLOCK_ELEMENT,
        SchemaEntry::new().with_attributes(&["data-block", "data-custom-text", "data-no-teaser"]),
    )
}

fn more_transform(doc: &Document, node: NodeId, _handler: &dyn RawHandler) -> Block {
    let mut attributes = Map::new();
    if let Some(text) = doc.get_attr(node, "data-custom-text") {
        attributes.insert("customText".into(), Value::String(text.to_string()));
    }
    attributes.insert("noTeaser".into(), json!(doc.get_attr(node, "data-no-teaser").is_some()));
    Block::new(MORE_BLOCK, attributes)
}

fn block_types() -> Vec<BlockType> {
    vec![
        BlockType::new("core/paragraph").with_attribute("content", AttributeDef::html(Some("p"))),
        BlockType::new("core/heading")
            .with_attribute("content", AttributeDef::html(Some("h1,h2,h3,h4,h5,h6")))
            .with_attribute("level", AttributeDef::value(json!(2))),
        BlockType::new("core/list")
            .with_attribute("ordered", AttributeDef::value(json!(false)))
            .with_attribute("values", AttributeDef::html(Some("ol,ul")).with_default(json!(""))),
        BlockType::new("core/quote")
            .with_attribute("citation", AttributeDef::html(Some("cite"))),
        BlockType::new("core/image")
            .with_attribute("url", AttributeDef::attribute(Some("img"), "src"))
            .with_attribute("alt", AttributeDef::attribute(Some("img"), "alt").with_default(json!("")))
            .with_attribute("caption", AttributeDef::html(Some("figcaption")))
            .with_attribute("href", AttributeDef::attribute(Some("figure > a"), "href")),
        BlockType::new("core/code").with_attribute("content", AttributeDef::html(Some("code"))),
        BlockType::new("core/preformatted").with_attribute("content", AttributeDef::html(Some("pre"))),
        BlockType::new("core/separator"),
        BlockType::new(MORE_BLOCK)
            .with_attribute(
                "customText",
                AttributeDef::attribute(Some(COMMENT_BLOCK_ELEMENT), "data-custom-text"),
            )
            .with_attribute("noTeaser", AttributeDef::value(json!(false))),
        BlockType::new(NEXTPAGE_BLOCK),
        BlockType::new("core/html").with_attribute("content", AttributeDef::raw()),
        BlockType::new("core/freeform").with_attribute("content", AttributeDef::raw()),
    ]
}

fn raw_transforms() -> Vec<RawTransform> {
    vec![
        RawTransform::predicate("core/paragraph", |doc, node| doc.is_tag(node, "p"))
            .with_schema(paragraph_schema),
        RawTransform::predicate("core/heading", |doc, node| is_tag_in(doc, node, HEADINGS))
            .with_schema(heading_schema)
            .with_transform(heading_transform),
        RawTransform::predicate("core/list", |doc, node| is_tag_in(doc, node, &["ul", "ol"]))
            .with_schema(list_schema)
            .with_transform(list_transform),
        RawTransform::predicate("core/quote", |doc, node| doc.is_tag(node, "blockquote"))
            .with_schema(quote_schema)
            .with_transform(quote_transform),
        RawTransform::predicate("core/image", is_image_figure)
            .with_schema(image_schema)
            .with_transform(image_transform),
        RawTransform::predicate("core/code", is_code_block).with_schema(code_schema),
        RawTransform::predicate("core/preformatted", |doc, node| {
            doc.is_tag(node, "pre") && !is_code_block(doc, node)
        })
        .with_schema(preformatted_schema)
        .with_priority(11),
        RawTransform::predicate("core/separator", |doc, node| doc.is_tag(node, "hr"))
            .with_schema(separator_schema),
        RawTransform::predicate("core/html", is_embed_figure).with_schema(embed_schema),
        RawTransform::predicate(MORE_BLOCK, |doc, node| is_comment_block(doc, node, MORE_BLOCK))
            .with_schema(comment_block_schema)
            .with_transform(more_transform),
        RawTransform::predicate(NEXTPAGE_BLOCK, |doc, node| {
            is_comment_block(doc, node, NEXTPAGE_BLOCK)
        })
        .with_schema(comment_block_schema),
    ]
}

pub(super) fn registry() -> Registry {
    Registry {
        block_types: block_types(),
        raw_transforms: raw_transforms(),
        fallback: Some("core/html".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockRegistry;
    use crate::dom::parse_html;

    struct NoInner;

    impl RawHandler for NoInner {
        fn raw_handler(&self, html: &str) -> Vec<Block> {
            vec![Block::new("test/raw", {
                let mut map = Map::new();
                map.insert("html".into(), json!(html));
                map
            })]
        }
    }

    fn transform(html: &str) -> Block {
        let registry = Registry::with_core_blocks();
        let doc = parse_html(html);
        let node = doc.first_child(doc.document()).unwrap();
        let raw = registry
            .raw_transforms()
            .into_iter()
            .find(|t| t.is_match(&doc, node))
            .unwrap();
        match raw.transform {
            Some(transform) => transform(&doc, node, &NoInner),
            None => registry.create_block(
                &raw.block_name,
                registry.block_attributes(&raw.block_name, &doc.outer_html(node)),
            ),
        }
    }

    #[test]
    fn test_registered_selectors_are_valid() {
        let registry = Registry::with_core_blocks();
        for block_type in registry.block_types() {
            assert!(super::super::attributes::validate(block_type).is_ok(), "{}", block_type.name);
        }
        for raw in registry.raw_transforms() {
            assert!(registry.block_type(&raw.block_name).is_some());
        }
        assert_eq!(registry.fallback_block_name(), Some("core/html"));
    }

    #[test]
    fn test_block_content_schema() {
        let schema = Registry::with_core_blocks().block_content_schema();
        for tag in ["p", "h1", "h6", "ul", "ol", "blockquote", "figure", "pre", "hr", COMMENT_BLOCK_ELEMENT] {
            assert!(schema.contains(tag), "{tag}");
        }

        let figure = schema.get("figure").unwrap();
        assert!(figure.require.contains("img") && figure.require.contains("iframe"));
        let figure_children = figure.children.as_ref().unwrap().schema().unwrap();
        assert!(figure_children.contains("iframe") && figure_children.contains("img"));

        let pre_children = schema.get("pre").unwrap().children.as_ref().unwrap().schema().unwrap();
        let code = pre_children.get("code").unwrap().children.as_ref().unwrap().schema().unwrap();
        assert!(code.contains(TEXT_NODE) && code.contains("em"));
    }

    #[test]
    fn test_list_content_nests_through_items() {
        let ul = LIST_CONTENT.get("ul").unwrap();
        let items = ul.children.as_ref().unwrap().schema().unwrap();
        let li = items.get("li").unwrap().children.as_ref().unwrap().schema().unwrap();
        assert!(li.contains("ol") && li.contains("strong"));
        assert!(!items.contains("ul"));
    }

    #[test]
    fn test_comment_blocks() {
        let block = transform(r#"<wp-block data-block="core/more" data-custom-text="Go on" data-no-teaser=""></wp-block>"#);
        assert_eq!(block.name, MORE_BLOCK);
        assert_eq!(block.attr_str("customText"), Some("Go on"));
        assert_eq!(block.attributes["noTeaser"], json!(true));

        let block = transform(r#"<wp-block data-block="core/nextpage"></wp-block>"#);
        assert_eq!(block.name, NEXTPAGE_BLOCK);
        assert!(block.attributes.is_empty());
    }

    #[test]
    fn test_paragraph() {
        let block = transform("<p>Hello <em>there</em></p>");
        assert_eq!(block.name, "core/paragraph");
        assert_eq!(block.attr_str("content"), Some("Hello <em>there</em>"));
    }

    #[test]
    fn test_heading_level() {
        let block = transform("<h3>Title</h3>");
        assert_eq!(block.name, "core/heading");
        assert_eq!(block.attributes["level"], json!(3));
        assert_eq!(block.attr_str("content"), Some("Title"));
    }

    #[test]
    fn test_list() {
        let block = transform(r#"<ol start="3"><li>a</li><li>b</li></ol>"#);
        assert_eq!(block.name, "core/list");
        assert_eq!(block.attributes["ordered"], json!(true));
        assert_eq!(block.attributes["start"], json!(3));
        assert_eq!(block.attr_str("values"), Some("<li>a</li><li>b</li>"));
    }

    #[test]
    fn test_quote_uses_handler_for_content() {
        let block = transform("<blockquote><p>wise</p><cite>someone</cite></blockquote>");
        assert_eq!(block.name, "core/quote");
        assert_eq!(block.attr_str("citation"), Some("someone"));
        assert_eq!(block.inner_blocks.len(), 1);
        assert_eq!(block.inner_blocks[0].attr_str("html"), Some("<p>wise</p>"));
    }

    #[test]
    fn test_image() {
        let block = transform(
            r#"<figure class="aligncenter"><a href="/big.png"><img src="a.png" alt="A"></a><figcaption>Cap</figcaption></figure>"#,
        );
        assert_eq!(block.name, "core/image");
        assert_eq!(block.attr_str("url"), Some("a.png"));
        assert_eq!(block.attr_str("alt"), Some("A"));
        assert_eq!(block.attr_str("href"), Some("/big.png"));
        assert_eq!(block.attr_str("caption"), Some("Cap"));
        assert_eq!(block.attr_str("align"), Some("center"));
    }

    #[test]
    fn test_code_and_preformatted() {
        let code = transform("<pre><code>let x = 1;</code></pre>");
        assert_eq!(code.name, "core/code");
        assert_eq!(code.attr_str("content"), Some("let x = 1;"));

        let pre = transform("<pre>plain <em>text</em></pre>");
        assert_eq!(pre.name, "core/preformatted");
        assert_eq!(pre.attr_str("content"), Some("plain <em>text</em>"));
    }

    #[test]
    fn test_separator_and_embed() {
        assert_eq!(transform("<hr>").name, "core/separator");

        let embed = transform(r#"<figure><iframe src="https://example.com"></iframe></figure>"#);
        assert_eq!(embed.name, "core/html");
        assert_eq!(
            embed.attr_str("content"),
            Some(r#"<figure><iframe src="https://example.com"></iframe></figure>"#)
        );
    }
}
