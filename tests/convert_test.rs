//! End-to-end conversion tests over whole pastes.

use std::fs;

use blockpaste::classify::{is_inline_content, is_plain};
use blockpaste::filter::{deep_filter_html, embedded_content_reducer};
use blockpaste::schema::{Children, Schema, SchemaEntry};
use blockpaste::shortcode::{ShortcodeConverter, ShortcodeTransform};
use blockpaste::{Block, Converted, Converter, Mode, PasteOptions, Registry, convert};
use serde_json::json;

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("{}/{}", FIXTURES_DIR, name)).expect("Failed to read fixture")
}

fn blocks(converted: Converted) -> Vec<Block> {
    match converted {
        Converted::Blocks(blocks) => blocks,
        Converted::Inline(html) => panic!("expected blocks, got inline {html:?}"),
    }
}

fn names(blocks: &[Block]) -> Vec<&str> {
    blocks.iter().map(|b| b.name.as_str()).collect()
}

// ============================================================================
// Classifiers
// ============================================================================

#[test]
fn test_inline_classification() {
    assert!(is_inline_content("<strong>a</strong><em>b</em>", None));
    assert!(!is_inline_content("<p>a</p><p>b</p>", None));
    assert!(!is_inline_content("a<br><br>b", None));
    assert!(is_inline_content("<li>a</li>", Some("ul")));
}

#[test]
fn test_plain_detection() {
    assert!(is_plain("line one\nline two"));
    assert!(!is_plain("<strong>x</strong>"));
}

// ============================================================================
// Embedded content promotion
// ============================================================================

fn figure_schema() -> Schema {
    Schema::new().with(
        "figure",
        SchemaEntry::new().with_children(Children::Nested(Schema::new().with("img", SchemaEntry::new()))),
    )
}

#[test]
fn test_images_promoted_before_paragraph() {
    let html = r#"<p><strong>test<img class="one"></strong><img class="two"></p>"#;
    assert_eq!(
        deep_filter_html(html, &[embedded_content_reducer], &figure_schema()),
        r#"<figure><img class="one"></figure><figure><img class="two"></figure><p><strong>test</strong></p>"#
    );
}

#[test]
fn test_link_promoted_with_image() {
    let html = r##"<p><a href="#"><img class="one"></a><strong>test</strong></p>"##;
    assert_eq!(
        deep_filter_html(html, &[embedded_content_reducer], &figure_schema()),
        r##"<figure><a href="#"><img class="one"></a></figure><p><strong>test</strong></p>"##
    );
}

// ============================================================================
// Whole pastes
// ============================================================================

#[test]
fn test_google_docs_paste() {
    let blocks = blocks(convert(&PasteOptions::html(fixture("google_docs.html"))));
    assert_eq!(names(&blocks), ["core/heading", "core/paragraph", "core/list"]);

    assert_eq!(blocks[0].attributes["level"], json!(1));
    assert_eq!(blocks[0].attr_str("content"), Some("Trip report"));
    assert_eq!(
        blocks[1].attr_str("content"),
        Some("<strong>Bold</strong> and <em>italic</em> text.")
    );
    assert_eq!(blocks[2].attr_str("values"), Some("<li>First</li><li>Second</li>"));
    assert_eq!(blocks[2].attributes["ordered"], json!(false));
}

#[test]
fn test_article_paste() {
    let blocks = blocks(convert(&PasteOptions::html(fixture("article.html"))));
    assert_eq!(
        names(&blocks),
        [
            "core/heading",
            "core/paragraph",
            "core/image",
            "core/quote",
            "core/code",
            "core/separator"
        ]
    );

    assert_eq!(
        blocks[1].attr_str("content"),
        Some(r#"Intro with <a href="https://example.com">a link</a>."#)
    );
    assert_eq!(blocks[2].attr_str("url"), Some("https://example.com/cat.jpg"));
    assert_eq!(blocks[2].attr_str("alt"), Some("Cat"));
    assert_eq!(blocks[3].inner_blocks.len(), 1);
    assert_eq!(blocks[3].inner_blocks[0].attr_str("content"), Some("Quoted."));
    assert_eq!(blocks[4].attr_str("content"), Some("let x = 1;"));
}

#[test]
fn test_disallowed_markup_is_unwrapped_not_lost() {
    let html = "<table><tr><td>cell</td></tr></table><font color=red>warm</font>";
    let blocks = blocks(convert(&PasteOptions::html(html).with_mode(Mode::Blocks)));
    assert_eq!(names(&blocks), ["core/paragraph"]);
    assert_eq!(blocks[0].attr_str("content"), Some("cellwarm"));
}

#[test]
fn test_scripts_and_styles_dropped() {
    let html = "<p>kept</p><script>alert(1)</script><style>p{}</style>";
    let blocks = blocks(convert(&PasteOptions::html(html)));
    assert_eq!(names(&blocks), ["core/paragraph"]);
    assert_eq!(blocks[0].attr_str("content"), Some("kept"));
}

#[test]
fn test_markdown_list() {
    let blocks = blocks(convert(&PasteOptions::plain_text("- one\n- two")));
    assert_eq!(names(&blocks), ["core/list"]);
    assert_eq!(blocks[0].attr_str("values"), Some("<li>one</li><li>two</li>"));
}

#[test]
fn test_ordered_markdown_list_start() {
    let blocks = blocks(convert(&PasteOptions::plain_text("3. three\n4. four")));
    assert_eq!(blocks[0].attributes["ordered"], json!(true));
    assert_eq!(blocks[0].attributes["start"], json!(3));
}

#[test]
fn test_serialized_blocks_round_trip() {
    let html = concat!(
        "<!-- wp:heading {\"level\":4} --><h4>Saved</h4><!-- /wp:heading -->\n",
        "<!-- wp:separator /-->"
    );
    let blocks = blocks(convert(&PasteOptions::html(html)));
    assert_eq!(names(&blocks), ["core/heading", "core/separator"]);
    assert_eq!(blocks[0].attributes["level"], json!(4));
}

#[test]
fn test_shortcodes_split_pieces() {
    let registry = Registry::with_core_blocks();
    let shortcodes =
        ShortcodeConverter::new().with_transform(ShortcodeTransform::new("gallery", "core/gallery").with_attribute("ids", "ids"));
    let converter = Converter::new(&registry).with_shortcodes(&shortcodes);

    let html = "<p>before</p>\n[gallery ids=\"4,5\"]\n<p>after</p>";
    let blocks = blocks(converter.convert(&PasteOptions::html(html)));
    assert_eq!(names(&blocks), ["core/paragraph", "core/gallery", "core/paragraph"]);
    assert_eq!(blocks[1].attr_str("ids"), Some("4,5"));
}

#[test]
fn test_blocks_serialize_to_json() {
    let converted = convert(&PasteOptions::html("<hr>").with_mode(Mode::Blocks));
    let json = serde_json::to_value(&converted).unwrap();
    assert_eq!(json, json!([{"name": "core/separator", "attributes": {}, "innerBlocks": []}]));

    let converted = convert(&PasteOptions::html("<em>x</em>"));
    assert_eq!(serde_json::to_value(&converted).unwrap(), json!("<em>x</em>"));
}
