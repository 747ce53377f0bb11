//! Property tests for the sanitizer and schema composition.

use blockpaste::schema::{Children, Schema, SchemaEntry, phrasing_schema};
use blockpaste::{BlockRegistry, RawTransform, Registry, block_content_schema, remove_invalid_html};
use proptest::prelude::*;

fn paragraph_schema() -> Schema {
    Schema::new()
        .with(
            "p",
            SchemaEntry::new()
                .with_attributes(&["id"])
                .with_classes(&["keep"])
                .with_children(Children::Nested(phrasing_schema().clone())),
        )
        .merged(phrasing_schema())
}

/// Nested markup from a small tag vocabulary, valid and invalid alike.
fn arb_html() -> impl Strategy<Value = String> {
    let leaf = "[a-z]{1,4}".prop_map(String::from);
    leaf.prop_recursive(4, 32, 4, |inner| {
        let open = prop_oneof![
            Just("p"),
            Just("p class=\"keep drop\""),
            Just("div"),
            Just("section"),
            Just("span"),
            Just("strong"),
            Just("em"),
            Just("b"),
            Just("del"),
            Just("code"),
            Just("a href=\"#\""),
        ];
        (open, prop::collection::vec(inner, 0..4)).prop_map(|(open, children)| {
            let tag = open.split(' ').next().unwrap_or(open);
            format!("<{open}>{}</{tag}>", children.concat())
        })
    })
}

fn core_schema() -> Schema {
    Registry::with_core_blocks().block_content_schema().merged(phrasing_schema())
}

fn core_transform_count() -> usize {
    Registry::with_core_blocks().raw_transforms().len()
}

/// Markup over the block containers of the core schema, with whitespace-only
/// text and `require` constraints in play. Text never holds newlines, which
/// the parser drops right after `<pre>`.
fn arb_block_html() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        "[a-z ]{1,4}".prop_map(String::from),
        Just(" ".to_string()),
        Just("  ".to_string()),
        Just(r#"<img src="x">"#.to_string()),
        Just("<br>".to_string()),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        let open = prop_oneof![
            Just("p"),
            Just("div"),
            Just("figure"),
            Just("figcaption"),
            Just("ul"),
            Just("ol"),
            Just("li"),
            Just("blockquote"),
            Just("cite"),
            Just("pre"),
            Just("code"),
            Just("strong"),
            Just("em"),
            Just("span"),
            Just("a href=\"#\""),
        ];
        (open, prop::collection::vec(inner, 0..4)).prop_map(|(open, children)| {
            let tag = open.split(' ').next().unwrap_or(open);
            format!("<{open}>{}</{tag}>", children.concat())
        })
    })
}

#[test]
fn test_whitespace_only_content_is_stable() {
    for html in ["<p> </p>", "<li> </li>", " <em>a</em>", "<p>a</p> <p>b</p>"] {
        let once = remove_invalid_html(html, phrasing_schema(), true);
        assert_eq!(remove_invalid_html(&once, phrasing_schema(), true), once, "{html:?}");

        let once = remove_invalid_html(html, &core_schema(), false);
        assert_eq!(remove_invalid_html(&once, &core_schema(), false), once, "{html:?}");
    }
}

proptest! {
    #[test]
    fn prop_sanitize_is_idempotent(html in arb_html()) {
        let schema = paragraph_schema();
        let once = remove_invalid_html(&html, &schema, false);
        let twice = remove_invalid_html(&once, &schema, false);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_inline_sanitize_is_idempotent(html in arb_html()) {
        let once = remove_invalid_html(&html, phrasing_schema(), true);
        let twice = remove_invalid_html(&once, phrasing_schema(), true);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_core_schema_sanitize_is_idempotent(html in arb_block_html()) {
        let schema = core_schema();
        let once = remove_invalid_html(&html, &schema, false);
        let twice = remove_invalid_html(&once, &schema, false);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_inline_sanitize_with_whitespace_is_idempotent(html in arb_block_html()) {
        let once = remove_invalid_html(&html, phrasing_schema(), true);
        let twice = remove_invalid_html(&once, phrasing_schema(), true);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_sanitize_keeps_all_text(html in arb_html()) {
        // Nothing in the vocabulary is dropped outright, only unwrapped.
        let letters = |s: &str| s.chars().filter(char::is_ascii_lowercase).count();
        let input_text = html.split('<').map(|part| part.split_once('>').map_or(part, |(_, t)| t)).collect::<String>();
        let output = remove_invalid_html(&html, &paragraph_schema(), false);
        let output_text = output.split('<').map(|part| part.split_once('>').map_or(part, |(_, t)| t)).collect::<String>();
        prop_assert_eq!(letters(&input_text), letters(&output_text));
    }

    #[test]
    fn prop_block_schema_merge_is_order_independent(
        order in Just((0..core_transform_count()).collect::<Vec<_>>()).prop_shuffle()
    ) {
        let registry = Registry::with_core_blocks();
        let transforms: Vec<&RawTransform> = registry.raw_transforms();
        let expected = block_content_schema(transforms.iter().copied());

        let shuffled = order.iter().filter_map(|&i| transforms.get(i).copied());
        prop_assert_eq!(block_content_schema(shuffled), expected);
    }
}
