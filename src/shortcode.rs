//! Splitting pasted HTML around shortcodes.
//!
//! A shortcode is a bracketed macro such as `[gallery ids="1,2"]` or
//! `[caption]<img src="a.png"> text[/caption]`. Registered shortcodes that
//! stand on their own line (or wrap markup) become blocks; the HTML around
//! them is returned as separate pieces.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::blocks::{Block, BlockRegistry};

/// A segment of pasted content: markup still to convert, or a finished block.
#[derive(Debug, Clone, PartialEq)]
pub enum Piece {
    Html(String),
    Block(Block),
}

/// Splits HTML into pieces on shortcode boundaries.
pub trait ShortcodeExtractor {
    fn extract(&self, html: &str, registry: &dyn BlockRegistry) -> Vec<Piece>;
}

/// Recognizes no shortcodes at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoShortcodes;

impl ShortcodeExtractor for NoShortcodes {
    fn extract(&self, html: &str, _registry: &dyn BlockRegistry) -> Vec<Piece> {
        vec![Piece::Html(html.to_string())]
    }
}

/// Maps one shortcode tag to a block.
#[derive(Debug, Clone)]
pub struct ShortcodeTransform {
    pub tag: String,
    pub block_name: String,
    /// `(block attribute, shortcode attribute)` pairs.
    pub attributes: Vec<(String, String)>,
    /// Block attribute receiving the enclosed content.
    pub content_attribute: Option<String>,
}

impl ShortcodeTransform {
    pub fn new(tag: &str, block_name: &str) -> Self {
        Self {
            tag: tag.to_string(),
            block_name: block_name.to_string(),
            attributes: Vec::new(),
            content_attribute: None,
        }
    }

    pub fn with_attribute(mut self, block_attribute: &str, shortcode_attribute: &str) -> Self {
        self.attributes
            .push((block_attribute.to_string(), shortcode_attribute.to_string()));
        self
    }

    pub fn with_content(mut self, block_attribute: &str) -> Self {
        self.content_attribute = Some(block_attribute.to_string());
        self
    }

    fn to_block(&self, shortcode: &Shortcode<'_>, registry: &dyn BlockRegistry) -> Block {
        let mut attributes = Map::new();
        for (block_attribute, shortcode_attribute) in &self.attributes {
            if let Some(value) = shortcode.attrs.named.get(shortcode_attribute) {
                attributes.insert(block_attribute.clone(), Value::String(value.clone()));
            }
        }
        if let (Some(name), Some(content)) = (&self.content_attribute, shortcode.content) {
            attributes.insert(name.clone(), Value::String(content.to_string()));
        }
        registry.create_block(&self.block_name, attributes)
    }
}

/// Converts registered shortcodes into blocks.
#[derive(Debug, Clone, Default)]
pub struct ShortcodeConverter {
    transforms: Vec<ShortcodeTransform>,
}

impl ShortcodeConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transform(mut self, transform: ShortcodeTransform) -> Self {
        self.transforms.push(transform);
        self
    }

    fn segment(&self, html: &str, registry: &dyn BlockRegistry) -> Vec<Piece> {
        for transform in &self.transforms {
            let mut from = 0;
            while let Some(shortcode) = next_shortcode(html, &transform.tag, from) {
                from = shortcode.end;
                let before = &html[..shortcode.start];
                let after = &html[shortcode.end..];

                // Text-only shortcodes inside running text stay text.
                let wraps_markup = shortcode.content.is_some_and(|c| c.contains('<'));
                let own_line = LINE_END.is_match(before) && LINE_START.is_match(after);
                if !wraps_markup && !own_line {
                    continue;
                }

                let mut pieces = self.segment(&LINE_END.replace(before, ""), registry);
                pieces.push(Piece::Block(transform.to_block(&shortcode, registry)));
                pieces.extend(self.segment(&LINE_START.replace(after, ""), registry));
                return pieces;
            }
        }

        if html.trim().is_empty() {
            Vec::new()
        } else {
            vec![Piece::Html(html.to_string())]
        }
    }
}

impl ShortcodeExtractor for ShortcodeConverter {
    fn extract(&self, html: &str, registry: &dyn BlockRegistry) -> Vec<Piece> {
        self.segment(html, registry)
    }
}

static LINE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\n|<p>)\s*$").unwrap());
static LINE_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(\n|</p>)").unwrap());

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"([\w-]+)\s*=\s*"([^"]*)"(?:\s|$)"#,
        r#"|([\w-]+)\s*=\s*'([^']*)'(?:\s|$)"#,
        r#"|([\w-]+)\s*=\s*([^\s'"]+)(?:\s|$)"#,
        r#"|"([^"]*)"(?:\s|$)"#,
        r#"|(\S+)(?:\s|$)"#,
    ))
    .unwrap()
});

/// Parsed shortcode attributes.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ShortcodeAttrs {
    /// `key=value` pairs, keys lowercased.
    pub named: BTreeMap<String, String>,
    /// Bare positional values.
    pub numeric: Vec<String>,
}

impl ShortcodeAttrs {
    pub fn parse(text: &str) -> Self {
        let text = text.replace(['\u{a0}', '\u{200b}'], " ");
        let mut attrs = ShortcodeAttrs::default();
        for caps in ATTRIBUTE.captures_iter(&text) {
            let named = [(1, 2), (3, 4), (5, 6)]
                .into_iter()
                .find_map(|(k, v)| Some((caps.get(k)?, caps.get(v)?)));
            if let Some((key, value)) = named {
                attrs
                    .named
                    .insert(key.as_str().to_lowercase(), value.as_str().to_string());
            } else if let Some(value) = caps.get(7).or_else(|| caps.get(8)) {
                attrs.numeric.push(value.as_str().to_string());
            }
        }
        attrs
    }
}

/// One shortcode occurrence.
#[derive(Debug)]
struct Shortcode<'a> {
    start: usize,
    end: usize,
    attrs: ShortcodeAttrs,
    content: Option<&'a str>,
}

/// Find the next `[tag ...]`, `[tag .../]` or `[tag ...]...[/tag]` at or after
/// `from`. Escaped shortcodes (`[[tag]]`) are skipped.
fn next_shortcode<'a>(html: &'a str, tag: &str, from: usize) -> Option<Shortcode<'a>> {
    let open = format!("[{tag}");
    let close = format!("[/{tag}]");
    let mut search = from;

    while let Some(offset) = html.get(search..)?.find(&open) {
        let start = search + offset;
        let after_tag = start + open.len();
        search = start + 1;

        // The tag name must end here: `[gallery]`, not `[gallery-item]`.
        match html[after_tag..].chars().next() {
            Some(c) if c.is_whitespace() || c == ']' || c == '/' => {}
            _ => continue,
        }

        let open_end = after_tag + html[after_tag..].find(']')? + 1;
        let inside = &html[after_tag..open_end - 1];
        let (inside, self_closing) = match inside.trim_end().strip_suffix('/') {
            Some(inside) => (inside, true),
            None => (inside, false),
        };

        let (end, content) = match html[open_end..].find(&close) {
            Some(offset) if !self_closing => (
                open_end + offset + close.len(),
                Some(&html[open_end..open_end + offset]),
            ),
            _ => (open_end, None),
        };

        if start > 0 && html.as_bytes()[start - 1] == b'[' && html[end..].starts_with(']') {
            search = end;
            continue;
        }

        return Some(Shortcode {
            start,
            end,
            attrs: ShortcodeAttrs::parse(inside),
            content,
        });
    }
    None
}
