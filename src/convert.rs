//! The paste pipeline.
//!
//! One call takes whatever the clipboard offered (HTML, plain text or both)
//! and decides which path it takes:
//!
//! 1. Serialized blocks are parsed by the [`BlockGrammar`] and returned as is.
//! 2. Plain text without meaningful HTML goes through Markdown first.
//! 3. Inline content is sanitized against the phrasing schema and returned as
//!    a string.
//! 4. Everything else is split on shortcodes, filtered, sanitized against the
//!    block content schema, normalized into blocks and dispatched to the
//!    registry's raw transforms.
//!
//! Conversion never fails; markup nothing accepts is unwrapped or dropped.

use std::str::FromStr;
use std::sync::LazyLock;

use log::debug;
use memchr::memmem;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::blocks::{Block, BlockRegistry, RawHandler, Registry};
use crate::classify::{is_inline_content, is_plain};
use crate::dom::{Document, NodeId, parse_html};
use crate::error::Error;
use crate::filter::{
    Filter, blockquote_normaliser, br_remover, comment_remover, div_normaliser,
    embedded_content_reducer, empty_paragraph_remover, filter_document, google_docs_uid_remover,
    head_remover, html_formatting_remover, iframe_remover, image_corrector, list_reducer,
    normalise_blocks, phrasing_content_reducer, special_comment_converter,
};
use crate::grammar::{BLOCK_MARKER, BlockGrammar, DelimitedGrammar, FREEFORM_BLOCK};
use crate::markdown::{MarkdownConverter, PulldownMarkdown};
use crate::sanitize::sanitize;
use crate::schema::phrasing_schema;
use crate::shortcode::{NoShortcodes, Piece, ShortcodeExtractor};

/// Block used for unmatched elements when the registry names none.
pub const FALLBACK_BLOCK: &str = "core/html";

/// Filters run over each piece before sanitizing in block mode.
const BLOCK_FILTERS: &[Filter] = &[
    special_comment_converter,
    google_docs_uid_remover,
    head_remover,
    list_reducer,
    image_corrector,
    phrasing_content_reducer,
    comment_remover,
    embedded_content_reducer,
    blockquote_normaliser,
    div_normaliser,
];

/// Filters run after block normalization.
const BLOCK_CLEANUP: &[Filter] = &[html_formatting_remover, br_remover, empty_paragraph_remover];

const INLINE_FILTERS: &[Filter] = &[
    head_remover,
    google_docs_uid_remover,
    phrasing_content_reducer,
    comment_remover,
];

const INLINE_CLEANUP: &[Filter] = &[html_formatting_remover, br_remover];

static META: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<meta[^>]+>").unwrap());
static ENVELOPE_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*<html[^>]*>\s*<body[^>]*>(?:\s*<!--\s*StartFragment\s*-->)?").unwrap()
});
static ENVELOPE_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:<!--\s*EndFragment\s*-->\s*)?</body>\s*</html>\s*$").unwrap()
});

/// What the caller wants back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Inline when the content allows it, blocks otherwise.
    #[default]
    Auto,
    /// Always a sanitized inline string.
    Inline,
    /// Always blocks.
    Blocks,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Mode::Auto),
            "inline" => Ok(Mode::Inline),
            "blocks" => Ok(Mode::Blocks),
            _ => Err(Error::InvalidMode(s.to_string())),
        }
    }
}

/// Input of one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasteOptions {
    pub html: String,
    pub plain_text: String,
    pub mode: Mode,
    /// Tag of the element being pasted into, for inline compatibility.
    pub tag_name: Option<String>,
    /// Keep raw `iframe` embeds instead of replacing them with their URL.
    pub can_user_use_unfiltered_html: bool,
    /// Skip whitespace cleanup of inline results.
    pub preserve_white_space: bool,
}

impl PasteOptions {
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Self::default()
        }
    }

    pub fn plain_text(text: impl Into<String>) -> Self {
        Self {
            plain_text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_plain_text(mut self, text: impl Into<String>) -> Self {
        self.plain_text = text.into();
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_tag_name(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = Some(tag_name.into());
        self
    }

    pub fn with_unfiltered_html(mut self, allowed: bool) -> Self {
        self.can_user_use_unfiltered_html = allowed;
        self
    }

    pub fn with_preserved_white_space(mut self, preserve: bool) -> Self {
        self.preserve_white_space = preserve;
        self
    }
}

/// Result of a conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Converted {
    Inline(String),
    Blocks(Vec<Block>),
}

impl Converted {
    pub fn as_inline(&self) -> Option<&str> {
        match self {
            Converted::Inline(html) => Some(html),
            Converted::Blocks(_) => None,
        }
    }

    pub fn as_blocks(&self) -> Option<&[Block]> {
        match self {
            Converted::Inline(_) => None,
            Converted::Blocks(blocks) => Some(blocks),
        }
    }
}

/// Runs the paste pipeline against a block registry.
///
/// ```
/// use blockpaste::{Converter, PasteOptions, Registry};
///
/// let registry = Registry::with_core_blocks();
/// let converted = Converter::new(&registry).convert(&PasteOptions::html("<h2>Hi</h2><p>there</p>"));
/// let blocks = converted.as_blocks().unwrap();
/// assert_eq!(blocks[0].name, "core/heading");
/// assert_eq!(blocks[1].name, "core/paragraph");
/// ```
pub struct Converter<'a> {
    registry: &'a dyn BlockRegistry,
    markdown: &'a dyn MarkdownConverter,
    shortcodes: &'a dyn ShortcodeExtractor,
    grammar: &'a dyn BlockGrammar,
}

impl<'a> Converter<'a> {
    pub fn new(registry: &'a dyn BlockRegistry) -> Self {
        Self {
            registry,
            markdown: &PulldownMarkdown,
            shortcodes: &NoShortcodes,
            grammar: &DelimitedGrammar,
        }
    }

    pub fn with_markdown(mut self, markdown: &'a dyn MarkdownConverter) -> Self {
        self.markdown = markdown;
        self
    }

    pub fn with_shortcodes(mut self, shortcodes: &'a dyn ShortcodeExtractor) -> Self {
        self.shortcodes = shortcodes;
        self
    }

    pub fn with_grammar(mut self, grammar: &'a dyn BlockGrammar) -> Self {
        self.grammar = grammar;
        self
    }

    pub fn convert(&self, options: &PasteOptions) -> Converted {
        let mut mode = options.mode;
        let mut html = strip_envelope(&options.html);

        if mode != Mode::Inline
            && let Some(blocks) = self.parse_serialized(&html)
        {
            return Converted::Blocks(blocks);
        }

        let plain_text = options.plain_text.as_str();
        if !plain_text.is_empty() && (html.is_empty() || is_plain(&html)) {
            html = if plain_text.trim().is_empty() {
                plain_text.to_string()
            } else {
                debug!("converting plain text as markdown");
                self.markdown.to_html(plain_text)
            };

            if mode == Mode::Auto
                && !plain_text.contains('\n')
                && !plain_text.starts_with("<p>")
                && html.starts_with("<p>")
            {
                debug!("single line of plain text, pasting inline");
                mode = Mode::Inline;
            }
        }

        let pieces = self.shortcodes.extract(&html, self.registry);
        let has_shortcodes = pieces.len() > 1 || pieces.iter().any(|p| matches!(p, Piece::Block(_)));

        if mode == Mode::Inline {
            return Converted::Inline(filter_inline_html(&html, options.preserve_white_space));
        }
        if mode == Mode::Auto
            && !has_shortcodes
            && is_inline_content(&html, options.tag_name.as_deref())
        {
            debug!("content is inline");
            return Converted::Inline(filter_inline_html(&html, options.preserve_white_space));
        }

        let strip_iframes = !options.can_user_use_unfiltered_html;
        let blocks: Vec<Block> = pieces
            .into_iter()
            .flat_map(|piece| match piece {
                Piece::Block(block) => vec![block],
                Piece::Html(html) => self.piece_to_blocks(&html, strip_iframes),
            })
            .collect();
        debug!("converted paste into {} blocks", blocks.len());
        Converted::Blocks(blocks)
    }

    /// Blocks parsed from delimiter comments, unless there are none.
    fn parse_serialized(&self, html: &str) -> Option<Vec<Block>> {
        memmem::find(html.as_bytes(), BLOCK_MARKER.as_bytes())?;

        let blocks = self.grammar.parse(html, self.registry);
        if let [block] = &blocks[..]
            && block.name == FREEFORM_BLOCK
        {
            return None;
        }
        debug!("parsed {} serialized blocks", blocks.len());
        Some(blocks)
    }

    fn piece_to_blocks(&self, html: &str, strip_iframes: bool) -> Vec<Block> {
        let block_schema = self.registry.block_content_schema();
        let schema = block_schema.clone().merged(phrasing_schema());

        let mut filters: Vec<Filter> = Vec::with_capacity(BLOCK_FILTERS.len() + 1);
        if strip_iframes {
            filters.push(iframe_remover);
        }
        filters.extend_from_slice(BLOCK_FILTERS);

        let mut doc = parse_html(html);
        filter_document(&mut doc, &filters, &block_schema);

        let root = doc.document();
        let children = doc.child_ids(root);
        sanitize(&children, &mut doc, &schema, false);
        doc.normalize(root);

        normalise_blocks(&mut doc, root);
        filter_document(&mut doc, BLOCK_CLEANUP, &block_schema);

        self.html_to_blocks(&doc)
    }

    /// One block per top-level element.
    fn html_to_blocks(&self, doc: &Document) -> Vec<Block> {
        let transforms = self.registry.raw_transforms();
        let root = doc.document();

        doc.element_children(root)
            .into_iter()
            .map(|node| {
                let Some(transform) = transforms.iter().find(|t| t.is_match(doc, node)) else {
                    return self.fallback_block(doc, node);
                };
                match transform.transform {
                    Some(build) => {
                        let block = build(doc, node, self);
                        let mut attributes = block.attributes;
                        if let Some(class) = doc.get_attr(node, "class") {
                            attributes.insert("className".into(), Value::String(class.to_string()));
                        }
                        self.registry
                            .create_block(&block.name, attributes)
                            .with_inner_blocks(block.inner_blocks)
                    }
                    None => {
                        let name = &transform.block_name;
                        let attributes = self.registry.block_attributes(name, &doc.outer_html(node));
                        self.registry.create_block(name, attributes)
                    }
                }
            })
            .collect()
    }

    fn fallback_block(&self, doc: &Document, node: NodeId) -> Block {
        let name = self.registry.fallback_block_name().unwrap_or(FALLBACK_BLOCK);
        let html = doc.outer_html(node);
        debug!("no raw transform for <{}>, using {name}", doc.node_name(node));

        let mut attributes = self.registry.block_attributes(name, &html);
        if attributes.is_empty() {
            attributes.insert("content".into(), Value::String(html));
        }
        self.registry.create_block(name, attributes)
    }
}

impl RawHandler for Converter<'_> {
    /// Block conversion of nested markup, as used by container transforms.
    fn raw_handler(&self, html: &str) -> Vec<Block> {
        if let Some(blocks) = self.parse_serialized(html) {
            return blocks;
        }
        self.shortcodes
            .extract(html, self.registry)
            .into_iter()
            .flat_map(|piece| match piece {
                Piece::Block(block) => vec![block],
                Piece::Html(html) => self.piece_to_blocks(&html, false),
            })
            .collect()
    }
}

/// Convert with the core block set and default collaborators.
pub fn convert(options: &PasteOptions) -> Converted {
    let registry = Registry::with_core_blocks();
    Converter::new(&registry).convert(options)
}

/// Sanitize `html` as inline content.
pub fn filter_inline_html(html: &str, preserve_white_space: bool) -> String {
    let schema = phrasing_schema();
    let mut doc = parse_html(html);
    filter_document(&mut doc, INLINE_FILTERS, schema);

    let root = doc.document();
    let children = doc.child_ids(root);
    sanitize(&children, &mut doc, schema, true);

    if !preserve_white_space {
        doc.normalize(root);
        filter_document(&mut doc, INLINE_CLEANUP, schema);
    }
    doc.to_html()
}

/// Drop the first `<meta>` tag and the document envelope some clipboards add.
fn strip_envelope(html: &str) -> String {
    let html = META.replace(html, "");
    let html = ENVELOPE_START.replace(&html, "");
    ENVELOPE_END.replace(&html, "").into_owned()
}
