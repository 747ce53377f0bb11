//! # blockpaste
//!
//! Converts pasted or dropped content (HTML, plain text that may be
//! Markdown, text with shortcodes) into schema-validated blocks, or into a
//! single sanitized inline fragment.
//!
//! ## Quick Start
//!
//! ```
//! use blockpaste::{Converted, PasteOptions, convert};
//!
//! match convert(&PasteOptions::html("<p>Hello <b>world</b></p><hr>")) {
//!     Converted::Blocks(blocks) => {
//!         assert_eq!(blocks[0].name, "core/paragraph");
//!         assert_eq!(blocks[1].name, "core/separator");
//!     }
//!     Converted::Inline(_) => unreachable!(),
//! }
//!
//! // A short phrasing fragment pastes inline.
//! let inline = convert(&PasteOptions::html("<b>bold</b> move"));
//! assert_eq!(inline.as_inline(), Some("<strong>bold</strong> move"));
//! ```
//!
//! ## Pipeline
//!
//! - [`dom`]: html5ever parsing into an arena document with CSS selector
//!   matching.
//! - [`schema`]: which tags, attributes and classes may appear where.
//! - [`filter`]: the tree filter engine and the cleanup filters.
//! - [`sanitize`]: schema enforcement.
//! - [`classify`]: plain text, inline content and embedded media checks.
//! - [`blocks`]: block types, raw transforms and the registry.
//! - [`convert`]: the orchestrator tying the above together.
//!
//! Markdown, shortcodes and serialized blocks are handled by pluggable
//! collaborators ([`markdown`], [`shortcode`], [`grammar`]).

pub mod blocks;
pub mod classify;
pub mod convert;
pub mod dom;
pub mod error;
pub mod filter;
pub mod grammar;
pub mod markdown;
pub mod sanitize;
pub mod schema;
pub mod shortcode;
pub mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use blocks::{Block, BlockRegistry, BlockType, RawTransform, Registry};
pub use convert::{Converted, Converter, Mode, PasteOptions, convert, filter_inline_html};
pub use error::{Error, Result};
pub use sanitize::remove_invalid_html;
pub use schema::{Schema, SchemaEntry, block_content_schema, phrasing_schema};
