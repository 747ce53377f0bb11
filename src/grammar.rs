//! Parsing content that is already serialized as blocks.
//!
//! Blocks are delimited by HTML comments:
//!
//! ```text
//! <!-- wp:paragraph {"dropCap":true} --><p>Hi</p><!-- /wp:paragraph -->
//! <!-- wp:separator /-->
//! ```
//!
//! Delimiters nest; markup outside any delimiter becomes freeform blocks.

use std::sync::LazyLock;

use log::warn;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::blocks::{Block, BlockRegistry};

/// Marker whose presence routes input through a [`BlockGrammar`].
pub const BLOCK_MARKER: &str = "<!-- wp:";

/// Block receiving markup outside any delimiter.
pub const FREEFORM_BLOCK: &str = "core/freeform";

const DEFAULT_NAMESPACE: &str = "core/";

/// Parses serialized blocks.
pub trait BlockGrammar {
    fn parse(&self, html: &str, registry: &dyn BlockRegistry) -> Vec<Block>;
}

static DELIMITER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--\s+(/)?wp:([a-z][a-z0-9_-]*/)?([a-z][a-z0-9_-]*)\s+(\{.*?\}\s+)?(/)?-->")
        .unwrap()
});

/// The comment-delimited block grammar.
#[derive(Debug, Default, Clone, Copy)]
pub struct DelimitedGrammar;

/// A block whose closing delimiter has not been seen yet.
struct Frame {
    name: String,
    attrs: Map<String, Value>,
    inner_blocks: Vec<Block>,
    inner_html: String,
}

enum Token {
    Opener { name: String, attrs: Map<String, Value> },
    Closer { name: String },
    Void { name: String, attrs: Map<String, Value> },
}

impl Token {
    fn from_captures(caps: &Captures<'_>) -> Self {
        let namespace = caps.get(2).map_or(DEFAULT_NAMESPACE, |m| m.as_str());
        let name = format!("{namespace}{}", &caps[3]);
        if caps.get(1).is_some() {
            return Token::Closer { name };
        }

        let attrs = match caps.get(4) {
            Some(json) => serde_json::from_str(json.as_str().trim()).unwrap_or_else(|err| {
                warn!("ignoring attributes of {name}: {err}");
                Map::new()
            }),
            None => Map::new(),
        };
        if caps.get(5).is_some() {
            Token::Void { name, attrs }
        } else {
            Token::Opener { name, attrs }
        }
    }
}

struct Parser<'r> {
    registry: &'r dyn BlockRegistry,
    output: Vec<Block>,
    stack: Vec<Frame>,
}

impl Parser<'_> {
    fn push_html(&mut self, html: &str) {
        match self.stack.last_mut() {
            Some(frame) => frame.inner_html.push_str(html),
            None => {
                if let Some(block) = freeform(html, self.registry) {
                    self.output.push(block);
                }
            }
        }
    }

    fn push_block(&mut self, block: Block) {
        match self.stack.last_mut() {
            Some(frame) => frame.inner_blocks.push(block),
            None => self.output.push(block),
        }
    }

    fn finish(&self, frame: Frame) -> Block {
        let mut attributes = self.registry.block_attributes(&frame.name, &frame.inner_html);
        attributes.extend(frame.attrs);
        self.registry
            .create_block(&frame.name, attributes)
            .with_inner_blocks(frame.inner_blocks)
    }

    fn close_top(&mut self) {
        if let Some(frame) = self.stack.pop() {
            let block = self.finish(frame);
            self.push_block(block);
        }
    }
}

fn freeform(html: &str, registry: &dyn BlockRegistry) -> Option<Block> {
    if html.trim().is_empty() {
        return None;
    }
    let mut attributes = Map::new();
    attributes.insert("content".into(), Value::String(html.to_string()));
    Some(registry.create_block(FREEFORM_BLOCK, attributes))
}

impl BlockGrammar for DelimitedGrammar {
    fn parse(&self, html: &str, registry: &dyn BlockRegistry) -> Vec<Block> {
        let mut parser = Parser {
            registry,
            output: Vec::new(),
            stack: Vec::new(),
        };

        let mut pos = 0;
        for caps in DELIMITER.captures_iter(html) {
            let Some(delimiter) = caps.get(0) else {
                continue;
            };
            parser.push_html(&html[pos..delimiter.start()]);
            pos = delimiter.end();

            match Token::from_captures(&caps) {
                Token::Void { name, attrs } => {
                    let block = parser.finish(Frame {
                        name,
                        attrs,
                        inner_blocks: Vec::new(),
                        inner_html: String::new(),
                    });
                    parser.push_block(block);
                }
                Token::Opener { name, attrs } => parser.stack.push(Frame {
                    name,
                    attrs,
                    inner_blocks: Vec::new(),
                    inner_html: String::new(),
                }),
                Token::Closer { name } => {
                    if parser.stack.last().is_some_and(|frame| frame.name == name) {
                        parser.close_top();
                    } else {
                        warn!("unmatched closing delimiter for {name}");
                        parser.push_html(delimiter.as_str());
                    }
                }
            }
        }
        parser.push_html(&html[pos..]);

        while !parser.stack.is_empty() {
            parser.close_top();
        }
        parser.output
    }
}
