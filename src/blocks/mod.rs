//! Blocks, block types and the raw transforms that produce them.
//!
//! A [`BlockRegistry`] answers the questions the converter asks: which raw
//! transforms exist (in dispatch order), how a block type sources its
//! attributes from markup, and which block receives content no transform
//! claims. [`Registry`] is the in-memory implementation;
//! [`Registry::with_core_blocks`] fills it with the core block set.

mod attributes;
mod core_blocks;

pub use attributes::{AttributeDef, AttributeSource, parse_attributes};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::dom::{Document, NodeId, SelectorGroup};
use crate::error::{Error, Result};
use crate::schema::{Schema, block_content_schema, phrasing_schema};

/// Priority of a raw transform that does not set one.
pub const DEFAULT_PRIORITY: i32 = 10;

/// One structured content unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub name: String,
    pub attributes: Map<String, Value>,
    pub inner_blocks: Vec<Block>,
}

impl Block {
    pub fn new(name: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            attributes,
            inner_blocks: Vec::new(),
        }
    }

    pub fn with_inner_blocks(mut self, inner_blocks: Vec<Block>) -> Self {
        self.inner_blocks = inner_blocks;
        self
    }

    /// String value of an attribute, if it is one.
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }
}

/// A registered block type and how its attributes are read from markup.
#[derive(Debug, Clone)]
pub struct BlockType {
    pub name: String,
    pub attributes: Vec<(String, AttributeDef)>,
}

impl BlockType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, def: AttributeDef) -> Self {
        self.attributes.push((name.to_string(), def));
        self
    }
}

/// Converts an HTML fragment into blocks; handed to custom transforms that
/// need to convert nested content.
pub trait RawHandler {
    fn raw_handler(&self, html: &str) -> Vec<Block>;
}

/// Decides whether a top-level element belongs to a transform.
#[derive(Debug, Clone)]
pub enum Matcher {
    Selector(SelectorGroup),
    Predicate(fn(&Document, NodeId) -> bool),
}

/// Builds a schema contribution from the phrasing content schema.
pub type SchemaFn = fn(&Schema) -> Schema;

/// Builds a block from a matched element.
pub type TransformFn = fn(&Document, NodeId, &dyn RawHandler) -> Block;

/// A rule turning one kind of top-level element into a block.
///
/// Without a custom transform the block is built generically from the
/// element's outer HTML and the block type's attribute sources.
#[derive(Debug, Clone)]
pub struct RawTransform {
    pub block_name: String,
    pub matcher: Matcher,
    pub schema: Option<SchemaFn>,
    pub transform: Option<TransformFn>,
    pub priority: i32,
}

impl RawTransform {
    /// A transform claiming elements matched by a CSS selector list.
    pub fn selector(block_name: &str, selector: &str) -> Result<Self> {
        Ok(Self::with_matcher(
            block_name,
            Matcher::Selector(SelectorGroup::parse(selector)?),
        ))
    }

    /// A transform claiming elements accepted by a predicate.
    pub fn predicate(block_name: &str, predicate: fn(&Document, NodeId) -> bool) -> Self {
        Self::with_matcher(block_name, Matcher::Predicate(predicate))
    }

    fn with_matcher(block_name: &str, matcher: Matcher) -> Self {
        Self {
            block_name: block_name.to_string(),
            matcher,
            schema: None,
            transform: None,
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn with_schema(mut self, schema: SchemaFn) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_transform(mut self, transform: TransformFn) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn is_match(&self, doc: &Document, node: NodeId) -> bool {
        match &self.matcher {
            Matcher::Selector(group) => group.matches(doc, node),
            Matcher::Predicate(predicate) => predicate(doc, node),
        }
    }

    /// This transform's schema contribution.
    pub fn schema(&self) -> Option<Schema> {
        self.schema.map(|build| build(phrasing_schema()))
    }
}

/// Read-only view of block types and raw transforms.
pub trait BlockRegistry {
    fn block_type(&self, name: &str) -> Option<&BlockType>;

    /// Every raw transform, lowest priority first, ties in registration order.
    fn raw_transforms(&self) -> Vec<&RawTransform>;

    /// Block receiving top-level elements no raw transform claims.
    fn fallback_block_name(&self) -> Option<&str>;

    /// Build a block, filling attributes the caller left out from defaults.
    fn create_block(&self, name: &str, mut attributes: Map<String, Value>) -> Block {
        if let Some(block_type) = self.block_type(name) {
            for (attr, def) in &block_type.attributes {
                if let Some(default) = &def.default
                    && !attributes.contains_key(attr)
                {
                    attributes.insert(attr.clone(), default.clone());
                }
            }
        }
        Block::new(name, attributes)
    }

    /// Source a block type's attributes from serialized markup.
    fn block_attributes(&self, name: &str, html: &str) -> Map<String, Value> {
        self.block_type(name)
            .map(|block_type| parse_attributes(block_type, html))
            .unwrap_or_default()
    }

    /// The schema every raw transform contributes to.
    fn block_content_schema(&self) -> Schema {
        block_content_schema(self.raw_transforms())
    }
}

/// In-memory [`BlockRegistry`].
#[derive(Debug, Clone, Default)]
pub struct Registry {
    block_types: Vec<BlockType>,
    raw_transforms: Vec<RawTransform>,
    fallback: Option<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the core block types and their raw transforms.
    pub fn with_core_blocks() -> Self {
        core_blocks::registry()
    }

    pub fn register_block_type(&mut self, block_type: BlockType) -> Result<()> {
        if self.block_type(&block_type.name).is_some() {
            return Err(Error::DuplicateBlockType(block_type.name));
        }
        attributes::validate(&block_type)?;
        self.block_types.push(block_type);
        Ok(())
    }

    pub fn register_raw_transform(&mut self, transform: RawTransform) -> Result<()> {
        if self.block_type(&transform.block_name).is_none() {
            return Err(Error::UnknownBlockType(transform.block_name));
        }
        self.raw_transforms.push(transform);
        Ok(())
    }

    pub fn set_fallback_block_name(&mut self, name: &str) -> Result<()> {
        if self.block_type(name).is_none() {
            return Err(Error::UnknownBlockType(name.to_string()));
        }
        self.fallback = Some(name.to_string());
        Ok(())
    }

    pub fn block_types(&self) -> impl Iterator<Item = &BlockType> {
        self.block_types.iter()
    }
}

impl BlockRegistry for Registry {
    fn block_type(&self, name: &str) -> Option<&BlockType> {
        self.block_types.iter().find(|t| t.name == name)
    }

    fn raw_transforms(&self) -> Vec<&RawTransform> {
        let mut transforms: Vec<&RawTransform> = self.raw_transforms.iter().collect();
        transforms.sort_by_key(|t| t.priority);
        transforms
    }

    fn fallback_block_name(&self) -> Option<&str> {
        self.fallback.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register_block_type(
                BlockType::new("test/text")
                    .with_attribute("content", AttributeDef::html(Some("p")))
                    .with_attribute("dropCap", AttributeDef::value(json!(false))),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_duplicate_block_type() {
        let mut registry = registry();
        assert!(matches!(
            registry.register_block_type(BlockType::new("test/text")),
            Err(Error::DuplicateBlockType(name)) if name == "test/text"
        ));
    }

    #[test]
    fn test_invalid_attribute_selector() {
        let mut registry = Registry::new();
        let block_type = BlockType::new("test/bad").with_attribute("x", AttributeDef::text(Some("p >")));
        assert!(matches!(
            registry.register_block_type(block_type),
            Err(Error::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_transform_for_unknown_block() {
        let mut registry = registry();
        let transform = RawTransform::selector("test/missing", "p").unwrap();
        assert!(matches!(
            registry.register_raw_transform(transform),
            Err(Error::UnknownBlockType(_))
        ));
        assert!(registry.set_fallback_block_name("test/missing").is_err());
    }

    #[test]
    fn test_raw_transforms_sorted_by_priority() {
        let mut registry = registry();
        for (selector, priority) in [("h1", 20), ("p", DEFAULT_PRIORITY), ("hr", 5), ("ul", DEFAULT_PRIORITY)] {
            registry
                .register_raw_transform(
                    RawTransform::selector("test/text", selector).unwrap().with_priority(priority),
                )
                .unwrap();
        }
        let order: Vec<i32> = registry.raw_transforms().iter().map(|t| t.priority).collect();
        assert_eq!(order, [5, 10, 10, 20]);

        let doc = crate::dom::parse_html("<ul></ul>");
        let ul = doc.find_by_tag("ul").unwrap();
        let first = registry
            .raw_transforms()
            .into_iter()
            .position(|t| t.is_match(&doc, ul));
        assert_eq!(first, Some(2));
    }

    #[test]
    fn test_create_block_fills_defaults() {
        let registry = registry();
        let mut attributes = Map::new();
        attributes.insert("content".into(), json!("hi"));
        let block = registry.create_block("test/text", attributes);

        assert_eq!(block.attr_str("content"), Some("hi"));
        assert_eq!(block.attributes.get("dropCap"), Some(&json!(false)));
    }

    #[test]
    fn test_block_attributes_from_markup() {
        let registry = registry();
        let attributes = registry.block_attributes("test/text", "<p>a <em>b</em></p>");
        assert_eq!(attributes.get("content"), Some(&json!("a <em>b</em>")));
        assert!(registry.block_attributes("test/missing", "<p>a</p>").is_empty());
    }

    #[test]
    fn test_block_serializes_camel_case() {
        let block = Block::new("core/paragraph", Map::new());
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json, json!({"name": "core/paragraph", "attributes": {}, "innerBlocks": []}));
    }
}
