//! Sourcing block attributes from serialized markup.

use log::warn;
use serde_json::{Map, Value};

use super::BlockType;
use crate::dom::{Document, NodeId, SelectorGroup, parse_html};
use crate::error::Result;

/// Where in the markup an attribute value comes from.
///
/// A `selector` of `None` addresses the fragment as a whole.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeSource {
    /// An attribute of the first element matching `selector`.
    Attribute {
        selector: Option<String>,
        attribute: String,
    },
    /// Inner HTML of the first match.
    Html { selector: Option<String> },
    /// Text content of the first match.
    Text { selector: Option<String> },
    /// The markup itself, unparsed.
    Raw,
}

impl AttributeSource {
    pub fn selector(&self) -> Option<&str> {
        match self {
            AttributeSource::Attribute { selector, .. }
            | AttributeSource::Html { selector }
            | AttributeSource::Text { selector } => selector.as_deref(),
            AttributeSource::Raw => None,
        }
    }
}

/// How one block attribute is read, and its value when the markup has none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeDef {
    pub source: Option<AttributeSource>,
    pub default: Option<Value>,
}

impl AttributeDef {
    pub fn attribute(selector: Option<&str>, attribute: &str) -> Self {
        Self::sourced(AttributeSource::Attribute {
            selector: selector.map(str::to_string),
            attribute: attribute.to_string(),
        })
    }

    pub fn html(selector: Option<&str>) -> Self {
        Self::sourced(AttributeSource::Html {
            selector: selector.map(str::to_string),
        })
    }

    pub fn text(selector: Option<&str>) -> Self {
        Self::sourced(AttributeSource::Text {
            selector: selector.map(str::to_string),
        })
    }

    pub fn raw() -> Self {
        Self::sourced(AttributeSource::Raw)
    }

    /// An attribute never read from markup, only set or defaulted.
    pub fn value(default: Value) -> Self {
        Self {
            source: None,
            default: Some(default),
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    fn sourced(source: AttributeSource) -> Self {
        Self {
            source: Some(source),
            default: None,
        }
    }

    fn read(&self, doc: &Document, html: &str) -> Option<Value> {
        let source = self.source.as_ref()?;
        if let AttributeSource::Raw = source {
            return Some(Value::String(html.to_string()));
        }

        let node = select(doc, source.selector())?;
        match source {
            AttributeSource::Attribute { attribute, .. } => doc
                .get_attr(node, attribute)
                .map(|value| Value::String(value.to_string())),
            AttributeSource::Html { .. } => Some(Value::String(doc.inner_html(node))),
            AttributeSource::Text { .. } => Some(Value::String(doc.deep_text(node))),
            AttributeSource::Raw => None,
        }
    }
}

fn select(doc: &Document, selector: Option<&str>) -> Option<NodeId> {
    let root = doc.document();
    let Some(selector) = selector else {
        return Some(root);
    };
    match SelectorGroup::parse(selector) {
        Ok(group) => group.query_first(doc, root),
        Err(err) => {
            warn!("skipping attribute source: {err}");
            None
        }
    }
}

/// Check that every attribute selector of a block type parses.
pub(super) fn validate(block_type: &BlockType) -> Result<()> {
    for (_, def) in &block_type.attributes {
        if let Some(selector) = def.source.as_ref().and_then(AttributeSource::selector) {
            SelectorGroup::parse(selector)?;
        }
    }
    Ok(())
}

/// Read every attribute of `block_type` from `html`, falling back to defaults.
pub fn parse_attributes(block_type: &BlockType, html: &str) -> Map<String, Value> {
    let doc = parse_html(html);
    let mut attributes = Map::new();
    for (name, def) in &block_type.attributes {
        if let Some(value) = def.read(&doc, html).or_else(|| def.default.clone()) {
            attributes.insert(name.clone(), value);
        }
    }
    attributes
}
