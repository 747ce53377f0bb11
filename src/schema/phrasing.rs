//! The phrasing content schema: inline markup allowed inside a paragraph.
//!
//! Each phrasing element may contain any other phrasing content except
//! itself, to any depth. The "all phrasing but X" schemas are built once per
//! tag as statics and referenced through [`Children::Shared`], which keeps
//! the model finite without cycles in owned data.

use std::sync::LazyLock;

use super::{Children, Schema, SchemaEntry, TEXT_NODE};
use crate::dom::{Document, NodeId};

/// Phrasing tags that may contain further phrasing content.
const CONTAINER_TAGS: &[&str] = &[
    "strong", "em", "del", "ins", "a", "code", "abbr", "sub", "sup",
];

/// Inline tags outside the schema that still count as phrasing content when
/// deciding how to paste. Filters rewrite or unwrap them later.
const TEXT_LEVEL_TAGS: &[&str] = &[
    "span", "b", "i", "u", "s", "small", "mark", "q", "dfn", "kbd", "samp", "var", "time",
    "data", "bdi", "bdo", "ruby", "rt", "rp", "wbr",
];

static PHRASING: LazyLock<Schema> = LazyLock::new(|| build(None));

macro_rules! phrasing_without {
    ($($name:ident => $tag:literal),* $(,)?) => {
        $(static $name: LazyLock<Schema> = LazyLock::new(|| build(Some($tag)));)*

        fn shared_without(tag: &str) -> &'static LazyLock<Schema> {
            match tag {
                $($tag => &$name,)*
                _ => &PHRASING,
            }
        }
    };
}

phrasing_without! {
    WITHOUT_STRONG => "strong",
    WITHOUT_EM => "em",
    WITHOUT_DEL => "del",
    WITHOUT_INS => "ins",
    WITHOUT_A => "a",
    WITHOUT_CODE => "code",
    WITHOUT_ABBR => "abbr",
    WITHOUT_SUB => "sub",
    WITHOUT_SUP => "sup",
}

fn build(without: Option<&str>) -> Schema {
    let mut schema = Schema::new();
    for &tag in CONTAINER_TAGS {
        if without == Some(tag) {
            continue;
        }
        let mut entry = SchemaEntry::new().with_children(Children::Shared(shared_without(tag)));
        match tag {
            "a" => entry = entry.with_attributes(&["href"]),
            "abbr" => entry = entry.with_attributes(&["title"]),
            _ => {}
        }
        schema.insert(tag, entry);
    }
    schema.insert("br", SchemaEntry::new());
    schema.insert(TEXT_NODE, SchemaEntry::new());
    schema
}

/// The schema of inline content.
pub fn phrasing_schema() -> &'static Schema {
    &PHRASING
}

/// The phrasing schema as a shareable children reference.
pub(crate) fn shared() -> &'static LazyLock<Schema> {
    &PHRASING
}

/// Whether a node is phrasing content: text, schema inline markup or another
/// text-level tag such as `span` or `b`.
pub fn is_phrasing_content(doc: &Document, id: NodeId) -> bool {
    let name = doc.node_name(id);
    PHRASING.contains(name) || TEXT_LEVEL_TAGS.contains(&name)
}
