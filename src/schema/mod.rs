//! Content schemas: which tags, attributes, classes and nesting are legal.
//!
//! A [`Schema`] maps a tag name (or [`TEXT_NODE`]) to a [`SchemaEntry`]. The
//! sanitizer walks a tree against a schema, descending into an entry's
//! [`Children`] for valid nodes.
//!
//! Schemas contributed by several raw transforms for the same tag are
//! combined with [`Schema::merge`], which unions attribute, class and
//! require sets and deep-merges children. Every component is an ordered set
//! or map, so the merged value does not depend on contribution order.

mod phrasing;

pub use phrasing::{is_phrasing_content, phrasing_schema};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;

use crate::blocks::RawTransform;

/// Schema key for text nodes.
pub const TEXT_NODE: &str = "#text";

/// Allowed descendants of an element.
#[derive(Clone)]
pub enum Children {
    /// Keep every child untouched.
    Any,
    /// Children are validated against this schema.
    Nested(Schema),
    /// Children are validated against a process-wide schema built once.
    ///
    /// Recursive content models (phrasing inside phrasing, lists inside list
    /// items) refer back to themselves through these statics.
    Shared(&'static LazyLock<Schema>),
}

impl Children {
    /// The schema children are checked against, or `None` for [`Children::Any`].
    pub fn schema(&self) -> Option<&Schema> {
        match self {
            Children::Any => None,
            Children::Nested(schema) => Some(schema),
            Children::Shared(schema) => Some(&***schema),
        }
    }

    fn merged(self, other: &Children) -> Children {
        match (self, other) {
            (Children::Any, _) | (_, Children::Any) => Children::Any,
            (Children::Shared(a), Children::Shared(b)) if std::ptr::eq(a, *b) => {
                Children::Shared(a)
            }
            (this, other) => {
                let mut schema = this.schema().cloned().unwrap_or_default();
                if let Some(other) = other.schema() {
                    schema.merge(other);
                }
                Children::Nested(schema)
            }
        }
    }
}

impl PartialEq for Children {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Children::Any, Children::Any) => true,
            (Children::Nested(a), Children::Nested(b)) => a == b,
            (Children::Shared(a), Children::Shared(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }
}

impl fmt::Debug for Children {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Children::Any => f.write_str("Any"),
            Children::Nested(schema) => f.debug_tuple("Nested").field(schema).finish(),
            Children::Shared(schema) => f
                .debug_tuple("Shared")
                .field(&schema.tags().collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// Rules for one tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaEntry {
    /// Attributes kept on the element. `class` is governed by `classes`.
    pub attributes: BTreeSet<String>,
    /// Class tokens kept in the `class` attribute.
    pub classes: BTreeSet<String>,
    /// Allowed children; `None` means every child is removed.
    pub children: Option<Children>,
    /// Selectors of which at least one must match a descendant.
    pub require: BTreeSet<String>,
    /// Keep the element even when it has nothing in it.
    pub allow_empty: bool,
}

impl SchemaEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attributes(mut self, attributes: &[&str]) -> Self {
        self.attributes
            .extend(attributes.iter().map(|a| a.to_string()));
        self
    }

    pub fn with_classes(mut self, classes: &[&str]) -> Self {
        self.classes.extend(classes.iter().map(|c| c.to_string()));
        self
    }

    pub fn with_children(mut self, children: Children) -> Self {
        self.children = Some(children);
        self
    }

    pub fn with_require(mut self, selectors: &[&str]) -> Self {
        self.require.extend(selectors.iter().map(|s| s.to_string()));
        self
    }

    pub fn allowing_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    /// Union another entry for the same tag into this one.
    pub fn merge(&mut self, other: &SchemaEntry) {
        self.attributes.extend(other.attributes.iter().cloned());
        self.classes.extend(other.classes.iter().cloned());
        self.require.extend(other.require.iter().cloned());
        self.allow_empty |= other.allow_empty;
        self.children = match (self.children.take(), &other.children) {
            (None, None) => None,
            (Some(mine), None) => Some(mine),
            (None, Some(theirs)) => Some(theirs.clone()),
            (Some(mine), Some(theirs)) => Some(mine.merged(theirs)),
        };
    }
}

/// A mapping from tag name to its rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    entries: BTreeMap<String, SchemaEntry>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Schema::insert`].
    pub fn with(mut self, tag: &str, entry: SchemaEntry) -> Self {
        self.insert(tag, entry);
        self
    }

    /// Add an entry, merging with any entry already present for `tag`.
    pub fn insert(&mut self, tag: &str, entry: SchemaEntry) {
        match self.entries.get_mut(tag) {
            Some(existing) => existing.merge(&entry),
            None => {
                self.entries.insert(tag.to_string(), entry);
            }
        }
    }

    pub fn get(&self, tag: &str) -> Option<&SchemaEntry> {
        self.entries.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A copy of this schema without `tag`.
    pub fn without(&self, tag: &str) -> Schema {
        let mut copy = self.clone();
        copy.entries.remove(tag);
        copy
    }

    /// Merge every entry of `other` into this schema.
    pub fn merge(&mut self, other: &Schema) {
        for (tag, entry) in &other.entries {
            self.insert(tag, entry.clone());
        }
    }

    /// Consuming form of [`Schema::merge`].
    pub fn merged(mut self, other: &Schema) -> Schema {
        self.merge(other);
        self
    }
}

/// Compose the block content schema from every raw transform's contribution.
pub fn block_content_schema<'a, I>(transforms: I) -> Schema
where
    I: IntoIterator<Item = &'a RawTransform>,
{
    transforms
        .into_iter()
        .filter_map(RawTransform::schema)
        .fold(Schema::new(), |acc, contribution| acc.merged(&contribution))
}
