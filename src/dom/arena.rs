//! Arena-based mutable DOM for paste processing.
//!
//! This module provides an arena-allocated DOM tree that html5ever can parse
//! into and that filters mutate in place. Nodes are addressed by `Copy`
//! indices; a node removed from the tree keeps its slot but loses its parent,
//! which is how [`Document::contains`] tells live nodes from detached ones.

use html5ever::{LocalName, Namespace, QualName, ns};

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value for no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this is a valid node ID.
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Check if this is the sentinel value.
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node type in the arena DOM.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root.
    Document,
    /// Element with name and attributes.
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
    },
    /// Text content.
    Text(String),
    /// Comment.
    Comment(String),
    /// Document type declaration.
    Doctype { name: String },
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

/// A node in the arena DOM.
#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// Build an HTML-namespaced element name.
pub fn html_name(local: &str) -> QualName {
    QualName::new(None, ns!(html), LocalName::from(local))
}

/// Build a no-namespace attribute name.
pub fn attr_name(local: &str) -> QualName {
    QualName::new(None, ns!(), LocalName::from(local))
}

/// The exclusive owner of one tree of nodes.
///
/// All nodes are stored in a contiguous vector. Parent/child/sibling links
/// use indices into this vector. A `Document` is created per processing unit
/// and dropped once it has been serialized.
pub struct Document {
    nodes: Vec<Node>,
    document: NodeId,
}

impl Document {
    /// Create a new empty document with only a root.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            document: NodeId::NONE,
        };
        doc.document = doc.alloc(Node::new(NodeData::Document));
        doc
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the document root ID.
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Create a new element node.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        self.alloc(Node::new(NodeData::Element { name, attrs }))
    }

    /// Create an HTML element with no attributes.
    pub fn create_html_element(&mut self, tag: &str) -> NodeId {
        self.create_element(html_name(tag), Vec::new())
    }

    /// Create a new text node.
    pub fn create_text(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text)))
    }

    /// Create a new comment node.
    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text)))
    }

    /// Create a doctype node.
    pub fn create_doctype(&mut self, name: String) -> NodeId {
        self.alloc(Node::new(NodeData::Doctype { name }))
    }

    /// Append a child to a parent node, detaching it from its old position.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);

        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(NodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
        }

        if last_child.is_some()
            && let Some(last_node) = self.get_mut(last_child)
        {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert a node before a sibling, detaching it from its old position.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        if sibling == new_node {
            return;
        }
        self.detach(new_node);

        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Insert a node after a sibling, detaching it from its old position.
    pub fn insert_after(&mut self, sibling: NodeId, new_node: NodeId) {
        if sibling == new_node {
            return;
        }
        let next = self.next_sibling(sibling);
        if next.is_some() {
            self.insert_before(next, new_node);
        } else if let Some(parent) = self.parent(sibling) {
            self.append(parent, new_node);
        }
    }

    /// Unlink a node from its parent. Its own subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = match self.get(id) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };
        if parent.is_none() {
            return;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(id) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Replace a node by its children, in order, then detach it.
    pub fn unwrap(&mut self, id: NodeId) {
        if self.parent(id).is_none() {
            return;
        }
        for child in self.child_ids(id) {
            self.insert_before(id, child);
        }
        self.detach(id);
    }

    /// Detach every child of a node.
    pub fn remove_children(&mut self, id: NodeId) {
        for child in self.child_ids(id) {
            self.detach(child);
        }
    }

    /// Move every child of `from` to the end of `to`.
    pub fn reparent_children(&mut self, from: NodeId, to: NodeId) {
        for child in self.child_ids(from) {
            self.append(to, child);
        }
    }

    /// Change an element's tag, keeping attributes and children.
    pub fn rename(&mut self, id: NodeId, tag: &str) {
        if let Some(node) = self.get_mut(id)
            && let NodeData::Element { name, .. } = &mut node.data
        {
            *name = html_name(tag);
        }
    }

    /// Append text to an existing text node, or create new if last child isn't text.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(NodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let NodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Whether a node is still reachable from the document root.
    pub fn contains(&self, id: NodeId) -> bool {
        let mut current = id;
        while let Some(node) = self.get(current) {
            if current == self.document {
                return true;
            }
            current = node.parent;
        }
        false
    }

    /// Merge adjacent text nodes and drop empty ones, recursively.
    pub fn normalize(&mut self, id: NodeId) {
        let mut prev_text = NodeId::NONE;
        for child in self.child_ids(id) {
            let Some(text) = self.text_content(child).map(str::to_string) else {
                prev_text = NodeId::NONE;
                self.normalize(child);
                continue;
            };
            if text.is_empty() {
                self.detach(child);
            } else if prev_text.is_some() {
                if let Some(node) = self.get_mut(prev_text)
                    && let NodeData::Text(existing) = &mut node.data
                {
                    existing.push_str(&text);
                }
                self.detach(child);
            } else {
                prev_text = child;
            }
        }
    }

    /// Get the number of allocated nodes (live or detached).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the document root has no children.
    pub fn is_empty(&self) -> bool {
        self.first_child(self.document).is_none()
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> ChildrenIter<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(NodeId::NONE);
        ChildrenIter {
            doc: self,
            current: first,
        }
    }

    /// Snapshot of a node's children, safe to hold across mutations.
    pub fn child_ids(&self, parent: NodeId) -> Vec<NodeId> {
        self.children(parent).collect()
    }

    /// Element children only.
    pub fn element_children(&self, parent: NodeId) -> Vec<NodeId> {
        self.children(parent)
            .filter(|&c| self.is_element(c))
            .collect()
    }

    /// All descendants in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).collect();
        stack.reverse();
        while let Some(current) = stack.pop() {
            out.push(current);
            let mut children: Vec<_> = self.children(current).collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(NodeId::is_some)
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.first_child).filter(NodeId::is_some)
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.last_child).filter(NodeId::is_some)
    }

    /// Next sibling, or `NodeId::NONE`.
    pub fn next_sibling(&self, id: NodeId) -> NodeId {
        self.get(id).map(|n| n.next_sibling).unwrap_or(NodeId::NONE)
    }

    /// Previous sibling, or `NodeId::NONE`.
    pub fn prev_sibling(&self, id: NodeId) -> NodeId {
        self.get(id).map(|n| n.prev_sibling).unwrap_or(NodeId::NONE)
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.next_sibling(id);
        while current.is_some() {
            if self.is_element(current) {
                return Some(current);
            }
            current = self.next_sibling(current);
        }
        None
    }

    pub fn prev_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.prev_sibling(id);
        while current.is_some() {
            if self.is_element(current) {
                return Some(current);
            }
            current = self.prev_sibling(current);
        }
        None
    }

    /// Find the first node (document order) matching a predicate.
    pub fn find<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Node) -> bool,
    {
        self.descendants(self.document)
            .into_iter()
            .find(|&id| self.get(id).is_some_and(&predicate))
    }

    /// Find element by tag name (first match).
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.find(|node| {
            if let NodeData::Element { name, .. } = &node.data {
                name.local.as_ref() == tag
            } else {
                false
            }
        })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    doc: &'a Document,
    current: NodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self.doc.next_sibling(id);
        Some(id)
    }
}

/// Convenience methods for element, text and comment nodes.
impl Document {
    /// Get element's local name (tag).
    pub fn element_name(&self, id: NodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    /// Get element's namespace.
    pub fn element_namespace(&self, id: NodeId) -> Option<&Namespace> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.ns),
            _ => None,
        })
    }

    /// Lowercase node name: the tag for elements, `#text`, `#comment`, ...
    pub fn node_name(&self, id: NodeId) -> &str {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Element { name, .. }) => name.local.as_ref(),
            Some(NodeData::Text(_)) => "#text",
            Some(NodeData::Comment(_)) => "#comment",
            Some(NodeData::Document) => "#document",
            Some(NodeData::Doctype { .. }) => "#doctype",
            None => "",
        }
    }

    /// Whether the node is an element with the given tag.
    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.element_name(id).is_some_and(|n| n.as_ref() == tag)
    }

    /// Get an attribute value.
    pub fn get_attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|a| a.name.local.as_ref() == attr_name)
            .map(|a| a.value.as_str())
    }

    /// All attributes of an element (empty for other nodes).
    pub fn attrs(&self, id: NodeId) -> &[Attribute] {
        self.get(id)
            .and_then(|n| match &n.data {
                NodeData::Element { attrs, .. } => Some(attrs.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn has_attributes(&self, id: NodeId) -> bool {
        !self.attrs(id).is_empty()
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(node) = self.get_mut(id)
            && let NodeData::Element { attrs, .. } = &mut node.data
        {
            match attrs.iter_mut().find(|a| a.name.local.as_ref() == name) {
                Some(existing) => existing.value = value.to_string(),
                None => attrs.push(Attribute {
                    name: attr_name(name),
                    value: value.to_string(),
                }),
            }
        }
    }

    /// Remove an attribute if present.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(node) = self.get_mut(id)
            && let NodeData::Element { attrs, .. } = &mut node.data
        {
            attrs.retain(|a| a.name.local.as_ref() != name);
        }
    }

    /// Get element's class tokens.
    pub fn element_classes(&self, id: NodeId) -> impl Iterator<Item = &str> {
        self.get_attr(id, "class")
            .unwrap_or("")
            .split_ascii_whitespace()
    }

    /// Check if node is an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    /// Check if node is a text node.
    pub fn is_text(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| matches!(n.data, NodeData::Text(_)))
    }

    /// Check if node is a comment.
    pub fn is_comment(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Comment(_)))
    }

    /// Get text content of a text node.
    pub fn text_content(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Get the data of a comment node.
    pub fn comment_content(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Comment(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Replace the data of a text node.
    pub fn set_text(&mut self, id: NodeId, text: String) {
        if let Some(node) = self.get_mut(id)
            && let NodeData::Text(existing) = &mut node.data
        {
            *existing = text;
        }
    }

    /// Concatenated text of a node and all its descendants.
    pub fn deep_text(&self, id: NodeId) -> String {
        if let Some(text) = self.text_content(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.text_content(d))
            .collect()
    }
}
