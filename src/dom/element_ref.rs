//! selectors crate Element implementation for the arena [`Document`].
//!
//! Only what `require` constraints, raw transform matchers and attribute
//! sources need: type, class, id and attribute selectors with combinators.
//! Pasted content is static, so no pseudo-classes are recognized.

use std::fmt;

use html5ever::{LocalName, Namespace};
use precomputed_hash::PrecomputedHash;
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::context::MatchingContext;
use selectors::matching::ElementSelectorFlags;
use selectors::parser::SelectorParseErrorKind;
use selectors::{OpaqueElement, SelectorImpl};

use super::arena::{Document, NodeData, NodeId};

/// Selector implementation over the paste DOM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteSelectors;

/// Identifiers, class names and attribute values in selectors.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Ident(String);

impl PrecomputedHash for Ident {
    fn precomputed_hash(&self) -> u32 {
        self.0
            .bytes()
            .fold(0u32, |h, byte| h.wrapping_mul(31).wrapping_add(u32::from(byte)))
    }
}

impl From<&str> for Ident {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl cssparser::ToCss for Ident {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

/// Tag and attribute names, interned by html5ever.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name(LocalName);

impl PrecomputedHash for Name {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self(LocalName::from(s))
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl cssparser::ToCss for Name {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

/// Namespace URLs. Everything pasted lives in the HTML namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Ns(Namespace);

impl PrecomputedHash for Ns {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl From<&str> for Ns {
    fn from(s: &str) -> Self {
        Self(Namespace::from(s))
    }
}

impl cssparser::ToCss for Ns {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

/// Uninhabited: no pseudo-elements or pseudo-classes parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Unsupported {}

impl cssparser::ToCss for Unsupported {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for Unsupported {
    type Impl = PasteSelectors;
}

impl selectors::parser::NonTSPseudoClass for Unsupported {
    type Impl = PasteSelectors;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

impl<'i> selectors::parser::Parser<'i> for PasteSelectors {
    type Impl = PasteSelectors;
    type Error = SelectorParseErrorKind<'i>;
}

impl SelectorImpl for PasteSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = Ident;
    type Identifier = Ident;
    type LocalName = Name;
    type NamespaceUrl = Ns;
    type NamespacePrefix = Ident;
    type BorrowedLocalName = Name;
    type BorrowedNamespaceUrl = Ns;
    type NonTSPseudoClass = Unsupported;
    type PseudoElement = Unsupported;
}

/// An element of a [`Document`] as seen by selector matching.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> ElementRef<'a> {
    pub fn new(doc: &'a Document, id: NodeId) -> Self {
        Self { doc, id }
    }

    fn at(&self, id: NodeId) -> Self {
        Self::new(self.doc, id)
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> {:?}", self.doc.node_name(self.id), self.id)
    }
}

impl selectors::Element for ElementRef<'_> {
    type Impl = PasteSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self)
    }

    fn parent_element(&self) -> Option<Self> {
        self.doc
            .parent(self.id)
            .filter(|&parent| self.doc.is_element(parent))
            .map(|parent| self.at(parent))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.doc.prev_element_sibling(self.id).map(|id| self.at(id))
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.doc.next_element_sibling(self.id).map(|id| self.at(id))
    }

    fn first_element_child(&self) -> Option<Self> {
        self.doc.element_children(self.id).first().map(|&id| self.at(id))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, name: &Name) -> bool {
        self.doc.element_name(self.id) == Some(&name.0)
    }

    fn has_namespace(&self, ns: &Ns) -> bool {
        self.doc.element_namespace(self.id) == Some(&ns.0)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.doc.element_name(self.id) == other.doc.element_name(other.id)
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&Ns>,
        local_name: &Name,
        operation: &AttrSelectorOperation<&Ident>,
    ) -> bool {
        self.doc
            .attrs(self.id)
            .iter()
            .find(|attr| {
                attr.name.local == local_name.0
                    && match ns {
                        NamespaceConstraint::Any => true,
                        NamespaceConstraint::Specific(ns) => attr.name.ns == ns.0,
                    }
            })
            .is_some_and(|attr| operation.eval_str(&attr.value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &Unsupported,
        _context: &mut MatchingContext<'_, PasteSelectors>,
    ) -> bool {
        match *pc {}
    }

    fn match_pseudo_element(
        &self,
        pe: &Unsupported,
        _context: &mut MatchingContext<'_, PasteSelectors>,
    ) -> bool {
        match *pe {}
    }

    fn is_link(&self) -> bool {
        self.doc.is_tag(self.id, "a") && self.doc.get_attr(self.id, "href").is_some()
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &Ident, case_sensitivity: CaseSensitivity) -> bool {
        self.doc
            .get_attr(self.id, "id")
            .is_some_and(|own| case_sensitivity.eq(own.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &Ident, case_sensitivity: CaseSensitivity) -> bool {
        self.doc
            .element_classes(self.id)
            .any(|class| case_sensitivity.eq(class.as_bytes(), name.0.as_bytes()))
    }

    fn imported_part(&self, _name: &Ident) -> Option<Ident> {
        None
    }

    fn is_part(&self, _name: &Ident) -> bool {
        false
    }

    /// `:empty`: no element children and no text.
    fn is_empty(&self) -> bool {
        self.doc
            .children(self.id)
            .all(|child| match self.doc.get(child).map(|n| &n.data) {
                Some(NodeData::Element { .. }) => false,
                Some(NodeData::Text(text)) => text.is_empty(),
                _ => true,
            })
    }

    fn is_root(&self) -> bool {
        self.doc.parent(self.id) == Some(self.doc.document())
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn add_element_unique_hashes(&self, _filter: &mut selectors::bloom::BloomFilter) -> bool {
        false
    }

    fn has_custom_state(&self, _name: &Ident) -> bool {
        false
    }
}
