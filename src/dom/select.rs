//! Compiled CSS selector groups.

use std::fmt;

use selectors::context::{MatchingContext, SelectorCaches};
use selectors::parser::Selector;

use super::arena::{Document, NodeId};
use super::element_ref::{ElementRef, PasteSelectors};
use crate::error::{Error, Result};

/// A parsed, comma-separated selector list such as `"ol, ul"` or `"figure > a"`.
#[derive(Clone)]
pub struct SelectorGroup {
    source: String,
    selectors: Vec<Selector<PasteSelectors>>,
}

impl SelectorGroup {
    /// Parse a selector list.
    pub fn parse(source: &str) -> Result<Self> {
        let mut input = cssparser::ParserInput::new(source);
        let mut parser = cssparser::Parser::new(&mut input);
        let list = selectors::parser::SelectorList::parse(
            &PasteSelectors,
            &mut parser,
            selectors::parser::ParseRelative::No,
        )
        .map_err(|_| Error::InvalidSelector(source.to_string()))?;

        Ok(Self {
            source: source.to_string(),
            selectors: list.slice().to_vec(),
        })
    }

    /// The selector text this group was parsed from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether an element matches any selector in the group.
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        if !doc.is_element(id) {
            return false;
        }
        let elem = ElementRef::new(doc, id);
        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            selectors::matching::MatchingMode::Normal,
            None,
            &mut caches,
            selectors::context::QuirksMode::NoQuirks,
            selectors::matching::NeedsSelectorFlags::No,
            selectors::matching::MatchingForInvalidation::No,
        );

        self.selectors.iter().any(|selector| {
            selectors::matching::matches_selector(selector, 0, None, &elem, &mut context)
        })
    }

    /// First descendant of `scope` (document order) matching the group.
    pub fn query_first(&self, doc: &Document, scope: NodeId) -> Option<NodeId> {
        doc.descendants(scope)
            .into_iter()
            .find(|&id| self.matches(doc, id))
    }
}

impl fmt::Debug for SelectorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SelectorGroup").field(&self.source).finish()
    }
}
