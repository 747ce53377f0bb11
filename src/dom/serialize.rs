//! HTML serialization for the arena [`Document`].
//!
//! Emits HTML5 syntax: void elements have no end tag, raw-text elements are
//! written verbatim, and text/attribute values are escaped the way browsers
//! do for `innerHTML`.

use super::arena::{Document, NodeData, NodeId};

/// Elements that never have an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose text children are not escaped.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

impl Document {
    /// Serialize the children of a node.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialize a node including its own tag.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Serialize the whole fragment held by this document.
    pub fn to_html(&self) -> String {
        self.inner_html(self.document())
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };

        match &node.data {
            NodeData::Document => {
                for child in self.children(id) {
                    self.write_node(child, out);
                }
            }
            NodeData::Text(text) => {
                let raw = self
                    .parent(id)
                    .and_then(|p| self.element_name(p))
                    .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag.as_ref()));
                if raw {
                    out.push_str(text);
                } else {
                    escape_text(text, out);
                }
            }
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Doctype { name } => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                out.push('>');
            }
            NodeData::Element { name, attrs } => {
                let tag = name.local.as_ref();
                out.push('<');
                out.push_str(tag);
                for attr in attrs {
                    out.push(' ');
                    if let Some(prefix) = &attr.name.prefix {
                        out.push_str(prefix.as_ref());
                        out.push(':');
                    }
                    out.push_str(attr.name.local.as_ref());
                    out.push_str("=\"");
                    escape_attr(&attr.value, out);
                    out.push('"');
                }
                out.push('>');

                if is_void_element(tag) {
                    return;
                }

                for child in self.children(id) {
                    self.write_node(child, out);
                }

                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn escape_text(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::parse_html;

    #[test]
    fn test_roundtrip_simple_fragment() {
        let html = r#"<p class="a">Hello <strong>world</strong></p><hr><p>x<br>y</p>"#;
        assert_eq!(parse_html(html).to_html(), html);
    }

    #[test]
    fn test_escapes_text_and_attributes() {
        let doc = parse_html("<a title='say \"hi\" &amp; go'>1 &lt; 2&nbsp;</a>");
        assert_eq!(
            doc.to_html(),
            r#"<a title="say &quot;hi&quot; &amp; go">1 &lt; 2&nbsp;</a>"#
        );
    }

    #[test]
    fn test_outer_html_of_nested_element() {
        let doc = parse_html("<ul><li>one</li><li>two</li></ul>");
        let li = doc.find_by_tag("li").unwrap();
        assert_eq!(doc.outer_html(li), "<li>one</li>");
        assert_eq!(doc.inner_html(doc.find_by_tag("ul").unwrap()), "<li>one</li><li>two</li>");
    }

    #[test]
    fn test_comments_are_kept() {
        let doc = parse_html("<p>a<!-- note -->b</p>");
        assert_eq!(doc.to_html(), "<p>a<!-- note -->b</p>");
    }
}
