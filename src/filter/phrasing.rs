//! Presentational inline markup rewritten as semantic phrasing content.

use crate::dom::{Document, NodeId};
use crate::schema::Schema;

/// Parsed `style` declarations relevant to inline semantics.
#[derive(Debug, Default)]
struct InlineStyle {
    bold: bool,
    italic: bool,
    line_through: bool,
    vertical_align: Option<String>,
}

impl InlineStyle {
    fn parse(style: &str) -> Self {
        let mut parsed = InlineStyle::default();
        for declaration in style.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim().to_ascii_lowercase();
            match property.as_str() {
                "font-weight" => parsed.bold = value == "bold" || value == "700",
                "font-style" => parsed.italic = value == "italic",
                "text-decoration" | "text-decoration-line" => {
                    parsed.line_through |= value.contains("line-through")
                }
                "vertical-align" => parsed.vertical_align = Some(value),
                _ => {}
            }
        }
        parsed
    }
}

/// Insert `tag` in place of `node` and move `node` into it.
fn wrap(doc: &mut Document, node: NodeId, tag: &str) {
    let wrapper = doc.create_html_element(tag);
    doc.insert_before(node, wrapper);
    doc.append(wrapper, node);
}

/// Turn `b`/`i` and styled `span`s into `strong`, `em`, `del`, `sup`, `sub`.
pub fn phrasing_content_reducer(node: NodeId, doc: &mut Document, _schema: &Schema) {
    let tag = doc.node_name(node).to_string();
    match tag.as_str() {
        "b" => doc.rename(node, "strong"),
        "i" => doc.rename(node, "em"),
        "span" => {
            let Some(style) = doc.get_attr(node, "style").map(InlineStyle::parse) else {
                return;
            };
            if style.bold {
                wrap(doc, node, "strong");
            }
            if style.italic {
                wrap(doc, node, "em");
            }
            if style.line_through {
                wrap(doc, node, "del");
            }
            match style.vertical_align.as_deref() {
                Some("super") => wrap(doc, node, "sup"),
                Some("sub") => wrap(doc, node, "sub"),
                _ => {}
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::deep_filter_html;

    fn run(html: &str) -> String {
        deep_filter_html(html, &[phrasing_content_reducer], &Schema::new())
    }

    #[test]
    fn test_renames_presentational_tags() {
        assert_eq!(run("<b>a</b><i>b</i>"), "<strong>a</strong><em>b</em>");
    }

    #[test]
    fn test_styled_span_is_wrapped() {
        assert_eq!(
            run(r#"<span style="font-weight: 700; font-style: italic">x</span>"#),
            r#"<em><strong><span style="font-weight: 700; font-style: italic">x</span></strong></em>"#
        );
    }

    #[test]
    fn test_decoration_and_alignment() {
        assert_eq!(
            run(r#"<span style="text-decoration: underline line-through">x</span>"#),
            r#"<del><span style="text-decoration: underline line-through">x</span></del>"#
        );
        assert_eq!(
            run(r#"<span style="vertical-align:super">2</span>"#),
            r#"<sup><span style="vertical-align:super">2</span></sup>"#
        );
    }

    #[test]
    fn test_plain_span_untouched() {
        assert_eq!(run("<span>x</span>"), "<span>x</span>");
        assert_eq!(run(r#"<span style="color: red">x</span>"#), r#"<span style="color: red">x</span>"#);
    }
}
