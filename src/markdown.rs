//! Markdown to HTML conversion for plain-text pastes.

use std::sync::LazyLock;

use pulldown_cmark::{Event, Options, Parser};
use regex::Regex;

/// Turns plain text that may contain Markdown into HTML.
pub trait MarkdownConverter {
    fn to_html(&self, text: &str) -> String;
}

/// One-line fenced code as pasted from chat apps: ```` ```code``` ````.
static ONE_LINE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"((?:^|\n)```)([^\n`]+)(```(?:$|\n))").unwrap());

/// Bullet characters used as list markers by word processors.
static BULLET_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(^|\n)•( +)").unwrap());

/// CommonMark via pulldown-cmark, with tables and strikethrough.
///
/// Headings get no ids, intraword underscores stay literal and every line
/// break in a paragraph is kept as `<br>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PulldownMarkdown;

impl PulldownMarkdown {
    fn correct(text: &str) -> String {
        let text = ONE_LINE_FENCE.replace(text, "$1\n$2\n$3");
        BULLET_MARKER.replace_all(&text, "$1*$2").into_owned()
    }
}

impl MarkdownConverter for PulldownMarkdown {
    fn to_html(&self, text: &str) -> String {
        let text = Self::correct(text);

        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);

        let parser = Parser::new_ext(&text, options).map(|event| match event {
            Event::SoftBreak => Event::HardBreak,
            other => other,
        });

        let mut html = String::with_capacity(text.len() * 3 / 2);
        pulldown_cmark::html::push_html(&mut html, parser);
        html.truncate(html.trim_end().len());
        html
    }
}
