//! Prose rendering — comment text to HTML via Markdown.

use crate::model::Section;
use pulldown_cmark::{html, Options, Parser};
use std::borrow::Cow;

/// Renders a block of comment text to HTML.
pub trait ProseRenderer {
    fn render(&self, text: &str) -> String;
}

/// CommonMark with the usual GitHub extensions.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownRenderer;

impl ProseRenderer for MarkdownRenderer {
    fn render(&self, text: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;
        let parser = Parser::new_ext(text, options);
        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

/// Normalise text before rendering: drop a byte-order mark and convert
/// `\r\n` and lone `\r` line endings to `\n`.
pub fn decode(text: &str) -> Cow<'_, str> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Decode raw source bytes. Anything that is not valid UTF-8 is read as
/// ISO-8859-1, where every byte maps to the code point of the same value.
pub fn decode_bytes(bytes: &[u8]) -> String {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect::<String>()),
    };
    decode(&text).into_owned()
}

/// Fill in `docs_html` for every section.
pub fn render_sections(sections: &mut [Section], renderer: &dyn ProseRenderer) {
    for section in sections {
        section.docs_html = renderer.render(&decode(&section.docs_text));
    }
}
