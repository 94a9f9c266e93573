//! Highlight merger — one highlighter call per file, split back per section.
//!
//! All sections' code is joined with the language's divider comment, sent to
//! the highlighter in a single call so that multi-line tokens keep their
//! context, and the returned HTML is cut at the rendered dividers. The number
//! of recovered fragments must equal the number of sections.

pub mod pygments;
pub mod remote;

use crate::error::{GenerateError, HighlightError};
use crate::language::LanguageSpec;
use crate::model::Section;
use tracing::{debug, warn};

/// Opening markup the highlighter wraps around its output.
pub const HIGHLIGHT_START: &str = "<div class=\"highlight\"><pre>";
/// Closing markup the highlighter wraps around its output.
pub const HIGHLIGHT_END: &str = "</pre></div>";

/// A synchronous code highlighter producing HTML.
pub trait Highlighter {
    fn highlight(&self, code: &str, lang: &LanguageSpec) -> Result<String, HighlightError>;

    /// Short name used in log output.
    fn name(&self) -> &str {
        "highlighter"
    }
}

impl<F> Highlighter for F
where
    F: Fn(&str, &LanguageSpec) -> Result<String, HighlightError>,
{
    fn highlight(&self, code: &str, lang: &LanguageSpec) -> Result<String, HighlightError> {
        self(code, lang)
    }
}

/// Tries `primary`, and `secondary` only when the primary is not installed.
pub struct Fallback {
    primary: Box<dyn Highlighter>,
    secondary: Box<dyn Highlighter>,
}

impl Fallback {
    pub fn new(primary: Box<dyn Highlighter>, secondary: Box<dyn Highlighter>) -> Self {
        Self { primary, secondary }
    }
}

impl Highlighter for Fallback {
    fn highlight(&self, code: &str, lang: &LanguageSpec) -> Result<String, HighlightError> {
        match self.primary.highlight(code, lang) {
            Err(err) if err.is_not_found() => {
                warn!(
                    primary = self.primary.name(),
                    secondary = self.secondary.name(),
                    error = %err,
                    "falling back to secondary highlighter"
                );
                self.secondary.highlight(code, lang)
            }
            result => result,
        }
    }

    fn name(&self) -> &str {
        self.primary.name()
    }
}

/// Join every section's code, separated by the divider text.
pub fn combine(lang: &LanguageSpec, sections: &[Section]) -> String {
    let mut combined = String::new();
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            combined.push_str(lang.divider_text());
        }
        combined.push_str(&section.code_text);
    }
    combined
}

/// Remove the fixed outer wrapper, leaving the inner highlighted HTML.
/// Output without the wrapper is returned untouched.
fn strip_wrapper(html: &str) -> &str {
    let trimmed = html.trim();
    match trimmed
        .strip_prefix(HIGHLIGHT_START)
        .and_then(|inner| inner.strip_suffix(HIGHLIGHT_END))
    {
        Some(inner) => inner,
        None => html,
    }
}

/// Split highlighted output back into per-section fragments.
///
/// Fails with [`GenerateError::HighlightMismatch`] unless exactly `expected`
/// fragments come back.
pub fn split_highlighted<'a>(
    lang: &LanguageSpec,
    html: &'a str,
    expected: usize,
) -> Result<Vec<&'a str>, GenerateError> {
    let fragments: Vec<&str> = lang.divider_html().split(strip_wrapper(html)).collect();
    if fragments.len() != expected {
        return Err(GenerateError::HighlightMismatch {
            expected,
            found: fragments.len(),
        });
    }
    Ok(fragments)
}

/// Highlight all sections with one call and fill in their `code_html`.
///
/// Sections are left untouched on failure.
pub fn merge(
    lang: &LanguageSpec,
    sections: &mut [Section],
    highlighter: &dyn Highlighter,
) -> Result<(), GenerateError> {
    let combined = combine(lang, sections);
    debug!(
        highlighter = highlighter.name(),
        grammar = %lang.grammar,
        sections = sections.len(),
        bytes = combined.len(),
        "highlighting"
    );
    let output = highlighter.highlight(&combined, lang)?;
    let fragments = split_highlighted(lang, &output, sections.len())?;

    for (section, fragment) in sections.iter_mut().zip(fragments) {
        section.code_html = format!("{HIGHLIGHT_START}{fragment}{HIGHLIGHT_END}");
    }
    Ok(())
}
