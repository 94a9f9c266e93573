//! Data model shared by the splitter, merger and page assembler.

/// One comment block and the code that follows it.
///
/// The splitter fills the text fields; `docs_html` and `code_html` stay empty
/// until the prose renderer and highlight merger populate them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Section {
    /// Position in source order, starting at 0.
    pub index: usize,
    pub docs_text: String,
    pub code_text: String,
    pub docs_html: String,
    pub code_html: String,
}

impl Section {
    pub fn new(index: usize, docs_text: String, code_text: String) -> Self {
        Self {
            index,
            docs_text,
            code_text,
            ..Self::default()
        }
    }
}

/// Link to another generated page, for the "jump to" menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLink {
    pub basename: String,
    /// Relative to the page that shows the link.
    pub url: String,
}

/// Everything the page template needs for one source file.
#[derive(Debug)]
pub struct Page {
    pub title: String,
    pub source: String,
    pub destination: std::path::PathBuf,
    pub sections: Vec<Section>,
}
