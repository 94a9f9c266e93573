//! HTML page — side-by-side docs and code table.

use crate::error::GenerateError;
use crate::model::{Section, SourceLink};
use askama::Template;

/// Stylesheet shipped next to the generated pages.
pub const STYLESHEET: &str = include_str!("../../resources/sidedoc.css");
pub const STYLESHEET_NAME: &str = "sidedoc.css";

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate<'a> {
    pub title: &'a str,
    /// Source path as given on the command line.
    pub source: &'a str,
    /// Link to the stylesheet, relative to the page.
    pub stylesheet: &'a str,
    /// Every generated page; the menu is only shown when there are several.
    pub sources: &'a [SourceLink],
    pub sections: &'a [Section],
}

impl PageTemplate<'_> {
    pub fn render_page(&self) -> Result<String, GenerateError> {
        Ok(self.render()?)
    }
}
