//! Per-file pipeline: read → split → highlight → render prose → page.

use crate::error::GenerateError;
use crate::highlight::{self, Highlighter};
use crate::language::Registry;
use crate::model::Page;
use crate::prose::{self, ProseRenderer};
use crate::render::{self, paths::OutputOptions};
use crate::split::split;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Collaborators shared by every file in a run.
pub struct Generator<'a> {
    pub registry: &'a Registry,
    pub highlighter: &'a dyn Highlighter,
    pub prose: &'a dyn ProseRenderer,
    pub options: &'a OutputOptions,
}

impl Generator<'_> {
    /// Build the fully highlighted page for one source file.
    ///
    /// Nothing touches the output directory here; pages are written once the
    /// whole run is known, so the menu only lists pages that exist.
    pub fn prepare(&self, source: &Path) -> Result<Page, GenerateError> {
        let lang = self.registry.for_path(source)?;
        let bytes = fs::read(source).map_err(|e| GenerateError::io(source, e))?;
        let text = prose::decode_bytes(&bytes);

        let mut sections = split(lang, &text);
        debug!(
            source = %source.display(),
            extension = %lang.extension,
            marker = %lang.comment_marker,
            sections = sections.len(),
            "split into sections"
        );

        highlight::merge(lang, &mut sections, self.highlighter)?;
        prose::render_sections(&mut sections, self.prose);

        Ok(render::assemble(source, sections, self.options))
    }
}
