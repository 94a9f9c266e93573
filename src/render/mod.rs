//! Page assembler — destination paths, navigation, and writing pages to disk.

pub mod html;
pub mod paths;

use crate::error::GenerateError;
use crate::model::{Page, Section, SourceLink};
use paths::{destination, relative_url, OutputOptions};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// All pages produced in one run, for the cross-page menu.
#[derive(Debug)]
pub struct Site {
    options: OutputOptions,
    /// (source basename, destination) in processing order.
    pages: Vec<(String, PathBuf)>,
}

impl Site {
    /// Only pages that made it through highlighting belong here, so the menu
    /// never links to a file that was not written.
    pub fn new(options: OutputOptions, pages: &[Page]) -> Self {
        let pages = pages
            .iter()
            .map(|page| (page.title.clone(), page.destination.clone()))
            .collect();
        Self { options, pages }
    }

    /// Destinations claimed by more than one source.
    pub fn collisions(&self) -> Vec<&Path> {
        let mut seen: Vec<&Path> = Vec::new();
        let mut dupes: Vec<&Path> = Vec::new();
        for (_, dest) in &self.pages {
            if seen.contains(&dest.as_path()) {
                if !dupes.contains(&dest.as_path()) {
                    dupes.push(dest.as_path());
                }
            } else {
                seen.push(dest.as_path());
            }
        }
        dupes
    }

    /// Menu links as seen from the page at `page`.
    pub fn links_from(&self, page: &Path) -> Vec<SourceLink> {
        self.pages
            .iter()
            .map(|(name, dest)| SourceLink {
                basename: name.clone(),
                url: relative_url(page, dest),
            })
            .collect()
    }

    pub fn stylesheet_path(&self) -> PathBuf {
        self.options.directory.join(html::STYLESHEET_NAME)
    }

    /// Write the shared stylesheet into the output root.
    pub fn write_stylesheet(&self) -> Result<(), GenerateError> {
        write_atomic(&self.stylesheet_path(), html::STYLESHEET.as_bytes())
    }
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Build the page record for a fully populated set of sections.
pub fn assemble(source: &Path, sections: Vec<Section>, options: &OutputOptions) -> Page {
    Page {
        title: basename(source),
        source: source.display().to_string(),
        destination: destination(source, options),
        sections,
    }
}

impl Page {
    pub fn render(&self, site: &Site) -> Result<String, GenerateError> {
        let sources = site.links_from(&self.destination);
        let stylesheet = relative_url(&self.destination, &site.stylesheet_path());
        html::PageTemplate {
            title: &self.title,
            source: &self.source,
            stylesheet: &stylesheet,
            sources: &sources,
            sections: &self.sections,
        }
        .render_page()
    }

    /// Render and write the page, replacing any existing file.
    pub fn write(&self, site: &Site) -> Result<(), GenerateError> {
        let html = self.render(site)?;
        write_atomic(&self.destination, html.as_bytes())
    }
}

/// Write via a temp file in the same directory, so a failed run never leaves
/// a truncated page behind. Creates missing parent directories.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), GenerateError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| GenerateError::io(parent, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| GenerateError::io(parent, e))?;
    tmp.write_all(contents)
        .map_err(|e| GenerateError::io(tmp.path(), e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(|e| GenerateError::io(tmp.path(), e))?;
    }
    tmp.persist(path)
        .map_err(|e| GenerateError::io(path, e.error))?;
    Ok(())
}
