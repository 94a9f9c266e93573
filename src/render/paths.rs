//! Destination paths and links between generated pages.

use std::path::{Component, Path, PathBuf};

/// Where generated pages go.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub directory: PathBuf,
    /// Keep the source's directory structure under `directory`.
    pub preserve_paths: bool,
}

/// Map a source file to its page: swap the extension for `.html` and root it
/// under the output directory, flattened to the basename unless paths are
/// preserved.
///
/// "foo/bar.php" → "docs/bar.html", or "docs/foo/bar.html" with preserved paths.
pub fn destination(source: &Path, options: &OutputOptions) -> PathBuf {
    let page = source.with_extension("html");
    let relative = if options.preserve_paths {
        normal_components(&page)
    } else {
        page.file_name().map(PathBuf::from).unwrap_or_default()
    };
    options.directory.join(relative)
}

/// Drop root, prefix, `.` and `..` components so the result stays inside
/// whatever directory it is joined onto.
fn normal_components(path: &Path) -> PathBuf {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

/// Relative URL from the page at `from` to the file at `to`.
///
/// Both paths are expected to live under the same output root.
pub fn relative_url(from: &Path, to: &Path) -> String {
    let from_dir: Vec<Component> = from
        .parent()
        .map(|p| p.components().collect())
        .unwrap_or_default();
    let to_parts: Vec<Component> = to.components().collect();

    let common = from_dir
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = vec!["..".to_string(); from_dir.len() - common];
    parts.extend(
        to_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}
