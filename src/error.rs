//! Error kinds for a single file's generation pass.
//!
//! Every variant is file-scoped: the driver reports it against the offending
//! source path and moves on to the next input.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("unsupported language: no registry entry for {}", describe_extension(.extension))]
    UnsupportedLanguage { extension: Option<String> },

    #[error("highlighter unavailable: {0}")]
    HighlighterUnavailable(#[from] HighlightError),

    #[error(
        "highlighted output split into {found} fragments but the source has {expected} sections"
    )]
    HighlightMismatch { expected: usize, found: usize },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to render page template: {0}")]
    Template(#[from] askama::Error),

    #[error("invalid language file {}: {reason}", .path.display())]
    LanguageConfig { path: PathBuf, reason: String },
}

impl GenerateError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn describe_extension(extension: &Option<String>) -> String {
    match extension {
        Some(ext) => format!("'.{ext}'"),
        None => "files without an extension".to_string(),
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

/// Failure modes of a highlighter backend.
#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("'{program}' not found")]
    NotFound { program: String },

    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' did not respond within {}s", .timeout.as_secs())]
    Timeout { program: String, timeout: Duration },

    #[error("'{program}' exited with {}: {stderr}", describe_exit(.exit_code))]
    Failed {
        program: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("remote highlighter {url} failed: {reason}")]
    Remote { url: String, reason: String },
}

impl HighlightError {
    /// True when the backend could not be started at all, as opposed to
    /// running and failing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
