//! sidedoc — side-by-side HTML documentation from comment-annotated source.
//!
//! Comments become Markdown prose on the left, the code that follows them is
//! syntax-highlighted on the right, one table row per section:
//!
//! `sidedoc -d docs src/*.php lib/`

mod error;
mod generate;
mod highlight;
mod language;
mod model;
mod prose;
mod render;
mod split;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use generate::Generator;
use highlight::pygments::Pygmentize;
use highlight::remote::RemoteHighlighter;
use highlight::{Fallback, Highlighter};
use language::Registry;
use prose::MarkdownRenderer;
use render::paths::OutputOptions;
use render::Site;

#[derive(Parser)]
#[command(
    name = "sidedoc",
    version,
    about = "Generate side-by-side HTML documentation from comment-annotated source files"
)]
struct Cli {
    /// Source files, directories or glob patterns.
    #[arg(required = true)]
    files: Vec<String>,

    /// Output directory
    #[arg(short = 'd', long, default_value = "docs")]
    directory: PathBuf,

    /// Keep the sources' directory structure under the output directory
    /// instead of flattening to basenames.
    #[arg(short = 'p', long)]
    paths: bool,

    /// Highlighter program, invoked as `<program> -f html -l <grammar>`.
    #[arg(long, env = "SIDEDOC_HIGHLIGHTER", default_value = "pygmentize")]
    highlighter: String,

    /// Remote highlighting service used when the highlighter program is missing.
    #[arg(long, env = "SIDEDOC_HIGHLIGHT_URL")]
    highlight_url: Option<String>,

    /// Seconds to wait for the highlighter before giving up on a file.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// TOML file with extra or overriding language definitions.
    #[arg(short = 'l', long)]
    languages: Option<PathBuf>,

    /// Only report warnings and errors
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,

    /// Debug output
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let registry = match &cli.languages {
        Some(path) => Registry::with_file(path)?,
        None => Registry::builtin(),
    };

    let sources = expand_globs(&cli.files, &registry)?;
    if sources.is_empty() {
        anyhow::bail!("no source files matched");
    }

    fs::create_dir_all(&cli.directory).with_context(|| {
        format!("failed to create output directory: {}", cli.directory.display())
    })?;

    let options = OutputOptions {
        directory: cli.directory.clone(),
        preserve_paths: cli.paths,
    };
    let highlighter = build_highlighter(&cli);
    let generator = Generator {
        registry: &registry,
        highlighter: highlighter.as_ref(),
        prose: &MarkdownRenderer,
        options: &options,
    };

    let mut failed = 0usize;
    let mut pages = Vec::with_capacity(sources.len());
    for source in &sources {
        match generator.prepare(source) {
            Ok(page) => pages.push(page),
            Err(err) => {
                failed += 1;
                error!(source = %source.display(), "{err}");
            }
        }
    }

    let site = Site::new(options, &pages);
    for dest in site.collisions() {
        warn!(destination = %dest.display(), "several sources map to the same page; the last one wins");
    }
    site.write_stylesheet()
        .context("failed to write stylesheet")?;

    for page in &pages {
        match page.write(&site) {
            Ok(()) => info!("{} -> {}", page.source, page.destination.display()),
            Err(err) => {
                failed += 1;
                error!(source = %page.source, "{err}");
            }
        }
    }

    if failed > 0 {
        warn!(failed, total = sources.len(), "some files were not documented");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_env("SIDEDOC_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

/// Local highlighter, backed by the remote service when one is configured.
fn build_highlighter(cli: &Cli) -> Box<dyn Highlighter> {
    let timeout = Duration::from_secs(cli.timeout);
    let local = Pygmentize::new(cli.highlighter.as_str(), timeout);
    let installed = local.is_installed();

    match &cli.highlight_url {
        Some(url) => {
            if !installed {
                warn!(program = %cli.highlighter, url = %url, "highlighter not found; using remote service");
            }
            Box::new(Fallback::new(
                Box::new(local),
                Box::new(RemoteHighlighter::new(url.as_str(), timeout)),
            ))
        }
        None => {
            if !installed {
                warn!(program = %cli.highlighter, "highlighter not found and no --highlight-url set");
            }
            Box::new(local)
        }
    }
}

/// Expand arguments into a sorted, de-duplicated list of source files.
///
/// Plain files are taken as given (unsupported ones are reported later).
/// Directories are scanned, non-recursively, for registered extensions.
/// Anything else is treated as a glob pattern.
fn expand_globs(patterns: &[String], registry: &Registry) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_file() && registry.supports(&p) {
                    files.push(p);
                }
            }
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            warn!("no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    files.sort();
    files.dedup();
    Ok(files)
}
