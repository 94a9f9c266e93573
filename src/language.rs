//! Language registry — file extension to highlighter grammar and comment syntax.
//!
//! The registry is built once at startup (built-in table plus an optional TOML
//! file) and handed to the components that need it. Nothing here is global.

use crate::error::GenerateError;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Sentinel word placed after the comment marker to form the divider line.
const DIVIDER_WORD: &str = "DIVIDER";

/// Built-in entries: (extension, grammar, comment marker, highlighter options).
const BUILTIN: &[(&str, &str, &str, &[&str])] = &[
    ("php", "php", "//", &["startinline=True"]),
    ("rs", "rust", "//", &[]),
    ("c", "c", "//", &[]),
    ("h", "c", "//", &[]),
    ("cc", "cpp", "//", &[]),
    ("cpp", "cpp", "//", &[]),
    ("hpp", "cpp", "//", &[]),
    ("cs", "csharp", "//", &[]),
    ("go", "go", "//", &[]),
    ("java", "java", "//", &[]),
    ("js", "javascript", "//", &[]),
    ("mjs", "javascript", "//", &[]),
    ("ts", "typescript", "//", &[]),
    ("kt", "kotlin", "//", &[]),
    ("scala", "scala", "//", &[]),
    ("swift", "swift", "//", &[]),
    ("dart", "dart", "//", &[]),
    ("py", "python", "#", &[]),
    ("rb", "ruby", "#", &[]),
    ("sh", "bash", "#", &[]),
    ("bash", "bash", "#", &[]),
    ("pl", "perl", "#", &[]),
    ("coffee", "coffeescript", "#", &[]),
    ("r", "r", "#", &[]),
    ("yaml", "yaml", "#", &[]),
    ("toml", "toml", "#", &[]),
    ("lua", "lua", "--", &[]),
    ("sql", "sql", "--", &[]),
    ("hs", "haskell", "--", &[]),
    ("erl", "erlang", "%", &[]),
    ("el", "emacs-lisp", ";", &[]),
    ("lisp", "common-lisp", ";", &[]),
    ("clj", "clojure", ";", &[]),
];

/// Everything the splitter and merger need to know about one language.
#[derive(Debug, Clone)]
pub struct LanguageSpec {
    pub extension: String,
    pub grammar: String,
    pub comment_marker: String,
    /// Extra `key=value` options forwarded to the highlighter.
    pub highlight_options: Vec<String>,
    comment_matcher: Regex,
    divider_text: String,
    divider_html: Regex,
}

impl LanguageSpec {
    pub fn new(extension: &str, grammar: &str, comment_marker: &str, options: &[String]) -> Self {
        let marker = regex::escape(comment_marker);
        // Leading whitespace, the marker, then at most one space or tab.
        let comment_matcher = Regex::new(&format!(r"^[ \t]*{marker}[ \t]?"))
            .expect("escaped comment marker is a valid regex");

        let divider_text = format!("\n{comment_marker}{DIVIDER_WORD}\n");

        // The highlighter may wrap the sentinel in one or more spans, split the
        // marker and the word into separate tokens, and add or drop blank
        // lines around it.
        let rendered_marker = regex::escape(&html_escape(comment_marker));
        let divider_html = Regex::new(&format!(
            r"\n*(?:<span[^>]*>)*{rendered_marker}(?:</span>)?(?:<span[^>]*>)?[ \t]*{DIVIDER_WORD}[ \t]*(?:</span>)*\n*"
        ))
        .expect("escaped divider is a valid regex");

        Self {
            extension: extension.to_string(),
            grammar: grammar.to_string(),
            comment_marker: comment_marker.to_string(),
            highlight_options: options.to_vec(),
            comment_matcher,
            divider_text,
            divider_html,
        }
    }

    /// Whether `line` is a comment line (marker after optional indentation).
    pub fn is_comment(&self, line: &str) -> bool {
        self.comment_matcher.is_match(line)
    }

    /// Strip indentation and the comment marker, leaving the prose.
    pub fn strip_comment<'a>(&self, line: &'a str) -> &'a str {
        match self.comment_matcher.find(line) {
            Some(m) => &line[m.end()..],
            None => line,
        }
    }

    /// Raw divider inserted between sections before highlighting.
    pub fn divider_text(&self) -> &str {
        &self.divider_text
    }

    /// Pattern matching the divider after it has been through the highlighter.
    pub fn divider_html(&self) -> &Regex {
        &self.divider_html
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Immutable extension → language table.
#[derive(Debug, Clone)]
pub struct Registry {
    languages: HashMap<String, LanguageSpec>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Registry {
    pub fn builtin() -> Self {
        let languages = BUILTIN
            .iter()
            .map(|(ext, grammar, marker, options)| {
                let options: Vec<String> = options.iter().map(|o| o.to_string()).collect();
                (
                    ext.to_string(),
                    LanguageSpec::new(ext, grammar, marker, &options),
                )
            })
            .collect();
        Self { languages }
    }

    /// Built-in table with entries from a TOML language file layered on top.
    pub fn with_file(path: &Path) -> Result<Self, GenerateError> {
        let content = fs::read_to_string(path).map_err(|e| GenerateError::io(path, e))?;
        let mut registry = Self::builtin();
        registry.extend_from_toml(&content).map_err(|reason| GenerateError::LanguageConfig {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(registry)
    }

    fn extend_from_toml(&mut self, content: &str) -> Result<(), String> {
        let file: LanguageFile = toml::from_str(content).map_err(|e| e.to_string())?;
        for entry in file.language {
            let extension = entry.extension.trim_start_matches('.').to_string();
            if extension.is_empty() {
                return Err("language entry has an empty extension".to_string());
            }
            if entry.comment.trim().is_empty() {
                return Err(format!("language '{extension}' has an empty comment marker"));
            }
            let spec = LanguageSpec::new(&extension, &entry.grammar, &entry.comment, &entry.options);
            self.languages.insert(extension, spec);
        }
        Ok(())
    }

    pub fn lookup(&self, extension: &str) -> Result<&LanguageSpec, GenerateError> {
        self.languages
            .get(extension)
            .ok_or_else(|| GenerateError::UnsupportedLanguage {
                extension: Some(extension.to_string()),
            })
    }

    /// Look up the language for a source path by its extension.
    pub fn for_path(&self, path: &Path) -> Result<&LanguageSpec, GenerateError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.lookup(ext),
            None => Err(GenerateError::UnsupportedLanguage { extension: None }),
        }
    }

    pub fn supports(&self, path: &Path) -> bool {
        self.for_path(path).is_ok()
    }
}

#[derive(Deserialize)]
struct LanguageFile {
    #[serde(default)]
    language: Vec<LanguageEntry>,
}

#[derive(Deserialize)]
struct LanguageEntry {
    extension: String,
    grammar: String,
    comment: String,
    #[serde(default)]
    options: Vec<String>,
}
