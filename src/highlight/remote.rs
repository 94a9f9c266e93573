//! Remote highlighting service, used when no local highlighter is installed.
//!
//! The service takes a form-encoded POST with `lang` and `code` fields and
//! answers with the same wrapped HTML the local program prints.

use super::Highlighter;
use crate::error::HighlightError;
use crate::language::LanguageSpec;
use std::time::{Duration, Instant};
use tracing::debug;

pub struct RemoteHighlighter {
    url: String,
    agent: ureq::Agent,
}

impl RemoteHighlighter {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    fn error(&self, reason: impl ToString) -> HighlightError {
        HighlightError::Remote {
            url: self.url.clone(),
            reason: reason.to_string(),
        }
    }
}

impl Highlighter for RemoteHighlighter {
    fn highlight(&self, code: &str, lang: &LanguageSpec) -> Result<String, HighlightError> {
        let started_at = Instant::now();
        let response = self
            .agent
            .post(&self.url)
            .send_form(&[("lang", lang.grammar.as_str()), ("code", code)])
            .map_err(|e| self.error(e))?;
        let body = response.into_string().map_err(|e| self.error(e))?;
        debug!(
            url = %self.url,
            grammar = %lang.grammar,
            input_bytes = code.len(),
            output_bytes = body.len(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "highlighted remotely"
        );
        Ok(body)
    }

    fn name(&self) -> &str {
        &self.url
    }
}
