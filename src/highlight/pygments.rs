//! Local highlighter process (`pygmentize -f html -l <grammar>`).

use super::Highlighter;
use crate::error::HighlightError;
use crate::language::LanguageSpec;
use std::io::{self, ErrorKind, Read, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub struct Pygmentize {
    program: String,
    timeout: Duration,
}

impl Pygmentize {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Whether the program can be found, either as a path or on `PATH`.
    pub fn is_installed(&self) -> bool {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            return is_executable(program);
        }
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| is_executable(&dir.join(program))))
            .unwrap_or(false)
    }

    fn command(&self, lang: &LanguageSpec) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-f", "html", "-l", &lang.grammar]);
        for option in &lang.highlight_options {
            cmd.arg("-O").arg(option);
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    fn spawn_error(&self, err: io::Error) -> HighlightError {
        if err.kind() == ErrorKind::NotFound {
            HighlightError::NotFound {
                program: self.program.clone(),
            }
        } else {
            HighlightError::Spawn {
                program: self.program.clone(),
                source: err,
            }
        }
    }

    /// Wait for the child, killing it once the timeout elapses.
    fn wait(&self, child: &mut Child) -> Result<ExitStatus, HighlightError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    warn!(program = %self.program, timeout_secs = self.timeout.as_secs_f64(), "highlighter timed out");
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(HighlightError::Timeout {
                        program: self.program.clone(),
                        timeout: self.timeout,
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(err) => return Err(self.spawn_error(err)),
            }
        }
    }
}

impl Highlighter for Pygmentize {
    fn highlight(&self, code: &str, lang: &LanguageSpec) -> Result<String, HighlightError> {
        let started_at = Instant::now();
        let mut child = self.command(lang).spawn().map_err(|e| self.spawn_error(e))?;

        // Feed stdin and drain both pipes on their own threads so a large
        // input cannot deadlock against a full output pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = code.to_owned();
            thread::spawn(move || {
                let _ = stdin.write_all(input.as_bytes());
            })
        });
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = self.wait(&mut child)?;

        if let Some(writer) = writer {
            let _ = writer.join();
        }
        let stdout = collect(stdout).map_err(|e| self.spawn_error(e))?;
        let stderr = collect(stderr).unwrap_or_default();

        if !status.success() {
            return Err(HighlightError::Failed {
                program: self.program.clone(),
                exit_code: status.code(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        debug!(
            program = %self.program,
            grammar = %lang.grammar,
            input_bytes = code.len(),
            output_bytes = stdout.len(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "highlighted"
        );
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    fn name(&self) -> &str {
        &self.program
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(handle: Option<JoinHandle<io::Result<Vec<u8>>>>) -> io::Result<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("pipe reader panicked"))),
        None => Ok(Vec::new()),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn php() -> LanguageSpec {
        LanguageSpec::new("php", "php", "//", &["startinline=True".to_string()])
    }

    #[test]
    fn wraps_stdin_through_program() {
        let dir = TempDir::new().unwrap();
        let path = script(
            &dir,
            "fake-pygmentize",
            r#"printf '<div class="highlight"><pre>'; cat; printf '</pre></div>\n'"#,
        );
        let highlighter = Pygmentize::new(path.to_str().unwrap(), Duration::from_secs(5));
        let out = highlighter.highlight("echo 1;\n", &php()).unwrap();
        assert_eq!(out, "<div class=\"highlight\"><pre>echo 1;\n</pre></div>\n");
    }

    #[test]
    fn passes_grammar_and_options() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "args", r#"cat > /dev/null; echo "$@""#);
        let highlighter = Pygmentize::new(path.to_str().unwrap(), Duration::from_secs(5));
        let out = highlighter.highlight("", &php()).unwrap();
        assert_eq!(out.trim(), "-f html -l php -O startinline=True");
    }

    #[test]
    fn missing_program_is_not_found() {
        let highlighter = Pygmentize::new("/nonexistent/sidedoc-pygmentize", Duration::from_secs(1));
        assert!(!highlighter.is_installed());
        let err = highlighter.highlight("x", &php()).unwrap_err();
        assert!(err.is_not_found(), "{err}");
    }

    #[test]
    fn non_zero_exit_is_failure() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "broken", "cat > /dev/null; echo 'no lexer' >&2; exit 3");
        let highlighter = Pygmentize::new(path.to_str().unwrap(), Duration::from_secs(5));
        match highlighter.highlight("x", &php()).unwrap_err() {
            HighlightError::Failed {
                exit_code, stderr, ..
            } => {
                assert_eq!(exit_code, Some(3));
                assert_eq!(stderr, "no lexer");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn hang_becomes_timeout() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "slow", "exec sleep 10");
        let highlighter = Pygmentize::new(path.to_str().unwrap(), Duration::from_millis(200));
        let started = Instant::now();
        let err = highlighter.highlight("x", &php()).unwrap_err();
        assert!(matches!(err, HighlightError::Timeout { .. }), "{err}");
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn installed_when_path_exists() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "present", "cat");
        assert!(Pygmentize::new(path.to_str().unwrap(), Duration::from_secs(1)).is_installed());
    }

    #[test]
    fn file_without_execute_bit_is_not_installed() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "plain", "cat");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        assert!(!Pygmentize::new(path.to_str().unwrap(), Duration::from_secs(1)).is_installed());
    }
}
