//! User-facing build output
//!
//! Formatting is split from writing: the `format_*` functions are pure and
//! return the lines to print, [`LogEmitter`] writes them to its sink with the
//! indentation levels used by buildpack output (title, process, subprocess,
//! action).

use crate::plan::{VersionRequest, VersionSource};
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const PROCESS_INDENT: &str = "  ";
const SUBPROCESS_INDENT: &str = "    ";
const ACTION_INDENT: &str = "      ";

/// Renders the candidate table, one line per entry in the given order.
///
/// Source labels are padded to a common width so the arrows line up. Entries
/// without a version are shown as `"*"`.
pub fn format_candidates(entries: &[&VersionRequest]) -> Vec<String> {
    let rows: Vec<(String, &str)> = entries
        .iter()
        .map(|entry| (entry.source().to_string(), entry.version().unwrap_or("*")))
        .collect();

    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

    let mut lines = vec![format!(
        "{}Candidate version sources (in priority order):",
        SUBPROCESS_INDENT
    )];
    lines.extend(rows.iter().map(|(label, version)| {
        format!(
            "{}{:<width$} -> {:?}",
            ACTION_INDENT,
            label,
            version,
            width = width
        )
    }));
    lines
}

pub fn format_selected(name: &str, source: &VersionSource, version: &str) -> String {
    format!(
        "{}Selected {} version (using {}): {}",
        SUBPROCESS_INDENT,
        display_name(name),
        source,
        version
    )
}

pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{}Completed in {}", ACTION_INDENT, format_duration(elapsed))
}

/// Renders environment exports sorted by variable name.
pub fn format_environment(env: &BTreeMap<String, String>) -> Vec<String> {
    let mut lines = vec![format!("{}Configuring environment", PROCESS_INDENT)];
    lines.extend(
        env.iter()
            .map(|(key, value)| format!("{}{} -> {:?}", SUBPROCESS_INDENT, key, value)),
    );
    lines
}

/// Rounds to milliseconds and prints the way Go's `time.Duration` does,
/// e.g. `1.234s`, `15ms`, `0s`.
pub fn format_duration(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    if millis == 0 {
        return "0s".to_string();
    }
    if millis < 1000 {
        return format!("{}ms", millis);
    }

    let secs = millis / 1000;
    let frac = millis % 1000;
    let (minutes, secs) = (secs / 60, secs % 60);

    let mut seconds = secs.to_string();
    if frac > 0 {
        let digits = format!("{:03}", frac);
        seconds.push('.');
        seconds.push_str(digits.trim_end_matches('0'));
    }

    if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

pub(crate) fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Writes build output lines to a shared sink.
///
/// Write failures are reported through `tracing` and otherwise ignored so
/// that output problems never change a build decision.
#[derive(Clone)]
pub struct LogEmitter {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl fmt::Debug for LogEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogEmitter").finish_non_exhaustive()
    }
}

impl LogEmitter {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Emitter that discards everything.
    pub fn sink() -> Self {
        Self::new(io::sink())
    }

    pub fn title(&self, name: &str, version: &str) {
        self.line(&format!("{} {}", name, version));
    }

    pub fn process(&self, message: &str) {
        self.line(&format!("{}{}", PROCESS_INDENT, message));
    }

    pub fn subprocess(&self, message: &str) {
        self.line(&format!("{}{}", SUBPROCESS_INDENT, message));
    }

    pub fn action(&self, message: &str) {
        self.line(&format!("{}{}", ACTION_INDENT, message));
    }

    pub fn break_line(&self) {
        self.line("");
    }

    pub fn candidates(&self, entries: &[&VersionRequest]) {
        self.lines(&format_candidates(entries));
        self.break_line();
    }

    pub fn selected_dependency(&self, name: &str, source: &VersionSource, version: &str) {
        self.line(&format_selected(name, source, version));
        self.break_line();
    }

    pub fn elapsed(&self, elapsed: Duration) {
        self.line(&format_elapsed(elapsed));
        self.break_line();
    }

    pub fn environment(&self, env: &BTreeMap<String, String>) {
        self.lines(&format_environment(env));
        self.break_line();
    }

    fn lines(&self, lines: &[String]) {
        for line in lines {
            self.line(line);
        }
    }

    fn line(&self, line: &str) {
        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(writer, "{}", line) {
            warn!("Failed to write build output: {}", e);
        }
    }
}

/// In-memory sink that can be read back after emitting.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let bytes = match self.inner.lock() {
            Ok(bytes) => bytes.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "buffer lock poisoned"))?;
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_are_padded() {
        let yml = VersionRequest::new(VersionSource::BuildpackYml, "buildpack-yml-version");
        let unknown = VersionRequest::new(VersionSource::Unknown, "other-version");

        let lines = format_candidates(&[&yml, &unknown]);

        assert_eq!(
            lines,
            vec![
                "    Candidate version sources (in priority order):".to_string(),
                "      buildpack.yml -> \"buildpack-yml-version\"".to_string(),
                "      <unknown>     -> \"other-version\"".to_string(),
            ]
        );
    }

    #[test]
    fn test_candidates_without_version_show_wildcard() {
        let bare = VersionRequest::flags_only(Default::default());
        let lines = format_candidates(&[&bare]);
        assert_eq!(lines[1], "      <unknown> -> \"*\"");
    }

    #[test]
    fn test_selected_line() {
        let line = format_selected("bundler", &VersionSource::GemfileLock, "2.1.4");
        assert_eq!(
            line,
            "    Selected Bundler version (using Gemfile.lock): 2.1.4"
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_micros(300)), "0s");
        assert_eq!(format_duration(Duration::from_millis(15)), "15ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_millis(2000)), "2s");
        assert_eq!(format_duration(Duration::from_millis(61_234)), "1m1.234s");
    }

    #[test]
    fn test_environment_lines() {
        let mut env = BTreeMap::new();
        env.insert("GEM_PATH".to_string(), "/layers/bundler".to_string());

        let lines = format_environment(&env);
        assert_eq!(lines[0], "  Configuring environment");
        assert_eq!(lines[1], "    GEM_PATH -> \"/layers/bundler\"");
    }

    #[test]
    fn test_emitter_writes_to_buffer() {
        let buffer = SharedBuffer::new();
        let emitter = LogEmitter::new(buffer.clone());

        emitter.title("Bundler Buildpack", "0.3.0");
        emitter.process("Resolving Bundler version");
        emitter.elapsed(Duration::from_millis(250));

        assert_eq!(
            buffer.contents(),
            "Bundler Buildpack 0.3.0\n  Resolving Bundler version\n      Completed in 250ms\n\n"
        );
    }
}
