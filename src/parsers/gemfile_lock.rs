//! Gemfile.lock `BUNDLED WITH` trailer

use super::ParseError;
use regex::Regex;
use std::sync::OnceLock;

const BUNDLED_WITH: &str = "BUNDLED WITH";

fn version_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(\.[0-9A-Za-z]+)*$").expect("valid regex"))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GemfileLockParser;

impl GemfileLockParser {
    pub fn new() -> Self {
        Self
    }

    /// Returns the Bundler version the lockfile was generated with.
    pub fn parse(&self, content: &str) -> Result<Option<String>, ParseError> {
        let mut lines = content.lines();

        if !lines.by_ref().any(|line| line.trim_end() == BUNDLED_WITH) {
            return Ok(None);
        }

        let value = lines
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| {
                ParseError::MalformedLockfile(format!("{} section has no version", BUNDLED_WITH))
            })?;

        if !version_token_re().is_match(value) {
            return Err(ParseError::MalformedLockfile(format!(
                "'{}' under {} is not a version",
                value, BUNDLED_WITH
            )));
        }

        Ok(Some(value.to_string()))
    }
}
