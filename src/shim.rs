//! Normalizes requested Bundler versions into installer-ready constraints
//!
//! The installer understands exact versions (`2.1.4`) and explicit wildcard
//! patterns (`*`, `2.*.*`, `2.1.*`). Anything else has to be rewritten first.
//! Which patch release a `MAJOR.MINOR` request means is release data, so it
//! lives in a [`VersionTable`] that can be swapped without touching the
//! classification rules.

use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

/// Latest known patch release per minor line.
const DEFAULT_SHORT_FORMS: &[(&str, &str)] = &[
    ("1.17", "1.17.3"),
    ("2.0", "2.0.2"),
    ("2.1", "2.1.4"),
    ("2.2", "2.2.33"),
    ("2.3", "2.3.26"),
    ("2.4", "2.4.22"),
    ("2.5", "2.5.23"),
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShimError {
    #[error("Unknown version kind '{version}': {reason}")]
    UnknownVersionKind { version: String, reason: String },
}

/// Shape of a raw version string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionKind {
    /// Full semantic version, e.g. `2.1.4` or `2.2.0.rc.1`
    Exact,
    /// `MAJOR.MINOR` only, e.g. `2.1`
    ShortForm,
    /// `*` or a dotted pattern ending in wildcards, e.g. `2.*`, `2.1.x`
    Wildcard,
}

fn short_form_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\d+$").expect("valid regex"))
}

fn wildcard_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d+\.){0,2}[*xX](\.[*xX]){0,2}$").expect("valid regex")
    })
}

fn rubygems_exact_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+(\.[0-9A-Za-z]+)+$").expect("valid regex"))
}

/// Classifies `raw`, or returns `None` when it fits no known shape.
pub fn classify(raw: &str) -> Option<VersionKind> {
    if semver::Version::parse(raw).is_ok() || rubygems_exact_re().is_match(raw) {
        Some(VersionKind::Exact)
    } else if short_form_re().is_match(raw) {
        Some(VersionKind::ShortForm)
    } else if wildcard_re().is_match(raw) && component_count(raw) <= 3 {
        Some(VersionKind::Wildcard)
    } else {
        None
    }
}

fn component_count(raw: &str) -> usize {
    raw.split('.').count()
}

/// Short-form to full-version lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionTable {
    entries: BTreeMap<String, String>,
}

impl Default for VersionTable {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_SHORT_FORMS.iter().copied())
    }
}

impl VersionTable {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Loads a `short: full` YAML mapping.
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let table: Self =
            serde_yaml::from_str(content).context("Version table must be a mapping of strings")?;

        for (short, full) in &table.entries {
            if classify(short) != Some(VersionKind::ShortForm) {
                anyhow::bail!("Version table key '{}' is not a MAJOR.MINOR version", short);
            }
            if classify(full) != Some(VersionKind::Exact) {
                anyhow::bail!(
                    "Version table entry '{}' maps to '{}', which is not a full version",
                    short,
                    full
                );
            }
        }

        Ok(table)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read version table {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid version table {}", path.display()))
    }

    pub fn get(&self, short: &str) -> Option<&str> {
        self.entries.get(short).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stateless rewriter over a [`VersionTable`].
#[derive(Debug, Clone, Default)]
pub struct VersionShimmer {
    table: VersionTable,
}

impl VersionShimmer {
    pub fn new(table: VersionTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &VersionTable {
        &self.table
    }

    /// Returns an installer-ready form of `raw`.
    ///
    /// Exact versions and `*` pass through, partial wildcards are expanded to
    /// three components, short forms are looked up. The result is a fixed
    /// point: shimming it again returns it unchanged.
    pub fn shim(&self, raw: &str) -> Result<String, ShimError> {
        let version = raw.trim();

        let shimmed = match classify(version) {
            Some(VersionKind::Exact) => version.to_string(),
            Some(VersionKind::Wildcard) => expand_wildcard(version),
            Some(VersionKind::ShortForm) => self
                .table
                .get(version)
                .map(str::to_string)
                .ok_or_else(|| ShimError::UnknownVersionKind {
                    version: version.to_string(),
                    reason: "no known release for this MAJOR.MINOR line".to_string(),
                })?,
            None => {
                return Err(ShimError::UnknownVersionKind {
                    version: version.to_string(),
                    reason: "expected a full version, MAJOR.MINOR, or a wildcard pattern"
                        .to_string(),
                })
            }
        };

        if shimmed != raw {
            debug!(raw, shimmed = %shimmed, "Shimmed version");
        }
        Ok(shimmed)
    }
}

fn expand_wildcard(pattern: &str) -> String {
    if pattern == "*" {
        return pattern.to_string();
    }

    let mut parts: Vec<&str> = pattern
        .split('.')
        .map(|part| if part.eq_ignore_ascii_case("x") { "*" } else { part })
        .collect();
    while parts.len() < 3 {
        parts.push("*");
    }
    parts.join(".")
}
