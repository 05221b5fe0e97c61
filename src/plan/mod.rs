//! Build plan entries and the resolved outcome of merging them
//!
//! A [`VersionRequest`] is one opinion about which Bundler version to install,
//! labelled with the [`VersionSource`] it came from. Several requests for the
//! same dependency are merged by [`PlanEntryResolver`] into a single
//! [`ResolvedEntry`].

pub mod resolver;

pub use resolver::PlanEntryResolver;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Name of the dependency this buildpack provides and requires.
pub const BUNDLER: &str = "bundler";

/// Where a version request originated.
///
/// The rank table is fixed at compile time; see [`VersionSource::priority`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum VersionSource {
    /// Explicit `bundler.version` key in buildpack.yml
    BuildpackYml,
    /// `BUNDLED WITH` trailer of Gemfile.lock
    GemfileLock,
    /// Request without a source label (defaults, bare requirements)
    #[default]
    Unknown,
    /// Any other label supplied by a downstream buildpack
    Custom(String),
}

impl VersionSource {
    /// Rank of this source; higher wins.
    pub fn priority(&self) -> i32 {
        match self {
            Self::BuildpackYml => 2,
            Self::GemfileLock => 1,
            Self::Custom(_) => 0,
            Self::Unknown => -1,
        }
    }

    /// Label as written into build plan metadata, `None` for unknown sources.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::BuildpackYml => Some("buildpack.yml"),
            Self::GemfileLock => Some("Gemfile.lock"),
            Self::Unknown => None,
            Self::Custom(label) => Some(label),
        }
    }

    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            None | Some("") => Self::Unknown,
            Some("buildpack.yml") => Self::BuildpackYml,
            Some("Gemfile.lock") => Self::GemfileLock,
            Some(other) => Self::Custom(other.to_string()),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label().unwrap_or("<unknown>"))
    }
}

impl Serialize for VersionSource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.label() {
            Some(label) => serializer.serialize_str(label),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for VersionSource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(Self::from_label(label.as_deref()))
    }
}

/// Inclusion flags carried by a plan entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFlags {
    #[serde(default, skip_serializing_if = "is_false")]
    pub build: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub launch: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl EntryFlags {
    pub fn build() -> Self {
        Self {
            build: true,
            launch: false,
        }
    }

    pub fn launch() -> Self {
        Self {
            build: false,
            launch: true,
        }
    }

    /// Logical OR of both flag sets.
    pub fn union(self, other: Self) -> Self {
        Self {
            build: self.build || other.build,
            launch: self.launch || other.launch,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.build && !self.launch
    }
}

/// Metadata block of a build plan entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    #[serde(
        rename = "version-source",
        default,
        skip_serializing_if = "VersionSource::is_unknown"
    )]
    pub version_source: VersionSource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(flatten)]
    pub flags: EntryFlags,
}

/// A single build plan entry: a version opinion and/or inclusion flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRequest {
    pub name: String,
    #[serde(default)]
    pub metadata: EntryMetadata,
}

impl VersionRequest {
    pub fn new(source: VersionSource, version: impl Into<String>) -> Self {
        Self {
            name: BUNDLER.to_string(),
            metadata: EntryMetadata {
                version_source: source,
                version: Some(version.into()),
                flags: EntryFlags::default(),
            },
        }
    }

    /// A bare "this dependency is needed" requirement with no version opinion.
    pub fn flags_only(flags: EntryFlags) -> Self {
        Self {
            name: BUNDLER.to_string(),
            metadata: EntryMetadata {
                flags,
                ..Default::default()
            },
        }
    }

    pub fn with_flags(mut self, flags: EntryFlags) -> Self {
        self.metadata.flags = flags;
        self
    }

    pub fn source(&self) -> &VersionSource {
        &self.metadata.version_source
    }

    /// The version constraint, if one is present and non-empty.
    pub fn version(&self) -> Option<&str> {
        self.metadata
            .version
            .as_deref()
            .filter(|v| !v.trim().is_empty())
    }

    pub fn flags(&self) -> EntryFlags {
        self.metadata.flags
    }
}

/// Outcome of merging every plan entry for a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "VersionSource::is_unknown")]
    pub source: VersionSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub flags: EntryFlags,
}

impl ResolvedEntry {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: VersionSource::Unknown,
            version: None,
            flags: EntryFlags::default(),
        }
    }
}

/// Dependencies a buildpack offers and asks for during detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    pub provides: Vec<String>,
    pub requires: Vec<VersionRequest>,
}
