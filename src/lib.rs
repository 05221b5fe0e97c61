//! bundlerpack - Bundler buildpack core
//!
//! Decides which Bundler version to install for a Ruby application when
//! several sources disagree, and explains the decision.
//!
//! # Core Concepts
//!
//! - **Plan entries**: version requests from buildpack.yml, Gemfile.lock or an
//!   unlabelled default, each with build/launch flags
//! - **Resolution**: the highest-priority source that names a version wins,
//!   while the flags of every entry are merged
//! - **Shimming**: the winning version is rewritten into a form the installer
//!   accepts (`2.1` becomes `2.1.4`, `2.*` becomes `2.*.*`)
//!
//! # Example
//!
//! ```
//! use bundlerpack::{LogEmitter, PlanEntryResolver, VersionRequest, VersionShimmer, VersionSource};
//!
//! let resolver = PlanEntryResolver::new(LogEmitter::sink());
//! let resolved = resolver.resolve(&[
//!     VersionRequest::new(VersionSource::GemfileLock, "2.1.4"),
//!     VersionRequest::new(VersionSource::BuildpackYml, "2.2"),
//! ]);
//! assert_eq!(resolved.version.as_deref(), Some("2.2"));
//!
//! let shimmed = VersionShimmer::default().shim("2.2").unwrap();
//! assert_eq!(shimmed, "2.2.33");
//! ```

pub mod build;
pub mod cli;
pub mod config;
pub mod detect;
pub mod fs;
pub mod log_emitter;
pub mod parsers;
pub mod plan;
pub mod shim;
pub mod util;

pub use build::{Build, BuildError, BuildRequest, BuildResult, DependencyInstaller, DryRunInstaller};
pub use config::{BundlerpackConfig, ConfigError};
pub use detect::{DetectError, Detector};
pub use log_emitter::LogEmitter;
pub use parsers::{BuildpackYmlParser, GemfileLockParser, ParseError};
pub use plan::{BuildPlan, EntryFlags, PlanEntryResolver, ResolvedEntry, VersionRequest, VersionSource};
pub use shim::{ShimError, VersionShimmer, VersionTable};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
