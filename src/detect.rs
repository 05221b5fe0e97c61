//! Detection: turn the application's files into Bundler plan requirements

use crate::fs::FileSystem;
use crate::parsers::{BuildpackYmlParser, GemfileLockParser, ParseError};
use crate::plan::{BuildPlan, VersionRequest, VersionSource, BUNDLER};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const BUILDPACK_YML: &str = "buildpack.yml";
pub const GEMFILE_LOCK: &str = "Gemfile.lock";

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Application path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Application path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Reads buildpack.yml and Gemfile.lock from an application directory.
pub struct Detector<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    buildpack_yml: BuildpackYmlParser,
    gemfile_lock: GemfileLockParser,
}

impl<'a, F: FileSystem + ?Sized> Detector<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self {
            fs,
            buildpack_yml: BuildpackYmlParser::new(),
            gemfile_lock: GemfileLockParser::new(),
        }
    }

    /// Always provides `bundler`; requires it once per file that names a version.
    pub fn detect(&self, app_dir: &Path) -> Result<BuildPlan, DetectError> {
        if !self.fs.exists(app_dir) {
            return Err(DetectError::PathNotFound(app_dir.to_path_buf()));
        }
        if !self.fs.is_dir(app_dir) {
            return Err(DetectError::NotADirectory(app_dir.to_path_buf()));
        }

        let mut requires = Vec::new();

        if let Some(content) = self.read(&app_dir.join(BUILDPACK_YML))? {
            if let Some(version) = self.buildpack_yml.parse(&content)? {
                debug!(version = %version, "buildpack.yml requests Bundler version");
                requires.push(VersionRequest::new(VersionSource::BuildpackYml, version));
            }
        }

        if let Some(content) = self.read(&app_dir.join(GEMFILE_LOCK))? {
            if let Some(version) = self.gemfile_lock.parse(&content)? {
                debug!(version = %version, "Gemfile.lock was bundled with");
                requires.push(VersionRequest::new(VersionSource::GemfileLock, version));
            }
        }

        info!(
            app = %app_dir.display(),
            requirements = requires.len(),
            "Detection complete"
        );

        Ok(BuildPlan {
            provides: vec![BUNDLER.to_string()],
            requires,
        })
    }

    fn read(&self, path: &Path) -> Result<Option<String>, DetectError> {
        self.fs.read_optional(path).map_err(|source| DetectError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
