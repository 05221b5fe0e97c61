//! Extract a requested Bundler version from application files
//!
//! Each parser works on file contents and returns `Ok(None)` when the file
//! does not express a version. Reading the files is left to the caller.

pub mod buildpack_yml;
pub mod gemfile_lock;

pub use buildpack_yml::BuildpackYmlParser;
pub use gemfile_lock::GemfileLockParser;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed Gemfile.lock: {0}")]
    MalformedLockfile(String),

    #[error("Malformed buildpack.yml: {0}")]
    MalformedConfig(String),
}
