//! FileSystem trait definition

use anyhow::Result;
use std::path::Path;

/// The file operations detection and build need from an application directory
pub trait FileSystem: Send + Sync {
    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Read a file if it exists; a missing file is `Ok(None)`
    fn read_optional(&self, path: &Path) -> Result<Option<String>> {
        if !self.is_file(path) {
            return Ok(None);
        }
        self.read_to_string(path).map(Some)
    }
}
