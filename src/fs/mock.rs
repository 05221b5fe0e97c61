use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone)]
enum MockEntry {
    File(String),
    Directory,
}

/// In-memory file system rooted at `/app` by default
pub struct MockFileSystem {
    files: RwLock<HashMap<PathBuf, MockEntry>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/app"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        let mut files = HashMap::new();
        ensure_parents(&mut files, &root);
        Self {
            files: RwLock::new(files),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());

        if let Some(parent) = path.parent() {
            ensure_parents(&mut files, parent);
        }
        files.insert(path, MockEntry::File(content.to_string()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        ensure_parents(&mut files, &path);
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn entry(&self, path: &Path) -> Option<MockEntry> {
        let path = self.normalize_path(path);
        self.files
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&path)
            .cloned()
    }
}

fn ensure_parents(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let mut current = PathBuf::new();
    for component in path.components() {
        current.push(component);
        files
            .entry(current.clone())
            .or_insert(MockEntry::Directory);
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.entry(path).is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.entry(path), Some(MockEntry::Directory))
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.entry(path), Some(MockEntry::File(_)))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        match self.entry(path) {
            Some(MockEntry::File(content)) => Ok(content),
            Some(MockEntry::Directory) => Err(anyhow!("Not a file: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file() {
        let fs = MockFileSystem::new();
        fs.add_file("Gemfile.lock", "BUNDLED WITH\n   2.1.4\n");

        assert!(fs.exists(Path::new("/app/Gemfile.lock")));
        assert!(fs.is_file(Path::new("/app/Gemfile.lock")));
        assert!(fs.is_dir(Path::new("/app")));
    }

    #[test]
    fn test_add_dir() {
        let fs = MockFileSystem::new();
        fs.add_dir("vendor/bundle");

        assert!(fs.is_dir(Path::new("/app/vendor")));
        assert!(fs.is_dir(Path::new("/app/vendor/bundle")));
    }

    #[test]
    fn test_read_to_string() {
        let fs = MockFileSystem::new();
        fs.add_file("buildpack.yml", "bundler:\n  version: 2.1.4\n");

        let content = fs.read_to_string(Path::new("/app/buildpack.yml")).unwrap();
        assert_eq!(content, "bundler:\n  version: 2.1.4\n");
        assert!(fs.read_to_string(Path::new("/app")).is_err());
        assert!(fs.read_to_string(Path::new("/app/missing")).is_err());
    }

    #[test]
    fn test_with_root() {
        let fs = MockFileSystem::with_root(PathBuf::from("/workspace"));
        fs.add_file("Gemfile", "source 'https://rubygems.org'\n");

        assert_eq!(fs.root(), Path::new("/workspace"));
        assert!(fs.is_file(Path::new("/workspace/Gemfile")));
        assert!(fs.read_optional(Path::new("/workspace/Gemfile.lock")).unwrap().is_none());
    }
}
