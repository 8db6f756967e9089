//! Destinations for generated files.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use stackforge_common::error::{Result, StackforgeError};

/// Persists generated files.
///
/// Paths are relative to the writer's root.
pub trait ManifestWriter {
    /// Writes one file, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be persisted.
    fn write(&mut self, path: &Path, contents: &str) -> Result<()>;
}

/// Writes files under a root directory, creating parents as needed.
#[derive(Debug, Clone)]
pub struct DirectoryWriter {
    root: PathBuf,
}

impl DirectoryWriter {
    /// Creates a writer rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ManifestWriter for DirectoryWriter {
    fn write(&mut self, path: &Path, contents: &str) -> Result<()> {
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StackforgeError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(&target, contents).map_err(|e| StackforgeError::Io {
            path: target.clone(),
            source: e,
        })?;
        tracing::debug!(path = %target.display(), bytes = contents.len(), "wrote file");
        Ok(())
    }
}

/// Keeps files in memory, in write order.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    files: IndexMap<PathBuf, String>,
}

impl MemoryWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Content of a written file.
    #[must_use]
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    /// Paths written so far, in order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    /// Number of files written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ManifestWriter for MemoryWriter {
    fn write(&mut self, path: &Path, contents: &str) -> Result<()> {
        let _ = self.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_writer_creates_parents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut writer = DirectoryWriter::new(dir.path());
        writer
            .write(Path::new("k8s/deployment.yml"), "kind: Deployment\n")
            .expect("write");
        let content =
            std::fs::read_to_string(dir.path().join("k8s/deployment.yml")).expect("read back");
        assert_eq!(content, "kind: Deployment\n");
    }

    #[test]
    fn directory_writer_maps_failures_to_io() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").expect("seed");
        let mut writer = DirectoryWriter::new(&blocker);
        let err = writer
            .write(Path::new("nested/file.txt"), "x")
            .expect_err("should fail");
        assert!(matches!(err, StackforgeError::Io { .. }), "got: {err}");
    }

    #[test]
    fn memory_writer_keeps_order_and_overwrites() {
        let mut writer = MemoryWriter::new();
        writer.write(Path::new("b"), "1").expect("write");
        writer.write(Path::new("a"), "2").expect("write");
        writer.write(Path::new("b"), "3").expect("write");
        let paths: Vec<&Path> = writer.paths().collect();
        assert_eq!(paths, vec![Path::new("b"), Path::new("a")]);
        assert_eq!(writer.get("b"), Some("3"));
        assert_eq!(writer.len(), 2);
    }
}
