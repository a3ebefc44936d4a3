//! Source file access for the retry loop

use crate::error::{ForgeError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Read and write generated sources by project-relative path
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn read(&self, path: &Path) -> Result<String>;

    async fn write(&self, path: &Path, content: &str) -> Result<()>;
}

/// [`FileStore`] over the local filesystem, rooted at the project directory
#[derive(Debug, Clone)]
pub struct FsFileStore {
    root: PathBuf,
}

impl FsFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() { path.to_path_buf() } else { self.root.join(path) }
    }
}

#[async_trait]
impl FileStore for FsFileStore {
    async fn read(&self, path: &Path) -> Result<String> {
        let full = self.resolve(path);
        trace!("Reading {}", full.display());
        tokio::fs::read_to_string(&full)
            .await
            .map_err(|source| ForgeError::FileAccess { path: full, source })
    }

    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        let full = self.resolve(path);
        trace!("Writing {} bytes to {}", content.len(), full.display());
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ForgeError::FileAccess { path: parent.to_path_buf(), source })?;
        }
        tokio::fs::write(&full, content)
            .await
            .map_err(|source| ForgeError::FileAccess { path: full, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_round_trip_relative_to_root() {
        let dir = TempDir::new().unwrap();
        let store = FsFileStore::new(dir.path());

        store.write(Path::new("src/steps/Steps.java"), "class Steps {}\n").await.unwrap();

        assert!(dir.path().join("src/steps/Steps.java").exists());
        assert_eq!(store.read(Path::new("src/steps/Steps.java")).await.unwrap(), "class Steps {}\n");
    }

    #[tokio::test]
    async fn test_missing_file_is_a_file_access_error() {
        let dir = TempDir::new().unwrap();
        let store = FsFileStore::new(dir.path());

        let err = store.read(Path::new("Nope.java")).await.unwrap_err();
        match err {
            ForgeError::FileAccess { path, .. } => assert_eq!(path, dir.path().join("Nope.java")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
