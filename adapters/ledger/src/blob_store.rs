use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use crate::{atomic_write::atomic_write, BlobStore};

/// Blob store that keeps one file per upload inside a directory.
#[derive(Clone, Debug)]
pub struct DirectoryBlobStore {
    root: PathBuf,
}

impl DirectoryBlobStore {
    /// Creates a store rooted at `root`; the directory is created on first use.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory receiving uploads.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BlobStore for DirectoryBlobStore {
    fn store(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let name = Path::new(file_name)
            .file_name()
            .ok_or_else(|| anyhow!("upload name '{file_name}' does not name a file"))?;

        let destination = self.root.join(name);
        atomic_write(&destination, bytes)?;
        log::info!(
            "stored {} bytes at {}",
            bytes.len(),
            destination.display()
        );
        Ok(destination)
    }
}
