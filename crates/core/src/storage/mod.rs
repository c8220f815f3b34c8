//! Image persistence.
//!
//! A create-only writer rooted at the configured save directory: an image is
//! written exactly once, a path that already exists is an error the caller
//! decides how to treat. Parent directories are created on demand and
//! remembered, so a run touching thousands of images in a handful of
//! directories does not stat the same directories over and over.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::debug;

/// Errors writing an image.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The destination already exists; create-only writers never overwrite.
    #[error("File already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// Failed to create a parent directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Async, create-only image writer.
pub struct ImageStore {
    save_dir: PathBuf,
    known_dirs: RwLock<HashSet<PathBuf>>,
}

impl ImageStore {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            known_dirs: RwLock::new(HashSet::new()),
        }
    }

    /// Writes the image at `relative_path` under the save directory.
    ///
    /// Fails with [`StorageError::AlreadyExists`] when the destination
    /// exists; the open is `create_new`, so concurrent tasks racing for the
    /// same path cannot both win.
    pub async fn save(&self, image: &[u8], relative_path: &Path) -> Result<PathBuf, StorageError> {
        let destination = self.save_dir.join(relative_path);

        if let Some(parent) = destination.parent() {
            self.ensure_dir(parent).await?;
        }

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&destination)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StorageError::AlreadyExists { path: destination });
            }
            Err(e) => return Err(StorageError::Io(e)),
        };

        file.write_all(image).await?;
        file.flush().await?;
        debug!("Saved image to {}", destination.display());
        Ok(destination)
    }

    /// Creates the directory unless a previous save already did.
    async fn ensure_dir(&self, dir: &Path) -> Result<(), StorageError> {
        if self.known_dirs.read().await.contains(dir) {
            return Ok(());
        }

        fs::create_dir_all(dir)
            .await
            .map_err(|e| StorageError::DirectoryCreationFailed {
                path: dir.to_path_buf(),
                source: e,
            })?;
        self.known_dirs.write().await.insert(dir.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn saves_into_created_directories() {
        let temp = TempDir::new().unwrap();
        let store = ImageStore::new(temp.path());

        let path = store
            .save(b"image bytes", Path::new("brno_L1/car_3/brno_L1#1.jpg"))
            .await
            .unwrap();

        assert_eq!(fs::read(&path).await.unwrap(), b"image bytes");
    }

    #[tokio::test]
    async fn second_save_to_the_same_path_fails() {
        let temp = TempDir::new().unwrap();
        let store = ImageStore::new(temp.path());
        let rel = Path::new("a/b.jpg");

        store.save(b"first", rel).await.unwrap();
        let err = store.save(b"second", rel).await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists { .. }));

        // The original content is untouched.
        assert_eq!(
            fs::read(temp.path().join(rel)).await.unwrap(),
            b"first"
        );
    }

    #[tokio::test]
    async fn directory_cache_survives_repeated_saves() {
        let temp = TempDir::new().unwrap();
        let store = ImageStore::new(temp.path());

        store.save(b"1", Path::new("site/one.jpg")).await.unwrap();
        store.save(b"2", Path::new("site/two.jpg")).await.unwrap();
        assert_eq!(store.known_dirs.read().await.len(), 1);
    }
}
