//! Durable storage of rendered boards.
//!
//! One file per key, `<hash>.webp`, in a flat directory. Writes go to a
//! uniquely named temp file in the same directory and are renamed into place,
//! so readers only ever observe complete files.

use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use board_common::{BoardError, BoardResult};

use crate::key::CacheKey;

const TEMP_SUFFIX: &str = ".tmp";

/// Filesystem-backed store of completed renders.
#[derive(Debug, Clone)]
pub struct RenderStore {
    dir: PathBuf,
}

impl RenderStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Read a completed render. A missing file is `Ok(None)`.
    pub async fn get(&self, key: &CacheKey) -> BoardResult<Option<Bytes>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BoardError::Storage(format!(
                "failed to read {}: {}",
                key.file_name(),
                e
            ))),
        }
    }

    pub async fn exists(&self, key: &CacheKey) -> bool {
        tokio::fs::try_exists(self.path_for(key))
            .await
            .unwrap_or(false)
    }

    /// Persist a render. Returns the final path.
    pub async fn put(&self, key: &CacheKey, data: &[u8]) -> BoardResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            BoardError::Storage(format!(
                "failed to create cache directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let final_path = self.path_for(key);
        let temp_path = self.dir.join(format!(
            ".{}.{}{}",
            key.as_str(),
            uuid::Uuid::new_v4().simple(),
            TEMP_SUFFIX
        ));

        if let Err(e) = tokio::fs::write(&temp_path, data).await {
            remove_temp(&temp_path).await;
            return Err(BoardError::Storage(format!(
                "failed to write {}: {}",
                key.file_name(),
                e
            )));
        }

        if let Err(e) = tokio::fs::rename(&temp_path, &final_path).await {
            remove_temp(&temp_path).await;
            return Err(BoardError::Storage(format!(
                "failed to move {} into place: {}",
                key.file_name(),
                e
            )));
        }

        debug!(hash = %key, bytes = data.len(), "Stored render");
        Ok(final_path)
    }

    /// Number of completed renders on disk. A missing directory counts as empty.
    pub async fn count(&self) -> BoardResult<usize> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut count = 0;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.ends_with(".webp") && !name.starts_with('.') {
                count += 1;
            }
        }
        Ok(count)
    }
}

async fn remove_temp(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove temp file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_directory_created_lazily() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("cache");
        let store = RenderStore::new(&dir);

        assert!(!dir.exists());
        assert_eq!(store.count().await.unwrap(), 0);

        let key = CacheKey::from_code("a");
        store.put(&key, b"webp").await.unwrap();
        assert!(dir.exists());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let tmp = tempfile::tempdir().unwrap();
        let store = RenderStore::new(tmp.path());
        let key = CacheKey::from_code("a");
        store.put(&key, b"one").await.unwrap();
        store.put(&key, b"two").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![key.file_name()]);
        assert_eq!(store.get(&key).await.unwrap().unwrap(), Bytes::from("two"));
    }
}
