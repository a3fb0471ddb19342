//! Directory-backed store: one file per key.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::{CacheError, KeyValueStore};

const EXTENSION: &str = "kv";

/// Durable store that keeps each key in its own file under a directory.
///
/// Keys are base64url-encoded into file names, so any key (including
/// `favorite:<id>`) maps to a safe path. Writes go to a temporary file and
/// are renamed into place, so a crash mid-write leaves the previous value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| CacheError::OpenError(format!("{}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    /// The directory backing this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", URL_SAFE_NO_PAD.encode(key), EXTENSION))
    }

    fn key_for(path: &Path) -> Option<String> {
        if path.extension()? != EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let bytes = URL_SAFE_NO_PAD.decode(stem).ok()?;
        String::from_utf8(bytes).ok()
    }
}

fn store_error(action: &str, path: &Path, e: std::io::Error) -> CacheError {
    CacheError::StoreError(format!("{} {}: {}", action, path.display(), e))
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(store_error("read", &path, e)),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, value)
            .await
            .map_err(|e| store_error("write", &tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| store_error("rename", &path, e))
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(store_error("delete", &path, e)),
        }
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| store_error("list", &self.dir, e))?;

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| store_error("list", &self.dir, e))?
        {
            if let Some(key) = Self::key_for(&entry.path()) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}
