use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::bail;
use crate::error::{ErrorKind, StrataResult};
use crate::store::object::ObjectStore;

/// Filesystem-backed object store for local runs.
///
/// Buckets map to directories under a root path and keys to file paths
/// within them. Keys containing `..` segments are rejected so a key can
/// never escape its bucket directory.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Creates a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, bucket: &str, key: &str) -> StrataResult<PathBuf> {
        if key.split('/').any(|segment| segment == "..") {
            bail!(
                ErrorKind::StorageError,
                "Object key escapes bucket root",
                key.to_string()
            );
        }

        Ok(self.root.join(bucket).join(key))
    }
}

impl ObjectStore for FsObjectStore {
    async fn fetch(&self, bucket: &str, key: &str) -> StrataResult<Option<Bytes>> {
        let path = self.object_path(bucket, key)?;

        match tokio::fs::read(&path).await {
            Ok(body) => Ok(Some(Bytes::from(body))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> StrataResult<()> {
        let path = self.object_path(bucket, key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &body).await?;

        Ok(())
    }

    async fn list(&self, bucket: &str, prefix: &str) -> StrataResult<Vec<String>> {
        let bucket_root = self.root.join(bucket);
        if !bucket_root.is_dir() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        collect_keys(&bucket_root, &mut keys).await?;
        keys.retain(|key| key.starts_with(prefix));
        keys.sort();

        Ok(keys)
    }
}

/// Walks a bucket directory and collects relative file paths as keys.
async fn collect_keys(bucket_root: &Path, keys: &mut Vec<String>) -> StrataResult<()> {
    let mut pending = vec![bucket_root.to_path_buf()];

    while let Some(directory) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&directory).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if let Ok(relative) = path.strip_prefix(bucket_root) {
                keys.push(relative.to_string_lossy().replace('\\', "/"));
            }
        }
    }

    Ok(())
}
