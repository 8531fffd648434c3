//! Filesystem-backed object store.
//!
//! Each bucket is a directory under `root`; an object key maps to the file at
//! `root/bucket/key`.

use super::{validate_bucket, validate_key, ObjectStore, StorageError, StorageResult};
use log::{debug, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> StorageResult<PathBuf> {
        validate_bucket(bucket)?;
        validate_key(key)?;
        let mut path = self.root.join(bucket);
        for segment in key.split('/') {
            path.push(segment);
        }
        Ok(path)
    }
}

fn io_error(bucket: &str, key: &str, source: std::io::Error) -> StorageError {
    if source.kind() == ErrorKind::NotFound {
        return StorageError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        };
    }
    StorageError::Io {
        bucket: bucket.to_string(),
        key: key.to_string(),
        source,
    }
}

impl ObjectStore for FsObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        std::fs::read(&path).map_err(|err| io_error(bucket, key, err))
    }

    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> StorageResult<()> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| io_error(bucket, key, err))?;
        }
        std::fs::write(&path, body).map_err(|err| io_error(bucket, key, err))?;
        debug!(
            "event=object_put module=storage status=ok bucket={} key={} bytes={}",
            bucket,
            key,
            body.len()
        );
        Ok(())
    }

    fn list_keys(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<String>> {
        validate_bucket(bucket)?;
        let bucket_dir = self.root.join(bucket);
        if !bucket_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in WalkDir::new(&bucket_dir).min_depth(1) {
            let entry = entry.map_err(|err| StorageError::Io {
                bucket: bucket.to_string(),
                key: prefix.to_string(),
                source: err.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&bucket_dir) else {
                continue;
            };
            let Some(key) = relative_key(relative) else {
                warn!(
                    "event=object_list module=storage status=skipped reason=non_utf8_name bucket={} path={}",
                    bucket,
                    relative.display()
                );
                continue;
            };
            if key.starts_with(prefix) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        Ok(self.object_path(bucket, key)?.is_file())
    }
}

/// Slash-joined key for a path below the bucket directory. `None` when a
/// component is not valid UTF-8.
fn relative_key(relative: &Path) -> Option<String> {
    let segments = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(segments.join("/"))
}
