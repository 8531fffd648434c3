//! Object storage abstraction for example assets and dataset files.
//!
//! # Responsibility
//! - Define bucket/key access used by the example pipeline.
//! - Provide a filesystem-backed store and an in-process store.
//!
//! # Invariants
//! - Keys are `/`-separated, relative, and never contain `..` or empty
//!   segments.
//! - `list_keys` returns keys in ascending byte order.

mod fs_store;
mod memory_store;

pub use fs_store::FsObjectStore;
pub use memory_store::MemoryObjectStore;

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    /// Bucket name or key violates the key convention.
    InvalidKey(String),
    NotFound { bucket: String, key: String },
    Io {
        bucket: String,
        key: String,
        source: std::io::Error,
    },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid object key: `{key}`"),
            Self::NotFound { bucket, key } => write!(f, "object not found: {bucket}/{key}"),
            Self::Io {
                bucket,
                key,
                source,
            } => write!(f, "object storage io error on {bucket}/{key}: {source}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Bucket/key object storage.
pub trait ObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>>;
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> StorageResult<()>;
    /// Lists keys starting with `prefix`, sorted ascending.
    fn list_keys(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<String>>;
    fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool>;

    fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> StorageResult<()> {
        let body = self.get_object(src_bucket, src_key)?;
        self.put_object(dst_bucket, dst_key, &body)
    }

    /// Reads an object and decodes it as UTF-8 text.
    fn get_text(&self, bucket: &str, key: &str) -> StorageResult<String> {
        let body = self.get_object(bucket, key)?;
        String::from_utf8(body).map_err(|err| StorageError::Io {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
        })
    }
}

impl<S: ObjectStore + ?Sized> ObjectStore for &S {
    fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        (**self).get_object(bucket, key)
    }

    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> StorageResult<()> {
        (**self).put_object(bucket, key, body)
    }

    fn list_keys(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<String>> {
        (**self).list_keys(bucket, prefix)
    }

    fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        (**self).exists(bucket, key)
    }

    fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> StorageResult<()> {
        (**self).copy_object(src_bucket, src_key, dst_bucket, dst_key)
    }
}

/// Validates a bucket name: one non-empty path segment.
pub fn validate_bucket(bucket: &str) -> StorageResult<()> {
    if bucket.is_empty() || bucket.contains('/') || bucket == "." || bucket == ".." {
        return Err(StorageError::InvalidKey(bucket.to_string()));
    }
    Ok(())
}

/// Validates an object key against the key convention.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
