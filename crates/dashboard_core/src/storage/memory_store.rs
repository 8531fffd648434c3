//! In-process object store for tests and dry runs.

use super::{validate_bucket, validate_key, ObjectStore, StorageError, StorageResult};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Ordered `(bucket, key) -> body` map.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RefCell<BTreeMap<(String, String), Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.borrow().is_empty()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .borrow()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> StorageResult<()> {
        validate_bucket(bucket)?;
        validate_key(key)?;
        self.objects
            .borrow_mut()
            .insert((bucket.to_string(), key.to_string()), body.to_vec());
        Ok(())
    }

    fn list_keys(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<String>> {
        Ok(self
            .objects
            .borrow()
            .keys()
            .filter(|(b, k)| b == bucket && k.starts_with(prefix))
            .map(|(_, k)| k.clone())
            .collect())
    }

    fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        Ok(self
            .objects
            .borrow()
            .contains_key(&(bucket.to_string(), key.to_string())))
    }
}
