//! Process-local object store for development and tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{ObjectStorage, ObjectStorageError};
use crate::domain::{SignedUrl, StorageKey};

const URL_PREFIX: &str = "memory://objects/";

#[derive(Default)]
struct Objects {
    blobs: HashMap<String, Vec<u8>>,
    tokens: HashMap<String, String>,
}

/// Keeps object bytes in a map and issues opaque token URLs that
/// [`InMemoryObjectStorage::resolve_signed_url`] can redeem.
#[derive(Default)]
pub struct InMemoryObjectStorage {
    objects: Mutex<Objects>,
}

impl InMemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn objects(&self) -> MutexGuard<'_, Objects> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the bytes a previously issued signed URL points at.
    pub fn resolve_signed_url(&self, url: &str) -> Option<Vec<u8>> {
        let (_, token) = url.strip_prefix(URL_PREFIX)?.split_once("?token=")?;
        let objects = self.objects();
        let key = objects.tokens.get(token)?;
        objects.blobs.get(key).cloned()
    }

    pub fn contains(&self, key: &StorageKey) -> bool {
        self.objects().blobs.contains_key(key.as_str())
    }

    pub fn len(&self) -> usize {
        self.objects().blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn put(
        &self,
        key: &StorageKey,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ObjectStorageError> {
        let mut objects = self.objects();
        if objects.blobs.contains_key(key.as_str()) {
            return Err(ObjectStorageError::rejected(format!(
                "object already exists: {key}"
            )));
        }
        objects.blobs.insert(key.as_str().to_owned(), bytes);
        Ok(())
    }

    async fn get(&self, key: &StorageKey) -> Result<Vec<u8>, ObjectStorageError> {
        self.objects()
            .blobs
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| ObjectStorageError::not_found(key.as_str()))
    }

    async fn signed_url(
        &self,
        key: &StorageKey,
        expires_in: u32,
    ) -> Result<SignedUrl, ObjectStorageError> {
        let mut objects = self.objects();
        if !objects.blobs.contains_key(key.as_str()) {
            return Err(ObjectStorageError::not_found(key.as_str()));
        }
        let token = hex::encode(rand::random::<[u8; 16]>());
        objects.tokens.insert(token.clone(), key.as_str().to_owned());
        Ok(SignedUrl {
            url: format!("{URL_PREFIX}{key}?token={token}"),
            expires_in,
        })
    }

    async fn delete(&self, key: &StorageKey) -> Result<(), ObjectStorageError> {
        let mut objects = self.objects();
        objects.tokens.retain(|_, target| target != key.as_str());
        objects
            .blobs
            .remove(key.as_str())
            .map(|_| ())
            .ok_or_else(|| ObjectStorageError::not_found(key.as_str()))
    }
}
