//! Port for the object store holding uploaded document bytes.

use async_trait::async_trait;

use crate::domain::{SignedUrl, StorageKey};

use super::define_port_error;

define_port_error! {
    /// Errors raised by object storage adapters.
    pub enum ObjectStorageError {
        /// No object exists under the key.
        NotFound { key: String } => "object not found: {key}",
        /// The store refused the request.
        Rejected { message: String } => "object storage rejected request: {message}",
        /// The store could not be reached or timed out.
        Transport { message: String } => "object storage unreachable: {message}",
        /// The store answered with a payload we could not read.
        Decode { message: String } => "object storage response invalid: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Write an object. Existing keys are not overwritten.
    async fn put(
        &self,
        key: &StorageKey,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ObjectStorageError>;

    /// Read an object's bytes.
    async fn get(&self, key: &StorageKey) -> Result<Vec<u8>, ObjectStorageError>;

    /// Issue a read URL valid for `expires_in` seconds.
    async fn signed_url(
        &self,
        key: &StorageKey,
        expires_in: u32,
    ) -> Result<SignedUrl, ObjectStorageError>;

    /// Remove an object.
    async fn delete(&self, key: &StorageKey) -> Result<(), ObjectStorageError>;
}
