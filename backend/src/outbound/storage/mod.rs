//! Object storage adapters.

mod dto;
mod http_storage;
mod memory;

pub use http_storage::{HttpObjectStorage, ObjectStorageConfig};
pub use memory::InMemoryObjectStorage;
