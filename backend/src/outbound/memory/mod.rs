//! Process-local repositories.
//!
//! Used when no database URL is configured and by the HTTP-level tests.
//! Every store is a mutex-guarded map; nothing survives a restart.

mod applications;
mod contacts;
mod content;
mod documents;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use applications::InMemoryApplicationRepository;
pub use contacts::InMemoryContactRepository;
pub use content::InMemoryContentRepository;
pub use documents::InMemoryDocumentRepository;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
