//! Port for packing several files into one downloadable archive.
//!
//! Implementations are synchronous and CPU bound; callers run them on a
//! blocking thread.

use crate::domain::ArchiveEntry;

use super::define_port_error;

define_port_error! {
    /// Errors raised while assembling an archive.
    pub enum ArchiveError {
        /// Writing an entry or finalising the archive failed.
        Write { message: String } => "archive write failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait ArchiveBuilder: Send + Sync {
    /// MIME type of the produced archive.
    fn content_type(&self) -> &'static str;

    /// File extension of the produced archive, without the dot.
    fn extension(&self) -> &'static str;

    /// Pack `entries` in order. Entry names must already be unique.
    fn bundle(&self, entries: Vec<ArchiveEntry>) -> Result<Vec<u8>, ArchiveError>;
}
