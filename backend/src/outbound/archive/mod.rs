//! Archive adapters for batch downloads.

mod zip_archive;

pub use zip_archive::ZipArchiveBuilder;
