//! Zip implementation of the archive port.

use std::io::{Cursor, Write};

use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::domain::ArchiveEntry;
use crate::domain::ports::{ArchiveBuilder, ArchiveError};

/// Packs entries into a deflate-compressed zip held in memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipArchiveBuilder;

fn write_error(err: impl std::fmt::Display) -> ArchiveError {
    ArchiveError::write(err.to_string())
}

impl ArchiveBuilder for ZipArchiveBuilder {
    fn content_type(&self) -> &'static str {
        "application/zip"
    }

    fn extension(&self) -> &'static str {
        "zip"
    }

    fn bundle(&self, entries: Vec<ArchiveEntry>) -> Result<Vec<u8>, ArchiveError> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for entry in entries {
            writer.start_file(entry.name, options).map_err(write_error)?;
            writer.write_all(&entry.bytes).map_err(write_error)?;
        }
        let cursor = writer.finish().map_err(write_error)?;
        Ok(cursor.into_inner())
    }
}
