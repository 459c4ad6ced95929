//! Port for counting document pipeline outcomes.
//!
//! Orphaned objects (bytes in storage with no metadata row) are the one
//! failure mode the pipeline cannot repair on its own, so they are counted
//! for operators to reconcile.

/// Outcome of the compensating delete after a failed metadata insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompensationOutcome {
    /// The uploaded object was removed again.
    Removed,
    /// The object could not be removed and is now orphaned.
    Orphaned,
}

impl CompensationOutcome {
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Removed => "removed",
            Self::Orphaned => "orphaned",
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait DocumentMetrics: Send + Sync {
    /// A document was stored and its row inserted.
    fn record_upload(&self, size_bytes: i64);

    /// A compensating delete ran after a failed insert.
    fn record_compensation(&self, outcome: CompensationOutcome);

    /// Entries skipped while assembling a batch archive.
    fn record_skipped_entries(&self, count: usize);
}

/// Metrics sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpDocumentMetrics;

impl DocumentMetrics for NoOpDocumentMetrics {
    fn record_upload(&self, _size_bytes: i64) {}

    fn record_compensation(&self, _outcome: CompensationOutcome) {}

    fn record_skipped_entries(&self, _count: usize) {}
}
