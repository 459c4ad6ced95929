//! Prometheus adapter for document pipeline metrics.
//!
//! # Metrics
//!
//! - `abroad_document_uploads_total` (counter): stored documents.
//! - `abroad_document_upload_bytes_total` (counter): bytes stored.
//! - `abroad_document_compensations_total` (counter, label `outcome`):
//!   `removed` or `orphaned`.
//! - `abroad_document_archive_skipped_total` (counter): batch entries that
//!   could not be read from storage.

use prometheus::{Counter, CounterVec, Opts, Registry};

use crate::domain::ports::{CompensationOutcome, DocumentMetrics};

pub struct PrometheusDocumentMetrics {
    uploads_total: Counter,
    upload_bytes_total: Counter,
    compensations_total: CounterVec,
    archive_skipped_total: Counter,
}

impl PrometheusDocumentMetrics {
    /// Create and register metrics with the given registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let uploads_total = Counter::new("abroad_document_uploads_total", "Stored documents")?;
        let upload_bytes_total = Counter::new(
            "abroad_document_upload_bytes_total",
            "Bytes written to object storage by uploads",
        )?;
        let compensations_total = CounterVec::new(
            Opts::new(
                "abroad_document_compensations_total",
                "Compensating deletes after failed metadata inserts",
            ),
            &["outcome"],
        )?;
        let archive_skipped_total = Counter::new(
            "abroad_document_archive_skipped_total",
            "Batch download entries skipped because storage could not serve them",
        )?;
        registry.register(Box::new(uploads_total.clone()))?;
        registry.register(Box::new(upload_bytes_total.clone()))?;
        registry.register(Box::new(compensations_total.clone()))?;
        registry.register(Box::new(archive_skipped_total.clone()))?;
        Ok(Self {
            uploads_total,
            upload_bytes_total,
            compensations_total,
            archive_skipped_total,
        })
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "Prometheus counters are f64; byte totals tolerate rounding"
)]
fn as_counter_value(value: u64) -> f64 {
    value as f64
}

impl DocumentMetrics for PrometheusDocumentMetrics {
    fn record_upload(&self, size_bytes: i64) {
        self.uploads_total.inc();
        self.upload_bytes_total
            .inc_by(as_counter_value(u64::try_from(size_bytes).unwrap_or(0)));
    }

    fn record_compensation(&self, outcome: CompensationOutcome) {
        self.compensations_total
            .with_label_values(&[outcome.as_label()])
            .inc();
    }

    fn record_skipped_entries(&self, count: usize) {
        self.archive_skipped_total
            .inc_by(as_counter_value(u64::try_from(count).unwrap_or(u64::MAX)));
    }
}
