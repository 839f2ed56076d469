use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing summarization activity.
#[derive(Debug, Default)]
pub struct SummaryMetrics {
    texts_summarized: AtomicU64,
    files_summarized: AtomicU64,
    failed_requests: AtomicU64,
}

impl SummaryMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful summary of directly submitted text.
    pub fn record_text(&self) {
        self.texts_summarized.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful summary of an uploaded file.
    pub fn record_file(&self) {
        self.files_summarized.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request that ended in an error.
    pub fn record_failure(&self) {
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            texts_summarized: self.texts_summarized.load(Ordering::Relaxed),
            files_summarized: self.files_summarized.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of summarization counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Text submissions summarized since startup.
    pub texts_summarized: u64,
    /// File uploads summarized since startup.
    pub files_summarized: u64,
    /// Requests rejected or failed at any stage.
    pub failed_requests: u64,
}
