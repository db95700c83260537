//! Progress-callback trait for per-document batch events.
//!
//! Attach an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::convert::Orchestrator::with_progress`] to receive events as the
//! orchestrator works through a batch. The `docreader convert` command
//! renders them as a terminal progress bar.
//!
//! # Example
//!
//! ```rust
//! use docreader::{BatchProgressCallback, SizeMetrics};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CountingCallback {
//!     converted: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, index: usize, total: usize, metrics: &SizeMetrics) {
//!         self.converted.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{index}/{total}: {}% smaller", metrics.reduction_percent);
//!     }
//! }
//! ```

use crate::output::SizeMetrics;
use std::sync::Arc;

/// Called by the orchestrator as it processes a batch.
///
/// Every method has a no-op default so implementors override only what they
/// need. Indices are 1-based. Batch-level events fire from
/// [`crate::convert::Orchestrator::convert_batch`]; streaming callers
/// receive document-level events only.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before the first document.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before a document is staged.
    fn on_document_start(&self, index: usize, total: usize, filename: &str) {
        let _ = (index, total, filename);
    }

    /// Called when a document converted and its staged copy is gone.
    fn on_document_complete(&self, index: usize, total: usize, metrics: &SizeMetrics) {
        let _ = (index, total, metrics);
    }

    /// Called when a document failed or was refused by the allowlist.
    ///
    /// `message` is the polite, user-facing text.
    fn on_document_error(&self, index: usize, total: usize, message: &str) {
        let _ = (index, total, message);
    }

    /// Called once after every document has been attempted.
    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type held by the orchestrator.
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::measure::measure;

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_document_start(1, 2, "a.pdf");
        cb.on_document_complete(1, 2, &measure(10, "abc"));
        cb.on_document_error(2, 2, "Could not read b.pdf. Please check the format.");
        cb.on_batch_complete(2, 1);
    }
}
