//! Streaming batch API: emit each document's outcome as soon as it is ready.
//!
//! Unlike [`crate::convert::Orchestrator::convert_batch`], which returns only
//! after every document has been attempted, [`Orchestrator::convert_stream`]
//! yields one [`DocumentOutcome`] per input as it completes. Processing is
//! still strictly sequential and outcomes arrive in input order, so callers
//! can zip them with their inputs.

use crate::convert::Orchestrator;
use crate::output::DocumentOutcome;
use crate::upload::UploadedDocument;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use tokio_stream::Stream;

/// A boxed stream of document outcomes borrowing the orchestrator.
pub type OutcomeStream<'a> = Pin<Box<dyn Stream<Item = DocumentOutcome> + Send + 'a>>;

impl Orchestrator {
    /// Convert `documents` one at a time, yielding each outcome in order.
    ///
    /// Nothing runs until the stream is polled. Document-level progress
    /// events fire; batch-level ones do not.
    pub fn convert_stream(&self, documents: Vec<UploadedDocument>, debug: bool) -> OutcomeStream<'_> {
        let total = documents.len();
        let s = stream::iter(documents.into_iter().enumerate()).then(move |(i, document)| async move {
            self.process(i + 1, total, &document, debug).await
        });
        Box::pin(s)
    }
}
