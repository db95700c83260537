//! The conversion orchestrator.
//!
//! [`Orchestrator::convert_document`] runs one upload through
//! stage → engine → measure → cleanup. [`Orchestrator::convert_batch`] runs a
//! whole batch strictly in order and contains every per-document failure, so
//! one bad file never stops the rest. Use [`Orchestrator::convert_stream`]
//! (in [`crate::stream`]) to receive outcomes one at a time instead.

use crate::config::ReaderConfig;
use crate::error::{DocReaderError, DocumentError};
use crate::output::{ArtifactFormat, BatchReport, ConversionResult, DocumentFailure, DocumentOutcome};
use crate::pipeline::engine::{build_engine, ConversionEngine};
use crate::pipeline::{measure, stage};
use crate::progress::ProgressCallback;
use crate::upload::UploadedDocument;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs uploads through the conversion pipeline.
///
/// Holds only read-only state (the engine and the staging directory), so a
/// single instance is shared by every request.
#[derive(Clone)]
pub struct Orchestrator {
    engine: Arc<dyn ConversionEngine>,
    temp_dir: Option<PathBuf>,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("engine", &self.engine.name())
            .field("temp_dir", &self.temp_dir)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn BatchProgressCallback>"))
            .finish()
    }
}

impl Orchestrator {
    /// Wrap an already constructed engine.
    pub fn new(engine: Arc<dyn ConversionEngine>) -> Self {
        Self {
            engine,
            temp_dir: None,
            progress: None,
        }
    }

    /// Build the configured engine and staging directory.
    pub fn from_config(config: &ReaderConfig) -> Result<Self, DocReaderError> {
        let mut orchestrator = Self::new(build_engine(config)?);
        orchestrator.temp_dir = config.temp_dir.clone();
        Ok(orchestrator)
    }

    /// Stage files under `dir` instead of the system temp directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn engine(&self) -> &Arc<dyn ConversionEngine> {
        &self.engine
    }

    /// Convert one document.
    ///
    /// The staged copy is removed on every path: explicitly after a
    /// successful conversion (so a failed delete is reported), and by drop
    /// when staging or conversion fails.
    pub async fn convert_document(
        &self,
        document: &UploadedDocument,
    ) -> Result<ConversionResult, DocumentError> {
        let start = Instant::now();
        let filename = document.filename.clone();

        let staged = stage::stage(document, self.temp_dir.as_deref()).map_err(|source| {
            DocumentError::Staging {
                filename: filename.clone(),
                source,
            }
        })?;

        let content = self
            .engine
            .convert(staged.path())
            .await
            .map_err(|source| DocumentError::Conversion {
                filename: filename.clone(),
                source,
            })?;

        let metrics = measure::measure(document.declared_size, &content);

        staged.cleanup().map_err(|source| DocumentError::Cleanup {
            filename: filename.clone(),
            source,
        })?;

        debug!(
            "Converted {} in {}ms: {} → {} bytes",
            filename,
            start.elapsed().as_millis(),
            metrics.original_bytes,
            metrics.converted_bytes
        );

        Ok(ConversionResult {
            filename,
            content,
            metrics,
        })
    }

    /// Convert every document in order, containing failures per document.
    ///
    /// Documents whose extension is not on the allowlist are reported as
    /// [`DocumentOutcome::Rejected`] and never staged. With `debug` set,
    /// failures carry the technical detail.
    pub async fn convert_batch(&self, documents: &[UploadedDocument], debug: bool) -> BatchReport {
        let total = documents.len();
        let start = Instant::now();
        info!("Starting batch of {} documents", total);
        if let Some(ref cb) = self.progress {
            cb.on_batch_start(total);
        }

        let mut report = BatchReport::default();
        for (i, document) in documents.iter().enumerate() {
            let outcome = self.process(i + 1, total, document, debug).await;
            report.documents.push(outcome);
        }

        let ok = report.success_count();
        info!(
            "Batch complete: {}/{} converted in {}ms",
            ok,
            total,
            start.elapsed().as_millis()
        );
        if let Some(ref cb) = self.progress {
            cb.on_batch_complete(total, ok);
        }
        report
    }

    /// One document's outcome, with progress events. Never fails.
    pub(crate) async fn process(
        &self,
        index: usize,
        total: usize,
        document: &UploadedDocument,
        debug: bool,
    ) -> DocumentOutcome {
        if !document.is_allowed() {
            warn!("Rejected {}: extension not allowed", document.filename);
            if let Some(ref cb) = self.progress {
                cb.on_document_error(
                    index,
                    total,
                    &format!("{} is not a supported file type", document.filename),
                );
            }
            return DocumentOutcome::Rejected {
                filename: document.filename.clone(),
            };
        }

        if let Some(ref cb) = self.progress {
            cb.on_document_start(index, total, &document.filename);
        }

        match self.convert_document(document).await {
            Ok(result) => {
                if let Some(ref cb) = self.progress {
                    cb.on_document_complete(index, total, &result.metrics);
                }
                DocumentOutcome::Converted(result)
            }
            Err(e) => {
                warn!("Document {}/{} failed ({}): {}", index, total, e.kind(), e);
                let failure = DocumentFailure::from_error(&e, debug);
                if let Some(ref cb) = self.progress {
                    cb.on_document_error(index, total, &failure.message);
                }
                DocumentOutcome::Failed(failure)
            }
        }
    }
}

/// Write one artifact of `result` into `dir`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn write_artifact(
    result: &ConversionResult,
    format: ArtifactFormat,
    dir: &Path,
) -> Result<PathBuf, DocReaderError> {
    let artifact = result.artifact(format);
    let path = dir.join(&artifact.filename);

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DocReaderError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;

    let tmp_path = path.with_extension(format!("{}.tmp", format.extension()));
    tokio::fs::write(&tmp_path, artifact.content.as_bytes())
        .await
        .map_err(|e| DocReaderError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, &path)
        .await
        .map_err(|e| DocReaderError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;

    Ok(path)
}
