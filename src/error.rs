//! Error types for the docreader library.
//!
//! Three error types reflect three distinct scopes:
//!
//! * [`DocReaderError`] is **fatal**: the operation cannot proceed at all
//!   (invalid configuration, HTTP client cannot be built, server cannot bind,
//!   output file cannot be written).
//!
//! * [`DocumentError`] is **non-fatal**: one document in a batch failed while
//!   being staged, converted or cleaned up. The batch carries on; the error
//!   is turned into a [`crate::output::DocumentFailure`] for presentation.
//!
//! * [`EngineError`] is what a [`crate::pipeline::engine::ConversionEngine`]
//!   reports. Always wrapped in [`DocumentError::Conversion`] by the time it
//!   reaches a caller.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docreader library.
#[derive(Debug, Error)]
pub enum DocReaderError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The shared HTTP session could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read an input document from disk (CLI batches).
    #[error("Failed to read input file '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write a converted output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The web server could not bind or stopped with an I/O error.
    #[error("Server error on {addr}: {source}")]
    Server {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Which stage of the per-document pipeline failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Staging,
    Conversion,
    Cleanup,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Staging => f.write_str("staging"),
            FailureKind::Conversion => f.write_str("conversion"),
            FailureKind::Cleanup => f.write_str("cleanup"),
        }
    }
}

/// A non-fatal error for a single document.
///
/// Each variant carries the original filename and the underlying cause so
/// callers can assert on the failure category instead of matching strings.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The upload could not be written to a temporary file.
    #[error("Staging '{filename}' failed: {source}")]
    Staging {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine could not extract text from the staged file.
    #[error("Converting '{filename}' failed: {source}")]
    Conversion {
        filename: String,
        #[source]
        source: EngineError,
    },

    /// The staged file could not be removed after conversion.
    #[error("Removing staged copy of '{filename}' failed: {source}")]
    Cleanup {
        filename: String,
        #[source]
        source: std::io::Error,
    },
}

impl DocumentError {
    /// The pipeline stage this error belongs to.
    pub fn kind(&self) -> FailureKind {
        match self {
            DocumentError::Staging { .. } => FailureKind::Staging,
            DocumentError::Conversion { .. } => FailureKind::Conversion,
            DocumentError::Cleanup { .. } => FailureKind::Cleanup,
        }
    }

    /// Name of the uploaded file the error refers to.
    pub fn filename(&self) -> &str {
        match self {
            DocumentError::Staging { filename, .. }
            | DocumentError::Conversion { filename, .. }
            | DocumentError::Cleanup { filename, .. } => filename,
        }
    }

    /// The polite message shown to end users. Never contains the cause.
    pub fn user_message(&self) -> String {
        format!(
            "Could not read {}. Please check the format.",
            self.filename()
        )
    }

    /// Full technical detail. Every variant's display already embeds its cause.
    pub fn detail(&self) -> String {
        self.to_string()
    }
}

/// Failure reported by a conversion engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The converter process could not be started.
    #[error("could not start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The converter process exited unsuccessfully.
    #[error("'{program}' exited with {status}: {stderr}")]
    ExitStatus {
        program: String,
        status: String,
        stderr: String,
    },

    /// The extracted text is not valid UTF-8.
    #[error("engine output is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// The staged file could not be read back for upload.
    #[error("could not read staged file '{path}': {source}")]
    ReadStaged {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The conversion service did not answer within the session timeout.
    #[error("request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    /// The conversion service answered with a non-success status.
    #[error("{url} answered HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// Transport-level HTTP failure.
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Anything else an engine implementation wants to report.
    #[error("{0}")]
    Other(String),
}
