//! # docreader
//!
//! Upload office documents, PDFs and HTML pages and get Markdown back.
//!
//! The parsing itself is delegated to an external conversion engine (the
//! MarkItDown CLI by default, or any HTTP conversion service). This crate
//! owns everything around it: staging uploads to temporary files, running
//! the engine, size accounting, per-document failure containment, and the
//! web and command-line surfaces.
//!
//! ## Pipeline Overview
//!
//! ```text
//! uploads
//!  │
//!  ├─ 0. Screen   drop files whose extension is not docx/xlsx/pptx/pdf/html/htm
//!  ├─ 1. Stage    write bytes to a temp file with the same extension, close it
//!  ├─ 2. Convert  hand the path to the engine, collect the text
//!  ├─ 3. Measure  declared upload size vs. UTF-8 text size, reduction %
//!  ├─ 4. Cleanup  unlink the staged file (also on every failure path)
//!  └─ 5. Output   preview + `{name}_converted.md` / `.txt` downloads
//! ```
//!
//! Documents are processed one after another; a failure in one is reported
//! and the batch moves on.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docreader::{Orchestrator, ReaderConfig, UploadedDocument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ReaderConfig::default();
//!     let orchestrator = Orchestrator::from_config(&config)?;
//!     let upload = UploadedDocument::new("report.docx", std::fs::read("report.docx")?);
//!     let report = orchestrator.convert_batch(&[upload], false).await;
//!     for result in report.converted() {
//!         println!("{} ({}% smaller)", result.content, result.metrics.reduction_percent);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docreader` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod server;
pub mod stream;
pub mod upload;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{EngineBackend, ReaderConfig, ReaderConfigBuilder};
pub use convert::{write_artifact, Orchestrator};
pub use error::{DocReaderError, DocumentError, EngineError, FailureKind};
pub use output::{
    ArtifactFormat, BatchReport, ConversionResult, DocumentFailure, DocumentOutcome,
    DownloadArtifact, SizeMetrics,
};
pub use pipeline::engine::{build_engine, CommandEngine, ConversionEngine, HttpSession, RemoteEngine};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use server::{build_router, serve, start_server, AppState};
pub use stream::OutcomeStream;
pub use upload::{UploadedDocument, ALLOWED_EXTENSIONS};
