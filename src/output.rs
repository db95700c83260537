//! Result types produced by a conversion batch.
//!
//! A batch yields one [`DocumentOutcome`] per input, in input order, collected
//! into a [`BatchReport`]. Successful documents carry a [`ConversionResult`]
//! from which the two download artifacts are derived; failed documents carry
//! a [`DocumentFailure`] already shaped for presentation.

use crate::error::{DocumentError, FailureKind};
use serde::{Deserialize, Serialize};

/// Original vs. converted size comparison for one document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeMetrics {
    /// Declared upload size in bytes.
    pub original_bytes: u64,
    /// UTF-8 length of the extracted text in bytes.
    pub converted_bytes: u64,
    /// `original_bytes` in MiB, rounded to 3 decimals.
    pub original_mb: f64,
    /// `converted_bytes` in MiB, rounded to 3 decimals.
    pub converted_mb: f64,
    /// `(1 - converted/original) * 100` rounded to 1 decimal; 0 for empty uploads.
    ///
    /// Negative when the text is larger than the upload.
    pub reduction_percent: f64,
}

/// Extracted text of one document plus its size metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Filename as uploaded.
    pub filename: String,
    /// Text returned by the engine, unmodified.
    pub content: String,
    pub metrics: SizeMetrics,
}

impl ConversionResult {
    /// Filename without its final extension, used to name the artifacts.
    pub fn base_name(&self) -> &str {
        crate::upload::base_name(&self.filename)
    }

    /// Build the artifact for one download format.
    pub fn artifact(&self, format: ArtifactFormat) -> DownloadArtifact {
        DownloadArtifact {
            filename: format!("{}_converted.{}", self.base_name(), format.extension()),
            media_type: format.media_type().to_string(),
            content: self.content.clone(),
        }
    }

    /// Both download artifacts: Markdown first, then plain text.
    pub fn artifacts(&self) -> [DownloadArtifact; 2] {
        [
            self.artifact(ArtifactFormat::Markdown),
            self.artifact(ArtifactFormat::PlainText),
        ]
    }
}

/// The two renditions offered for download. Content is identical; only the
/// filename suffix and the declared media type differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFormat {
    Markdown,
    PlainText,
}

impl ArtifactFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactFormat::Markdown => "md",
            ArtifactFormat::PlainText => "txt",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            ArtifactFormat::Markdown => "text/markdown",
            ArtifactFormat::PlainText => "text/plain",
        }
    }
}

impl std::str::FromStr for ArtifactFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(ArtifactFormat::Markdown),
            "txt" | "text" | "plain" => Ok(ArtifactFormat::PlainText),
            other => Err(format!("unknown format '{other}', expected md or txt")),
        }
    }
}

/// A downloadable rendition of a converted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadArtifact {
    /// `{basename}_converted.md` or `{basename}_converted.txt`.
    pub filename: String,
    pub media_type: String,
    pub content: String,
}

/// Presentation form of a [`DocumentError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub filename: String,
    pub kind: FailureKind,
    /// Polite message, safe to show to anyone.
    pub message: String,
    /// Technical detail; only present when debug output was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl DocumentFailure {
    /// Shape an error for display, attaching the cause only in debug mode.
    pub fn from_error(err: &DocumentError, debug: bool) -> Self {
        Self {
            filename: err.filename().to_string(),
            kind: err.kind(),
            message: err.user_message(),
            detail: debug.then(|| err.detail()),
        }
    }
}

/// What happened to one document of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentOutcome {
    Converted(ConversionResult),
    Failed(DocumentFailure),
    /// Extension not on the allowlist. Screened out before staging, so the
    /// engine never saw it.
    Rejected { filename: String },
}

impl DocumentOutcome {
    pub fn filename(&self) -> &str {
        match self {
            DocumentOutcome::Converted(r) => &r.filename,
            DocumentOutcome::Failed(f) => &f.filename,
            DocumentOutcome::Rejected { filename } => filename,
        }
    }
}

/// Outcomes of a whole batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub documents: Vec<DocumentOutcome>,
}

impl BatchReport {
    /// Successful conversions, in input order.
    pub fn converted(&self) -> impl Iterator<Item = &ConversionResult> {
        self.documents.iter().filter_map(|d| match d {
            DocumentOutcome::Converted(r) => Some(r),
            _ => None,
        })
    }

    /// Failed documents, in input order.
    pub fn failures(&self) -> impl Iterator<Item = &DocumentFailure> {
        self.documents.iter().filter_map(|d| match d {
            DocumentOutcome::Failed(f) => Some(f),
            _ => None,
        })
    }

    /// Filenames refused by the upload allowlist.
    pub fn rejected(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().filter_map(|d| match d {
            DocumentOutcome::Rejected { filename } => Some(filename.as_str()),
            _ => None,
        })
    }

    pub fn success_count(&self) -> usize {
        self.converted().count()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
