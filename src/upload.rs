//! Uploaded documents and the extension allowlist.
//!
//! The allowlist is checked against the filename the client presents. There
//! is no content sniffing: a renamed file with a mismatched extension passes
//! here and fails later in the engine.

use crate::error::DocReaderError;
use std::path::Path;

/// Extensions accepted by the upload surface.
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["docx", "xlsx", "pptx", "pdf", "html", "htm"];

/// One uploaded file: bytes plus the name and size the client declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Size used as the "original" figure in size accounting.
    pub declared_size: u64,
}

impl UploadedDocument {
    /// Wrap an in-memory upload; the declared size is the buffer length.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let declared_size = bytes.len() as u64;
        Self {
            filename: filename.into(),
            bytes,
            declared_size,
        }
    }

    /// Lower-cased extension of the presented filename, if any.
    pub fn extension(&self) -> Option<String> {
        extension(&self.filename)
    }

    pub fn is_allowed(&self) -> bool {
        is_allowed(&self.filename)
    }
}

/// Read a document from disk, declaring its on-disk size.
pub async fn read_document(path: &Path) -> Result<UploadedDocument, DocReaderError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| DocReaderError::InputReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(UploadedDocument::new(filename, bytes))
}

/// Last path component of a client-supplied name (some browsers send a full path).
pub fn file_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Lower-cased extension without the dot. A leading dot alone is not an extension.
pub fn extension(name: &str) -> Option<String> {
    Path::new(file_name(name))
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Filename without its final extension (`report.final.docx` → `report.final`).
pub fn base_name(name: &str) -> &str {
    let name = file_name(name);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Whether the presented filename carries an allowed extension.
pub fn is_allowed(name: &str) -> bool {
    extension(name)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Value for an HTML `accept` attribute: `.docx,.xlsx,…`.
pub fn accept_attribute() -> String {
    ALLOWED_EXTENSIONS
        .iter()
        .map(|e| format!(".{e}"))
        .collect::<Vec<_>>()
        .join(",")
}
