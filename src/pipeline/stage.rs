//! Staging: copy an upload to a temporary file the engine can open by path.
//!
//! The converter only accepts a filesystem path, and it decides how to parse
//! by extension, so the staged name keeps the upload's suffix. The write
//! handle is closed before [`stage`] returns: [`NamedTempFile::into_temp_path`]
//! drops the descriptor and leaves a [`TempPath`] that unlinks the file when
//! dropped. That gives deletion on every exit path, success or failure.

use crate::upload::{file_name, UploadedDocument};
use std::io::{self, Write};
use std::path::Path;
use tempfile::{Builder, NamedTempFile, TempPath};
use tracing::debug;

const STAGED_PREFIX: &str = "docreader-";

/// A staged copy of one upload. Removed on [`cleanup`](Self::cleanup) or drop.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the staged file, reporting any failure.
    pub fn cleanup(self) -> io::Result<()> {
        self.path.close()
    }
}

/// Write `document` to a uniquely named temp file and close the handle.
///
/// `temp_dir` overrides the system temp directory.
pub fn stage(document: &UploadedDocument, temp_dir: Option<&Path>) -> io::Result<StagedFile> {
    let suffix = staged_suffix(&document.filename);
    let mut builder = Builder::new();
    builder.prefix(STAGED_PREFIX).suffix(&suffix);

    let mut file: NamedTempFile = match temp_dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    file.write_all(&document.bytes)?;
    file.flush()?;
    file.as_file().sync_all()?;

    let path = file.into_temp_path();
    debug!(
        "Staged {} ({} bytes) at {}",
        document.filename,
        document.bytes.len(),
        path.display()
    );
    Ok(StagedFile { path })
}

/// `.ext` exactly as presented, or empty when the name has no extension.
fn staged_suffix(filename: &str) -> String {
    Path::new(file_name(filename))
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}
