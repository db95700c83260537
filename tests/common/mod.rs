//! Shared test fixtures.

#![allow(dead_code)]

use docreader::{ConversionEngine, EngineError};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Marker that makes [`FakeEngine`] fail a document.
pub const BROKEN_MARKER: &[u8] = b"BROKEN";

/// Raw text carried by the failures [`FakeEngine`] produces.
pub const FAKE_TRACEBACK: &str = "Traceback: zipfile.BadZipFile: File is not a zip file";

/// Stand-in for the external converter.
///
/// Returns `"# converted\n"` followed by the staged bytes (lossy UTF-8), or
/// fails when the bytes contain [`BROKEN_MARKER`]. Records every path it saw
/// together with the bytes found there.
#[derive(Default)]
pub struct FakeEngine {
    pub seen: Mutex<Vec<(PathBuf, Vec<u8>)>>,
    /// Delete the staged file before returning, to provoke a cleanup failure.
    pub remove_staged: bool,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn removing_staged() -> Self {
        Self {
            remove_staged: true,
            ..Self::default()
        }
    }

    pub fn seen_paths(&self) -> Vec<PathBuf> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|(p, _)| p.clone())
            .collect()
    }

    pub fn seen_bytes(&self) -> Vec<Vec<u8>> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|(_, b)| b.clone())
            .collect()
    }
}

impl ConversionEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake-engine"
    }

    fn convert<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<String, EngineError>> {
        async move {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| EngineError::Other(e.to_string()))?;
            self.seen
                .lock()
                .unwrap()
                .push((path.to_path_buf(), bytes.clone()));

            if self.remove_staged {
                tokio::fs::remove_file(path)
                    .await
                    .map_err(|e| EngineError::Other(e.to_string()))?;
            }

            if bytes
                .windows(BROKEN_MARKER.len())
                .any(|w| w == BROKEN_MARKER)
            {
                return Err(EngineError::Other(FAKE_TRACEBACK.to_string()));
            }
            Ok(format!("# converted\n{}", String::from_utf8_lossy(&bytes)))
        }
        .boxed()
    }
}

/// Number of entries left in `dir`.
pub fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
