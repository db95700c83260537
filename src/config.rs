//! Configuration types for document conversion.
//!
//! Everything the orchestrator, the engine and the web surface need is held
//! in [`ReaderConfig`], built via its [`ReaderConfigBuilder`]. The config is
//! constructed once at startup and handed to [`crate::pipeline::engine::build_engine`]
//! and [`crate::server::AppState`]; nothing reads ambient globals.

use crate::error::DocReaderError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// User-Agent sent by the engine's HTTP session.
pub const DEFAULT_USER_AGENT: &str = "UniversalDocReader/1.0";

/// Timeout of the engine's HTTP session, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Converter program used by the default [`EngineBackend::Command`].
pub const DEFAULT_ENGINE_PROGRAM: &str = "markitdown";

/// Largest accepted upload body, in bytes (200 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

/// Configuration for the document reader.
///
/// # Example
/// ```rust
/// use docreader::{EngineBackend, ReaderConfig};
///
/// let config = ReaderConfig::builder()
///     .request_timeout_secs(10)
///     .backend(EngineBackend::Remote { url: "http://localhost:9000/convert".into() })
///     .build()
///     .unwrap();
/// assert_eq!(config.request_timeout_secs, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Fixed User-Agent header of the engine HTTP session.
    pub user_agent: String,

    /// Fixed timeout of the engine HTTP session. Default: 5.
    ///
    /// Bounds outbound requests only. A local converter process is not
    /// time-limited.
    pub request_timeout_secs: u64,

    /// Which conversion engine to build.
    pub backend: EngineBackend,

    /// Directory for staged files. `None` uses the system temp dir.
    pub temp_dir: Option<PathBuf>,

    /// Default state of the debug toggle. Default: false.
    pub debug: bool,

    /// Upload body limit for the web surface. Default: 200 MiB.
    pub max_upload_bytes: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            backend: EngineBackend::default(),
            temp_dir: None,
            debug: false,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ReaderConfig {
    /// Create a new builder for `ReaderConfig`.
    pub fn builder() -> ReaderConfigBuilder {
        ReaderConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ReaderConfig`].
#[derive(Debug)]
pub struct ReaderConfigBuilder {
    config: ReaderConfig,
}

impl ReaderConfigBuilder {
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn backend(mut self, backend: EngineBackend) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(dir.into());
        self
    }

    pub fn debug(mut self, v: bool) -> Self {
        self.config.debug = v;
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReaderConfig, DocReaderError> {
        let c = &self.config;
        if c.user_agent.trim().is_empty() {
            return Err(DocReaderError::InvalidConfig(
                "User-Agent must not be empty".into(),
            ));
        }
        if c.request_timeout_secs == 0 {
            return Err(DocReaderError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        if c.max_upload_bytes == 0 {
            return Err(DocReaderError::InvalidConfig(
                "Upload limit must be ≥ 1 byte".into(),
            ));
        }
        match &c.backend {
            EngineBackend::Command { program, .. } if program.trim().is_empty() => {
                return Err(DocReaderError::InvalidConfig(
                    "Engine command must not be empty".into(),
                ));
            }
            EngineBackend::Remote { url }
                if !(url.starts_with("http://") || url.starts_with("https://")) =>
            {
                return Err(DocReaderError::InvalidConfig(format!(
                    "Engine URL must be http:// or https://, got '{url}'"
                )));
            }
            _ => {}
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Where the text extraction actually happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineBackend {
    /// Run a converter CLI: `<program> <args…> <staged path>`; stdout is the text.
    Command { program: String, args: Vec<String> },
    /// POST the staged file as multipart field `file`; the body is the text.
    Remote { url: String },
}

impl Default for EngineBackend {
    fn default() -> Self {
        EngineBackend::Command {
            program: DEFAULT_ENGINE_PROGRAM.to_string(),
            args: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ReaderConfig::default();
        assert_eq!(c.user_agent, "UniversalDocReader/1.0");
        assert_eq!(c.request_timeout_secs, 5);
        assert!(!c.debug);
        assert_eq!(c.max_upload_bytes, 200 * 1024 * 1024);
        assert_eq!(
            c.backend,
            EngineBackend::Command {
                program: "markitdown".into(),
                args: vec![]
            }
        );
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = ReaderConfig::builder()
            .request_timeout_secs(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, DocReaderError::InvalidConfig(_)));
    }

    #[test]
    fn remote_url_must_be_http() {
        let err = ReaderConfig::builder()
            .backend(EngineBackend::Remote {
                url: "ftp://example.com".into(),
            })
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("ftp://example.com"));
    }

    #[test]
    fn empty_command_rejected() {
        let result = ReaderConfig::builder()
            .backend(EngineBackend::Command {
                program: "  ".into(),
                args: vec![],
            })
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn backend_serialises_tagged() {
        let json = serde_json::to_value(EngineBackend::Remote {
            url: "http://h/convert".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "remote");
        assert_eq!(json["url"], "http://h/convert");
    }
}
