//! Conversion engines: turn a staged document path into text.
//!
//! The parsing itself happens outside this crate. [`ConversionEngine`] is the
//! seam: the orchestrator holds an `Arc<dyn ConversionEngine>` built once at
//! startup, and tests substitute their own implementation.
//!
//! Two engines ship with the crate:
//!
//! * [`CommandEngine`]: runs a converter CLI (MarkItDown by default) with
//!   the staged path as its last argument and reads the text from stdout.
//! * [`RemoteEngine`]: uploads the staged file to a conversion service using
//!   the shared [`HttpSession`].

use crate::config::{
    EngineBackend, ReaderConfig, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
use crate::error::{DocReaderError, EngineError};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::multipart::{Form, Part};
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Longest slice of stderr or an error body kept in an [`EngineError`].
const MAX_ERROR_DETAIL: usize = 2_000;

/// Anything that can extract text from a document on disk.
///
/// Implementations must not keep per-call state: one engine serves every
/// document of every batch.
pub trait ConversionEngine: Send + Sync {
    /// Short name for logs and the page footer.
    fn name(&self) -> &str;

    /// Extract the text of the document at `path`.
    fn convert<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<String, EngineError>>;
}

/// Build the engine selected by `config.backend`.
pub fn build_engine(config: &ReaderConfig) -> Result<Arc<dyn ConversionEngine>, DocReaderError> {
    match &config.backend {
        EngineBackend::Command { program, args } => {
            let ignored = ignored_session_settings(config);
            if !ignored.is_empty() {
                warn!(
                    "{} only applies to a remote engine; '{}' runs locally and ignores it",
                    ignored.join(" and "),
                    program
                );
            }
            Ok(Arc::new(CommandEngine::new(program.clone(), args.clone())))
        }
        EngineBackend::Remote { url } => {
            let session = HttpSession::new(&config.user_agent, config.request_timeout_secs)?;
            Ok(Arc::new(RemoteEngine::new(url.clone(), session)))
        }
    }
}

/// Session settings changed from their defaults that a command backend
/// cannot honour.
fn ignored_session_settings(config: &ReaderConfig) -> Vec<&'static str> {
    let mut ignored = Vec::new();
    if !matches!(config.backend, EngineBackend::Command { .. }) {
        return ignored;
    }
    if config.user_agent != DEFAULT_USER_AGENT {
        ignored.push("user agent");
    }
    if config.request_timeout_secs != DEFAULT_REQUEST_TIMEOUT_SECS {
        ignored.push("request timeout");
    }
    ignored
}

// ── HTTP session ─────────────────────────────────────────────────────────

/// HTTP client with a fixed User-Agent and a fixed request timeout.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: reqwest::Client,
    user_agent: String,
    timeout_secs: u64,
}

impl HttpSession {
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self, DocReaderError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DocReaderError::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
            timeout_secs,
        })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}

// ── Command engine ───────────────────────────────────────────────────────

/// Runs `<program> <args…> <path>` and returns its stdout.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    async fn run(&self, path: &Path) -> Result<String, EngineError> {
        debug!("Running {} on {}", self.program, path.display());
        let output = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(EngineError::ExitStatus {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: truncate_detail(String::from_utf8_lossy(&output.stderr).trim()),
            });
        }

        Ok(String::from_utf8(output.stdout)?)
    }
}

impl ConversionEngine for CommandEngine {
    fn name(&self) -> &str {
        &self.program
    }

    fn convert<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<String, EngineError>> {
        self.run(path).boxed()
    }
}

// ── Remote engine ────────────────────────────────────────────────────────

/// Posts the staged file as multipart field `file`; the response body is the text.
#[derive(Debug, Clone)]
pub struct RemoteEngine {
    url: String,
    session: HttpSession,
}

impl RemoteEngine {
    pub fn new(url: impl Into<String>, session: HttpSession) -> Self {
        Self {
            url: url.into(),
            session,
        }
    }

    pub fn session(&self) -> &HttpSession {
        &self.session
    }

    async fn upload(&self, path: &Path) -> Result<String, EngineError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| EngineError::ReadStaged {
                path: path.to_path_buf(),
                source,
            })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        debug!("Uploading {} ({} bytes) to {}", filename, bytes.len(), self.url);

        let form = Form::new().part("file", Part::bytes(bytes).file_name(filename));
        let response = self
            .session
            .client()
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
                body: truncate_detail(body.trim()),
            });
        }

        response.text().await.map_err(|e| self.request_error(e))
    }

    fn request_error(&self, e: reqwest::Error) -> EngineError {
        if e.is_timeout() {
            EngineError::Timeout {
                url: self.url.clone(),
                secs: self.session.timeout_secs(),
            }
        } else {
            EngineError::Http {
                url: self.url.clone(),
                source: e,
            }
        }
    }
}

impl ConversionEngine for RemoteEngine {
    fn name(&self) -> &str {
        &self.url
    }

    fn convert<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<String, EngineError>> {
        self.upload(path).boxed()
    }
}

fn truncate_detail(s: &str) -> String {
    if s.len() <= MAX_ERROR_DETAIL {
        return s.to_string();
    }
    let mut end = MAX_ERROR_DETAIL;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\u{2026}", &s[..end])
}
