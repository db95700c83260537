//! CLI binary for docreader.
//!
//! A thin shim over the library crate: `serve` runs the web surface,
//! `convert` runs a batch from the command line.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use docreader::{
    start_server, write_artifact, AppState, ArtifactFormat, BatchProgressCallback,
    DocReaderError, DocumentFailure, DocumentOutcome, EngineBackend, Orchestrator,
    ProgressCallback, ReaderConfig, SizeMetrics, UploadedDocument,
};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a progress bar plus one log line per document.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new(total: usize) -> Arc<Self> {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        let bar = ProgressBar::new(total as u64);
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn finish(&self, total: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let failed = total.saturating_sub(success_count);
        if failed == 0 {
            eprintln!(
                "{} {} files converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files converted  ({} failed)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_document_start(&self, _index: usize, _total: usize, filename: &str) {
        self.bar.set_message(filename.to_string());
    }

    fn on_document_complete(&self, index: usize, total: usize, metrics: &SizeMetrics) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            green("✓"),
            index,
            total,
            dim(&format!(
                "{:.3} MB → {:.3} MB",
                metrics.original_mb, metrics.converted_mb
            )),
            dim(&format!("{:.1}% smaller", metrics.reduction_percent)),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, index: usize, total: usize, message: &str) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            red("✗"),
            index,
            total,
            red(message)
        ));
        self.bar.inc(1);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Web UI on http://127.0.0.1:8501
  docreader serve

  # Convert files next to their originals (writes *_converted.md and .txt)
  docreader convert report.docx slides.pptx page.html

  # Markdown only, into another directory
  docreader convert --format md -o out/ *.pdf

  # Use a conversion service instead of the local MarkItDown CLI
  docreader --engine-url http://localhost:9000/convert serve

ENGINE:
  By default each staged document is passed to `markitdown <path>` and its
  stdout is taken as the Markdown. Install it with `pip install markitdown`.

ENVIRONMENT VARIABLES:
  DOCREADER_ENGINE_CMD    Converter program (default: markitdown)
  DOCREADER_ENGINE_URL    Conversion service URL (overrides the command)
  DOCREADER_USER_AGENT    User-Agent of the engine HTTP session (--engine-url only)
  DOCREADER_TIMEOUT       Engine HTTP timeout in seconds, default 5 (--engine-url only)
  DOCREADER_TEMP_DIR      Where uploads are staged
  DOCREADER_DEBUG         Show technical error details
  RUST_LOG                tracing filter, e.g. docreader=debug
"#;

/// Convert office documents, PDFs and HTML to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "docreader",
    version,
    about = "Convert office documents, PDFs and HTML to Markdown",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    engine: EngineArgs,

    /// Show technical error details next to the polite message.
    #[arg(long, global = true, env = "DOCREADER_DEBUG")]
    debug: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCREADER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOCREADER_QUIET")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// Converter program; the staged file path is appended as its last argument.
    #[arg(long, global = true, env = "DOCREADER_ENGINE_CMD", default_value = "markitdown")]
    engine_cmd: String,

    /// Extra argument for the converter program (repeatable).
    #[arg(long = "engine-arg", global = true, allow_hyphen_values = true)]
    engine_args: Vec<String>,

    /// Conversion service URL. Takes precedence over --engine-cmd.
    #[arg(long, global = true, env = "DOCREADER_ENGINE_URL")]
    engine_url: Option<String>,

    /// User-Agent of the engine HTTP session. Only used with --engine-url.
    #[arg(long, global = true, env = "DOCREADER_USER_AGENT",
          default_value = docreader::config::DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Engine HTTP timeout in seconds. Only used with --engine-url.
    #[arg(long, global = true, env = "DOCREADER_TIMEOUT",
          default_value_t = docreader::config::DEFAULT_REQUEST_TIMEOUT_SECS)]
    timeout: u64,

    /// Directory for staged uploads.
    #[arg(long, global = true, env = "DOCREADER_TEMP_DIR")]
    temp_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web UI.
    Serve {
        /// Address to bind.
        #[arg(long, env = "DOCREADER_ADDR", default_value = "127.0.0.1:8501")]
        addr: String,

        /// Largest accepted upload body in MiB.
        #[arg(long, env = "DOCREADER_MAX_UPLOAD_MB", default_value_t = 200)]
        max_upload_mb: usize,
    },

    /// Convert files from the command line.
    Convert {
        /// Documents to convert (docx, xlsx, pptx, pdf, html, htm).
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write results here instead of next to each input.
        #[arg(short, long, env = "DOCREADER_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Which renditions to write.
        #[arg(long, value_enum, default_value = "both")]
        format: FormatArg,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Md,
    Txt,
    Both,
}

impl FormatArg {
    fn formats(self) -> &'static [ArtifactFormat] {
        match self {
            FormatArg::Md => &[ArtifactFormat::Markdown],
            FormatArg::Txt => &[ArtifactFormat::PlainText],
            FormatArg::Both => &[ArtifactFormat::Markdown, ArtifactFormat::PlainText],
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs for `convert`; `serve` keeps them.
    let show_progress = !cli.quiet && matches!(cli.command, Command::Convert { .. });
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info,tower_http=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve {
            ref addr,
            max_upload_mb,
        } => {
            let config = build_config(&cli, max_upload_mb.saturating_mul(1024 * 1024))?;
            let state = AppState::from_config(config).context("Failed to set up the engine")?;
            start_server(addr, state).await.context("Server failed")?;
        }
        Command::Convert {
            ref files,
            ref output_dir,
            format,
        } => {
            let config = build_config(&cli, docreader::config::DEFAULT_MAX_UPLOAD_BYTES)?;
            run_convert(&cli, config, files, output_dir.as_deref(), format).await?;
        }
    }

    Ok(())
}

/// Map CLI args to `ReaderConfig`.
fn build_config(cli: &Cli, max_upload_bytes: usize) -> Result<ReaderConfig> {
    let backend = match cli.engine.engine_url {
        Some(ref url) => EngineBackend::Remote { url: url.clone() },
        None => EngineBackend::Command {
            program: cli.engine.engine_cmd.clone(),
            args: cli.engine.engine_args.clone(),
        },
    };

    let mut builder = ReaderConfig::builder()
        .backend(backend)
        .user_agent(cli.engine.user_agent.clone())
        .request_timeout_secs(cli.engine.timeout)
        .debug(cli.debug)
        .max_upload_bytes(max_upload_bytes);
    if let Some(ref dir) = cli.engine.temp_dir {
        builder = builder.temp_dir(dir.clone());
    }

    builder.build().context("Invalid configuration")
}

/// What became of one input file on the command line.
#[derive(Debug)]
enum FileOutcome {
    /// Converted and every requested rendition written.
    Written(Vec<PathBuf>),
    Failed(DocumentFailure),
    Rejected,
    /// Converted, but a rendition could not be written.
    WriteFailed(DocReaderError),
}

/// Read every input, keeping unreadable ones aside instead of stopping.
async fn read_inputs(
    files: &[PathBuf],
) -> (Vec<(PathBuf, UploadedDocument)>, Vec<(PathBuf, DocReaderError)>) {
    let mut readable = Vec::with_capacity(files.len());
    let mut unreadable = Vec::new();
    for path in files {
        match docreader::upload::read_document(path).await {
            Ok(document) => readable.push((path.clone(), document)),
            Err(e) => unreadable.push((path.clone(), e)),
        }
    }
    (readable, unreadable)
}

/// `output_dir` if given, otherwise the directory holding `input`.
fn output_dir_for(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}

/// Convert `inputs` in order and write each result as soon as it is ready.
///
/// `report` sees every input exactly once. Returns how many inputs had all
/// renditions written.
async fn convert_and_write<F>(
    orchestrator: &Orchestrator,
    inputs: Vec<(PathBuf, UploadedDocument)>,
    output_dir: Option<&Path>,
    formats: &[ArtifactFormat],
    debug: bool,
    mut report: F,
) -> usize
where
    F: FnMut(&Path, FileOutcome),
{
    let (paths, documents): (Vec<PathBuf>, Vec<UploadedDocument>) = inputs.into_iter().unzip();
    let mut outcomes = orchestrator.convert_stream(documents, debug);
    let mut paths = paths.into_iter();
    let mut written_count = 0usize;

    while let Some(outcome) = outcomes.next().await {
        let Some(input) = paths.next() else { break };
        let file_outcome = match outcome {
            DocumentOutcome::Converted(result) => {
                let dir = output_dir_for(&input, output_dir);
                let mut written = Vec::with_capacity(formats.len());
                let mut error = None;
                for &format in formats {
                    match write_artifact(&result, format, &dir).await {
                        Ok(path) => written.push(path),
                        Err(e) => {
                            error = Some(e);
                            break;
                        }
                    }
                }
                match error {
                    Some(e) => FileOutcome::WriteFailed(e),
                    None => {
                        written_count += 1;
                        FileOutcome::Written(written)
                    }
                }
            }
            DocumentOutcome::Failed(failure) => FileOutcome::Failed(failure),
            DocumentOutcome::Rejected { .. } => FileOutcome::Rejected,
        };
        report(&input, file_outcome);
    }

    written_count
}

/// Convert `files`; one bad input never stops the others.
async fn run_convert(
    cli: &Cli,
    config: ReaderConfig,
    files: &[PathBuf],
    output_dir: Option<&Path>,
    format: FormatArg,
) -> Result<()> {
    let total = files.len();
    let (readable, unreadable) = read_inputs(files).await;
    for (path, e) in &unreadable {
        if !cli.quiet {
            eprintln!("  {} {}", red("✗"), red(&format!("Could not open {}", path.display())));
        }
        if config.debug {
            eprintln!("{}", dim(&format!("    Debug info: {e}")));
        }
    }

    let mut orchestrator =
        Orchestrator::from_config(&config).context("Failed to set up the engine")?;
    let progress = if cli.quiet || readable.is_empty() {
        None
    } else {
        let cb = CliProgressCallback::new(readable.len());
        orchestrator = orchestrator.with_progress(Arc::clone(&cb) as ProgressCallback);
        Some(cb)
    };

    let print = |line: String| match progress {
        Some(ref cb) => cb.bar.println(line),
        None => eprintln!("{line}"),
    };

    let converted = convert_and_write(
        &orchestrator,
        readable,
        output_dir,
        format.formats(),
        config.debug,
        |input, outcome| match outcome {
            FileOutcome::Written(paths) => {
                if !cli.quiet {
                    for path in paths {
                        print(dim(&format!("    → {}", path.display())));
                    }
                }
            }
            FileOutcome::Failed(failure) => {
                if let Some(detail) = failure.detail {
                    print(dim(&format!("    Debug info: {detail}")));
                }
            }
            FileOutcome::Rejected => {}
            FileOutcome::WriteFailed(e) => {
                print(format!(
                    "  {} {}",
                    red("✗"),
                    red(&format!("Could not save the result of {}", input.display()))
                ));
                if config.debug {
                    print(dim(&format!("    Debug info: {e}")));
                }
            }
        },
    )
    .await;

    match progress {
        Some(cb) => cb.finish(total, converted),
        None if !cli.quiet => eprintln!("{converted}/{total} files converted"),
        None => {}
    }

    if converted == 0 {
        anyhow::bail!("No documents could be converted");
    }
    Ok(())
}
