//! Server-rendered HTML for the upload page and the conversion report.
//!
//! Downloads are embedded in the page as base64 `data:` URIs, so nothing has
//! to outlive the request that produced it.

use super::AppState;
use crate::output::{BatchReport, ConversionResult, DocumentFailure, DocumentOutcome};
use crate::upload;
use base64::{engine::general_purpose::STANDARD, Engine as _};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 64rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
h1 { margin-bottom: .25rem; }
.info, .error, .warning { padding: .75rem 1rem; border-radius: .4rem; margin: 1rem 0; }
.info { background: #e8f1fb; }
.error { background: #fdecea; }
.warning { background: #fff4e5; }
details { border: 1px solid #ddd; border-radius: .4rem; margin: 1rem 0; padding: .5rem 1rem; }
summary { font-weight: 600; cursor: pointer; }
textarea { width: 100%; height: 300px; font-family: ui-monospace, monospace; }
table.sizes td { padding: .2rem 1rem .2rem 0; }
.downloads a { display: inline-block; margin-right: 1rem; }
pre.detail { white-space: pre-wrap; font-size: .85rem; }
footer { margin-top: 3rem; color: #777; font-size: .85rem; border-top: 1px solid #eee; padding-top: .5rem; }
"#;

/// Upload page, with an optional notice above the form.
pub(crate) fn index(state: &AppState, notice: Option<&str>) -> String {
    let mut body = upload_form(state);
    body.push_str(&format!(
        "<p class=\"info\">{}</p>\n",
        escape_html(notice.unwrap_or("Please upload a file to begin."))
    ));
    layout(state, &body)
}

/// Upload form followed by one section per document of `report`.
pub(crate) fn report(state: &AppState, report: &BatchReport, debug: bool) -> String {
    let mut body = upload_form(state);
    for outcome in &report.documents {
        match outcome {
            DocumentOutcome::Converted(result) => body.push_str(&converted_section(result)),
            DocumentOutcome::Failed(failure) => body.push_str(&failure_section(failure, debug)),
            DocumentOutcome::Rejected { filename } => body.push_str(&format!(
                "<p class=\"warning\">{} is not a supported file type. Allowed: {}.</p>\n",
                escape_html(filename),
                upload::ALLOWED_EXTENSIONS.join(", ")
            )),
        }
    }
    layout(state, &body)
}

fn layout(state: &AppState, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>Universal Document Reader</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
<h1>Universal Document Reader</h1>\n\
<p>Upload any Office document, PDF, or HTML file to convert it into clean Markdown text.</p>\n\
{body}\
<footer>Powered by {} &amp; docreader</footer>\n</body>\n</html>\n",
        escape_html(state.orchestrator.engine().name())
    )
}

fn upload_form(state: &AppState) -> String {
    format!(
        "<form method=\"post\" action=\"/convert\" enctype=\"multipart/form-data\">\n\
<input type=\"file\" name=\"{}\" multiple accept=\"{}\">\n\
<label><input type=\"checkbox\" name=\"{}\"{}> Show debug details</label>\n\
<button type=\"submit\">Convert</button>\n</form>\n",
        super::FILES_FIELD,
        upload::accept_attribute(),
        super::DEBUG_FIELD,
        if state.config.debug { " checked" } else { "" },
    )
}

/// HTML parsing drops one newline right after `<textarea>`, so one is
/// emitted there to keep the content's own leading newlines.
fn converted_section(result: &ConversionResult) -> String {
    let name = escape_html(&result.filename);
    let m = &result.metrics;
    let links: String = result
        .artifacts()
        .iter()
        .map(|a| {
            format!(
                "<a download=\"{}\" href=\"{}\">Download as .{}</a>",
                escape_html(&a.filename),
                data_uri(&a.media_type, &a.content),
                a.filename.rsplit('.').next().unwrap_or_default()
            )
        })
        .collect();

    format!(
        "<details open>\n<summary>Preview: {name}</summary>\n\
<textarea readonly aria-label=\"Extracted content of {name}\">\n{}</textarea>\n\
<table class=\"sizes\">\n\
<tr><td>Original</td><td>{:.3} MB</td></tr>\n\
<tr><td>Converted</td><td>{:.3} MB</td></tr>\n\
<tr><td>Reduction</td><td>{:.1}%</td></tr>\n</table>\n\
<p class=\"downloads\">{links}</p>\n</details>\n",
        escape_html(&result.content),
        m.original_mb,
        m.converted_mb,
        m.reduction_percent,
    )
}

fn failure_section(failure: &DocumentFailure, debug: bool) -> String {
    let mut html = format!("<div class=\"error\">\u{26a0}\u{fe0f} {}", escape_html(&failure.message));
    if debug {
        if let Some(ref detail) = failure.detail {
            html.push_str(&format!(
                "\n<pre class=\"detail\">Debug info ({}): {}</pre>",
                failure.kind,
                escape_html(detail)
            ));
        }
    }
    html.push_str("</div>\n");
    html
}

fn data_uri(media_type: &str, content: &str) -> String {
    format!(
        "data:{media_type};charset=utf-8;base64,{}",
        STANDARD.encode(content.as_bytes())
    )
}

/// Escape text for HTML element content and double-quoted attributes.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
