//! Request handlers for the web surface.

use super::{page, AppState};
use crate::output::{ArtifactFormat, DocumentFailure};
use crate::upload::{self, UploadedDocument};
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use tracing::{debug, info};

/// Multipart field carrying documents. `file` is accepted as an alias.
pub const FILES_FIELD: &str = "files";
/// Multipart field carrying the debug toggle.
pub const DEBUG_FIELD: &str = "debug";

/// Parsed upload form.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub documents: Vec<UploadedDocument>,
    pub debug: bool,
}

/// Health check.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "engine": state.orchestrator.engine().name(),
    }))
}

/// Upload page.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(page::index(&state, None))
}

/// Convert uploads and render previews, size comparisons and download links.
pub async fn convert_page(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, (StatusCode, String)> {
    let form = read_upload_form(multipart).await?;
    if form.documents.is_empty() {
        return Ok(Html(page::index(&state, Some("Please upload a file to begin."))));
    }

    let debug = form.debug || state.config.debug;
    let report = state.orchestrator.convert_batch(&form.documents, debug).await;
    Ok(Html(page::report(&state, &report, debug)))
}

/// Convert uploads and return the batch report as JSON.
pub async fn convert_json(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, (StatusCode, String)> {
    let form = read_upload_form(multipart).await?;
    if form.documents.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "No files uploaded".to_string()));
    }

    let debug = form.debug || state.config.debug;
    let report = state.orchestrator.convert_batch(&form.documents, debug).await;
    Ok(Json(report).into_response())
}

/// Convert a single upload and return one artifact as an attachment.
pub async fn convert_download(
    State(state): State<AppState>,
    Path(format): Path<String>,
    multipart: Multipart,
) -> Result<Response, (StatusCode, String)> {
    let format: ArtifactFormat = format
        .parse()
        .map_err(|e: String| (StatusCode::BAD_REQUEST, e))?;
    let form = read_upload_form(multipart).await?;

    let document = match form.documents.as_slice() {
        [document] => document,
        docs => {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Expected exactly one file, got {}", docs.len()),
            ))
        }
    };

    if !document.is_allowed() {
        return Err((
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!(
                "{} is not a supported file type (allowed: {})",
                document.filename,
                upload::ALLOWED_EXTENSIONS.join(", ")
            ),
        ));
    }

    let debug = form.debug || state.config.debug;
    match state.orchestrator.convert_document(document).await {
        Ok(result) => {
            let artifact = result.artifact(format);
            info!("Serving {} ({} bytes)", artifact.filename, artifact.content.len());
            Ok((
                StatusCode::OK,
                [
                    (
                        header::CONTENT_TYPE,
                        format!("{}; charset=utf-8", artifact.media_type),
                    ),
                    (
                        header::CONTENT_DISPOSITION,
                        content_disposition(&artifact.filename),
                    ),
                ],
                artifact.content,
            )
                .into_response())
        }
        Err(e) => {
            let failure = DocumentFailure::from_error(&e, debug);
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(failure)).into_response())
        }
    }
}

/// Collect every uploaded file and the debug toggle from a multipart body.
///
/// An empty file part (a file input submitted with nothing chosen) is skipped.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, (StatusCode, String)> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (e.status(), e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FILES_FIELD | "file" => {
                let filename = field
                    .file_name()
                    .map(upload::file_name)
                    .unwrap_or_default()
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| (e.status(), e.body_text()))?;
                if filename.is_empty() {
                    if bytes.is_empty() {
                        continue;
                    }
                    return Err((
                        StatusCode::BAD_REQUEST,
                        "File part is missing a filename".to_string(),
                    ));
                }
                debug!("Received {} ({} bytes)", filename, bytes.len());
                form.documents
                    .push(UploadedDocument::new(filename, bytes.to_vec()));
            }
            DEBUG_FIELD => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| (e.status(), e.body_text()))?;
                form.debug = matches!(
                    value.trim().to_ascii_lowercase().as_str(),
                    "on" | "true" | "1" | "yes"
                );
            }
            _ => {}
        }
    }

    Ok(form)
}

/// `attachment; filename="…"` with characters unsafe in a quoted header value replaced.
fn content_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}
