//! RemoteEngine against a local mock conversion service.

use axum::extract::Multipart;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use docreader::{ConversionEngine, EngineError, HttpSession, RemoteEngine};
use std::time::Duration;
use tokio::net::TcpListener;

/// Replies with `{user-agent}|{file name}|{file text}`.
async fn echo(headers: HeaderMap, mut multipart: Multipart) -> Result<String, StatusCode> {
    let ua = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or_default().to_string();
            let text = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            return Ok(format!("{ua}|{name}|{text}"));
        }
    }
    Err(StatusCode::BAD_REQUEST)
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "too late"
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "converter exploded")
}

async fn mock_service() -> String {
    let app = Router::new()
        .route("/echo", post(echo))
        .route("/slow", post(slow))
        .route("/broken", post(broken));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn staged(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

#[tokio::test]
async fn uploads_file_with_session_user_agent() {
    let base = mock_service().await;
    let dir = tempfile::tempdir().unwrap();
    let path = staged(&dir, "page.html", "<h1>Hi</h1>");

    let session = HttpSession::new("UniversalDocReader/1.0", 5).unwrap();
    let engine = RemoteEngine::new(format!("{base}/echo"), session);

    let text = engine.convert(&path).await.unwrap();
    assert_eq!(text, "UniversalDocReader/1.0|page.html|<h1>Hi</h1>");
}

#[tokio::test]
async fn slow_service_times_out() {
    let base = mock_service().await;
    let dir = tempfile::tempdir().unwrap();
    let path = staged(&dir, "big.pdf", "pdf");

    let session = HttpSession::new("UniversalDocReader/1.0", 1).unwrap();
    let engine = RemoteEngine::new(format!("{base}/slow"), session);

    let err = engine.convert(&path).await.unwrap_err();
    assert!(
        matches!(err, EngineError::Timeout { secs: 1, .. }),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn error_status_carries_body() {
    let base = mock_service().await;
    let dir = tempfile::tempdir().unwrap();
    let path = staged(&dir, "sheet.xlsx", "xlsx");

    let session = HttpSession::new("UniversalDocReader/1.0", 5).unwrap();
    let engine = RemoteEngine::new(format!("{base}/broken"), session);

    match engine.convert(&path).await.unwrap_err() {
        EngineError::Status { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "converter exploded");
        }
        other => panic!("expected status error, got {other}"),
    }
}

#[tokio::test]
async fn unreadable_staged_file() {
    let session = HttpSession::new("UniversalDocReader/1.0", 5).unwrap();
    let engine = RemoteEngine::new("http://127.0.0.1:9/never", session);

    let err = engine
        .convert(std::path::Path::new("/no/such/staged.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ReadStaged { .. }));
}
