//! HTTP surface tests: a real server on an ephemeral port, driven with reqwest.

mod common;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::{entries, FakeEngine, FAKE_TRACEBACK};
use docreader::{serve, AppState, Orchestrator, ReaderConfig};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;

struct TestServer {
    base: String,
    client: reqwest::Client,
    staging: TempDir,
}

async fn start(debug: bool) -> TestServer {
    let staging = tempfile::tempdir().unwrap();
    let config = ReaderConfig::builder().debug(debug).build().unwrap();
    let orchestrator = Orchestrator::new(Arc::new(FakeEngine::new())).with_temp_dir(staging.path());
    let state = AppState::new(orchestrator, config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        serve(listener, state).await.unwrap();
    });

    TestServer {
        base: format!("http://{addr}"),
        client: reqwest::Client::new(),
        staging,
    }
}

fn file(name: &str, body: &[u8]) -> Part {
    Part::bytes(body.to_vec()).file_name(name.to_string())
}

impl TestServer {
    async fn post(&self, path: &str, form: Form) -> reqwest::Response {
        self.client
            .post(format!("{}{path}", self.base))
            .multipart(form)
            .send()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn health_reports_engine() {
    let server = start(false).await;
    let body: serde_json::Value = server
        .client
        .get(format!("{}/health", server.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["engine"], "fake-engine");
}

#[tokio::test]
async fn index_serves_upload_form() {
    let server = start(false).await;
    let resp = server.client.get(&server.base).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await.unwrap();
    assert!(html.contains("Universal Document Reader"));
    assert!(html.contains("enctype=\"multipart/form-data\""));
    assert!(html.contains("Please upload a file to begin."));
}

#[tokio::test]
async fn json_batch_reports_each_document_in_order() {
    let server = start(false).await;
    let form = Form::new()
        .part("files", file("a.docx", b"alpha"))
        .part("files", file("b.xlsx", b"BROKEN"))
        .part("files", file("tool.exe", b"MZ"))
        .part("files", file("d.htm", b"<p>delta</p>"));

    let resp = server.post("/api/convert", form).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    let docs = body["documents"].as_array().unwrap();

    let statuses: Vec<&str> = docs.iter().map(|d| d["status"].as_str().unwrap()).collect();
    assert_eq!(statuses, ["converted", "failed", "rejected", "converted"]);
    assert_eq!(docs[0]["content"], "# converted\nalpha");
    assert_eq!(docs[0]["metrics"]["original_bytes"], 5);
    assert_eq!(docs[1]["kind"], "conversion");
    assert!(docs[1].get("detail").is_none());
    assert_eq!(docs[2]["filename"], "tool.exe");

    assert_eq!(entries(server.staging.path()), 0);
}

#[tokio::test]
async fn json_without_files_is_bad_request() {
    let server = start(false).await;
    let resp = server.post("/api/convert", Form::new().text("debug", "on")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn html_report_has_preview_sizes_and_downloads() {
    let server = start(false).await;
    let form = Form::new().part("files", file("My Notes.html", b"<b>hi</b>"));

    let html = server.post("/convert", form).await.text().await.unwrap();
    let content = "# converted\n<b>hi</b>";
    assert!(html.contains("Preview: My Notes.html"));
    assert!(html.contains("# converted\n&lt;b&gt;hi&lt;/b&gt;"));
    assert!(html.contains("download=\"My Notes_converted.md\""));
    assert!(html.contains("download=\"My Notes_converted.txt\""));
    assert!(html.contains(&STANDARD.encode(content)));
    assert!(html.contains("Reduction"));
}

#[tokio::test]
async fn html_failure_detail_follows_debug_toggle() {
    let server = start(false).await;

    let quiet = server
        .post("/convert", Form::new().part("files", file("bad.pdf", b"BROKEN")))
        .await
        .text()
        .await
        .unwrap();
    assert!(quiet.contains("Could not read bad.pdf. Please check the format."));
    assert!(!quiet.contains(FAKE_TRACEBACK));

    let loud = server
        .post(
            "/convert",
            Form::new()
                .part("files", file("bad.pdf", b"BROKEN"))
                .text("debug", "on"),
        )
        .await
        .text()
        .await
        .unwrap();
    assert!(loud.contains(FAKE_TRACEBACK));
}

#[tokio::test]
async fn configured_debug_shows_detail_without_toggle() {
    let server = start(true).await;
    let html = server
        .post("/convert", Form::new().part("files", file("bad.pdf", b"BROKEN")))
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains(FAKE_TRACEBACK));
}

#[tokio::test]
async fn empty_submission_renders_prompt() {
    let server = start(false).await;
    let form = Form::new().part("files", Part::bytes(Vec::new()).file_name(""));
    let resp = server.post("/convert", form).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Please upload a file to begin."));
}

#[tokio::test]
async fn download_markdown_attachment() {
    let server = start(false).await;
    let resp = server
        .post("/api/convert/md", Form::new().part("file", file("report.docx", b"body")))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()["content-type"],
        "text/markdown; charset=utf-8"
    );
    assert_eq!(
        resp.headers()["content-disposition"],
        "attachment; filename=\"report_converted.md\""
    );
    assert_eq!(resp.text().await.unwrap(), "# converted\nbody");
}

#[tokio::test]
async fn download_text_has_same_content() {
    let server = start(false).await;
    let resp = server
        .post("/api/convert/txt", Form::new().part("file", file("report.docx", b"body")))
        .await;

    assert_eq!(resp.headers()["content-type"], "text/plain; charset=utf-8");
    assert_eq!(
        resp.headers()["content-disposition"],
        "attachment; filename=\"report_converted.txt\""
    );
    assert_eq!(resp.text().await.unwrap(), "# converted\nbody");
}

#[tokio::test]
async fn download_error_statuses() {
    let server = start(false).await;

    let resp = server
        .post("/api/convert/docx", Form::new().part("file", file("a.pdf", b"x")))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = server
        .post("/api/convert/md", Form::new().part("file", file("a.exe", b"x")))
        .await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let two = Form::new()
        .part("files", file("a.pdf", b"x"))
        .part("files", file("b.pdf", b"y"));
    let resp = server.post("/api/convert/md", two).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = server
        .post("/api/convert/md", Form::new().part("file", file("c.pdf", b"BROKEN")))
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let failure: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(failure["message"], "Could not read c.pdf. Please check the format.");
    assert_eq!(failure["kind"], "conversion");
}

#[tokio::test]
async fn oversized_upload_is_refused() {
    let staging = tempfile::tempdir().unwrap();
    let config = ReaderConfig::builder().max_upload_bytes(1024).build().unwrap();
    let orchestrator = Orchestrator::new(Arc::new(FakeEngine::new())).with_temp_dir(staging.path());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        serve(listener, AppState::new(orchestrator, config)).await.unwrap();
    });

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/convert"))
        .multipart(Form::new().part("files", file("big.pdf", &[b'x'; 4096])))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
