use crate::{
    download::Downloader,
    error::DownloadError,
    models::{
        DownloadRequest, DownloadState, ValidateRequest, MSG_BUSY, MSG_FILE_MISSING,
        MSG_INVALID_URL, STATUS_STARTED,
    },
    quality::Quality,
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::path::Path;
use tokio_util::io::ReaderStream;
use tower_http::trace::TraceLayer;

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub fn router(downloader: Downloader) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(|| async { "ok" }))
        .route("/api/validate_url", post(validate_url))
        .route("/api/download", post(start_download))
        .route("/api/status", get(status))
        .route("/api/download_file", get(download_file))
        .route("/api/reset", get(reset))
        .layer(TraceLayer::new_for_http())
        .with_state(downloader)
}

pub async fn serve(bind_addr: String, downloader: Downloader) -> Result<()> {
    let app = router(downloader);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("bind {bind_addr}"))?;
    tracing::info!("API server listening on {}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn validate_url(
    State(downloader): State<Downloader>,
    Json(payload): Json<ValidateRequest>,
) -> Json<Value> {
    if !downloader.validate_url(&payload.url) {
        return Json(json!({ "valid": false, "error": MSG_INVALID_URL }));
    }
    let info = downloader.video_info(&payload.url).await;
    Json(json!({ "valid": true, "video_info": info }))
}

async fn start_download(
    State(downloader): State<Downloader>,
    Json(payload): Json<DownloadRequest>,
) -> Json<Value> {
    let quality = Quality::parse(&payload.quality);
    match downloader.start(payload.url, quality).await {
        Ok(_) => Json(json!({ "success": true, "message": STATUS_STARTED })),
        Err(err) => {
            let message = match err {
                DownloadError::Busy => MSG_BUSY.to_string(),
                DownloadError::InvalidUrl => MSG_INVALID_URL.to_string(),
                other => other.status_message(),
            };
            Json(json!({ "success": false, "error": message }))
        }
    }
}

async fn status(State(downloader): State<Downloader>) -> Json<DownloadState> {
    Json(downloader.status().await)
}

async fn download_file(State(downloader): State<Downloader>) -> Response {
    let Some(path) = downloader.downloaded_file().await else {
        return file_missing();
    };
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(err) => {
            tracing::warn!(path = %path.display(), "cannot serve download: {err}");
            return file_missing();
        }
    };
    let len = file.metadata().await.map(|m| m.len()).ok();

    let mut response = (
        [
            (header::CONTENT_TYPE, "video/mp4".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&path)),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response();
    if let Some(len) = len {
        response
            .headers_mut()
            .insert(header::CONTENT_LENGTH, header::HeaderValue::from(len));
    }
    response
}

async fn reset(State(downloader): State<Downloader>) -> Json<Value> {
    downloader.reset().await;
    Json(json!({ "success": true }))
}

fn file_missing() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": MSG_FILE_MISSING }))).into_response()
}

/// `attachment` header carrying an ASCII fallback plus the RFC 5987 UTF-8 name;
/// video titles are rarely plain ASCII.
fn content_disposition(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_string());
    let fallback: String = name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let mut encoded = String::with_capacity(name.len() * 3);
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
