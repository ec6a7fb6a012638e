//! GET /download/{session_id}/{filename}: stream a stored track
//!
//! Supports a single `Range: bytes=...` request so browsers can seek.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::io::SeekFrom;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::{
    error::{ApiError, ApiResult},
    AppState,
};

/// Build download routes
pub fn download_routes() -> Router<AppState> {
    Router::new().route("/download/:session_id/:filename", get(download))
}

/// GET /download/{session_id}/{filename}
///
/// 404 for anything that does not resolve to a file inside the session.
pub async fn download(
    State(state): State<AppState>,
    Path((session_id, filename)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let artifact = state
        .store
        .resolve(&session_id, &filename)
        .await
        .map_err(|_| ApiError::NotFound("File does not exist".to_string()))?;

    let len = artifact.len;
    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .map(|v| parse_single_range(v, len));

    let (status, start, end) = match range {
        Some(Some((s, e))) => (StatusCode::PARTIAL_CONTENT, s, e),
        Some(None) => {
            return Ok((
                StatusCode::RANGE_NOT_SATISFIABLE,
                [(header::CONTENT_RANGE, format!("bytes */{}", len))],
            )
                .into_response());
        }
        None => (StatusCode::OK, 0, len.saturating_sub(1)),
    };

    let to_send = if len == 0 { 0 } else { end - start + 1 };

    let mut out_headers = HeaderMap::new();
    out_headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));
    out_headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    out_headers.insert(header::CONTENT_DISPOSITION, HeaderValue::from_static("inline"));
    out_headers.insert(header::CONTENT_LENGTH, HeaderValue::from(to_send));
    if status == StatusCode::PARTIAL_CONTENT {
        let content_range = format!("bytes {}-{}/{}", start, end, len);
        if let Ok(value) = HeaderValue::from_str(&content_range) {
            out_headers.insert(header::CONTENT_RANGE, value);
        }
    }

    let mut file = artifact.file;
    if start > 0 {
        file.seek(SeekFrom::Start(start))
            .await
            .map_err(|e| ApiError::Internal(format!("Seek failed: {}", e)))?;
    }

    let stream = ReaderStream::new(file.take(to_send));

    Ok((status, out_headers, Body::from_stream(stream)).into_response())
}

/// Parse `bytes=start-end`, `bytes=start-` or `bytes=-suffix` against `len`.
///
/// Multi-range requests and unsatisfiable ranges return `None`.
fn parse_single_range(header: &str, len: u64) -> Option<(u64, u64)> {
    let lower = header.trim().to_ascii_lowercase();
    let rest = lower.strip_prefix("bytes=")?;
    if rest.contains(',') || len == 0 {
        return None;
    }

    let (a, b) = rest.split_once('-')?;
    let (a, b) = (a.trim(), b.trim());
    let last = len - 1;

    if a.is_empty() {
        // suffix range: "-N"
        let suffix: u64 = b.parse().ok()?;
        if suffix == 0 {
            return None;
        }
        return Some((len.saturating_sub(suffix), last));
    }

    let start: u64 = a.parse().ok()?;
    if start > last {
        return None;
    }

    let end = if b.is_empty() {
        last
    } else {
        b.parse::<u64>().ok()?.min(last)
    };

    (start <= end).then_some((start, end))
}
