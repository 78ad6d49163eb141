//! Response bodies for static files.
//!
//! Files are streamed in chunks, either raw or through a brotli encoder.
//! `Content-Length` is never sent: the compressed size is unknown up front,
//! so both variants use chunked transfer (HTTP/1.1) or DATA frames (HTTP/2).
//! Dropping the body, e.g. when the client disconnects, closes the file.

use crate::dev::resolver::ResolvedFile;
use async_compression::Level;
use async_compression::tokio::bufread::BrotliEncoder;
use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use std::time::SystemTime;
use tokio::io::BufReader;
use tokio_util::io::ReaderStream;

/// Body of every 404 response.
pub const NOT_FOUND_BODY: &str = "Error 404: Not Found\n";

/// Brotli quality for compressed responses.
pub const BROTLI_QUALITY: i32 = 5;

/// Stream `file` as a 200 response.
///
/// Fails only if the file can no longer be opened.
pub async fn serve_file(
    file: &ResolvedFile,
    content_type: &'static str,
    brotli: bool,
) -> std::io::Result<Response> {
    let handle = tokio::fs::File::open(&file.path).await?;
    let reader = BufReader::new(handle);

    let mut headers = common_headers();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    if let Some(modified) = file.metadata.modified().ok().and_then(last_modified) {
        headers.insert(header::LAST_MODIFIED, modified);
    }

    let body = if brotli {
        headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("br"));
        let encoder = BrotliEncoder::with_quality(reader, Level::Precise(BROTLI_QUALITY));
        Body::from_stream(ReaderStream::new(encoder))
    } else {
        Body::from_stream(ReaderStream::new(reader))
    };

    Ok((StatusCode::OK, headers, body).into_response())
}

/// The 404 response for anything the resolver could not map.
pub fn not_found() -> Response {
    let mut headers = common_headers();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    (StatusCode::NOT_FOUND, headers, NOT_FOUND_BODY).into_response()
}

/// Headers shared by every response devedge produces.
pub fn common_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_LANGUAGE, HeaderValue::from_static("en"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers
}

/// Format a timestamp as an HTTP date (`Sun, 06 Nov 1994 08:49:37 GMT`).
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

fn last_modified(time: SystemTime) -> Option<HeaderValue> {
    HeaderValue::from_str(&http_date(time)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dev::resolver::resolve;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_http_date() {
        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777);
        assert_eq!(http_date(time), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_not_found_headers() {
        let response = not_found();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::CONTENT_ENCODING).is_none());
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
    }

    #[tokio::test]
    async fn test_serve_file_headers() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
        let file = resolve(dir.path(), "/app.js", "index.html").await.unwrap();

        let plain = serve_file(&file, "text/javascript; charset=utf-8", false)
            .await
            .unwrap();
        let headers = plain.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/javascript; charset=utf-8");
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::CONTENT_LANGUAGE], "en");
        assert!(headers.contains_key(header::LAST_MODIFIED));
        assert!(!headers.contains_key(header::CONTENT_LENGTH));
        assert!(!headers.contains_key(header::CONTENT_ENCODING));

        let compressed = serve_file(&file, "text/javascript; charset=utf-8", true)
            .await
            .unwrap();
        assert_eq!(compressed.headers()[header::CONTENT_ENCODING], "br");
        assert!(!compressed.headers().contains_key(header::CONTENT_LENGTH));
    }

    #[tokio::test]
    async fn test_brotli_body_decodes_to_source() {
        let source = "export const answer = 42;\n".repeat(200);
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("big.js"), &source).unwrap();
        let file = resolve(dir.path(), "/big.js", "index.html").await.unwrap();

        let response = serve_file(&file, "text/javascript; charset=utf-8", true)
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.len() < source.len());

        let mut decoder =
            async_compression::tokio::bufread::BrotliDecoder::new(BufReader::new(&bytes[..]));
        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded).await.unwrap();
        assert_eq!(decoded, source);
    }
}
