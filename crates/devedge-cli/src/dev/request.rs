//! Per-request facts used for routing decisions and request logs.

use crate::dev::client_ip::client_ip;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{HeaderMap, Method, Version, header, request::Parts};
use std::convert::Infallible;
use std::net::SocketAddr;

/// Header carrying the relay target URL.
pub const CORS_HEADER: &str = "cors";

/// What the handlers need to know about a request. Lives for one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub version: Version,
    /// Raw (still percent-encoded) path, without the query string
    pub path: String,
    pub accept_encoding: Option<String>,
    pub forwarded: Option<String>,
    pub x_forwarded_for: Option<String>,
    pub cors: Option<String>,
    pub client_ip: String,
}

impl RequestContext {
    pub fn new(
        method: Method,
        version: Version,
        path: impl Into<String>,
        headers: &HeaderMap,
        peer: Option<SocketAddr>,
    ) -> Self {
        let text = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Self {
            method,
            version,
            path: path.into(),
            accept_encoding: text(header::ACCEPT_ENCODING.as_str()),
            forwarded: text(header::FORWARDED.as_str()),
            x_forwarded_for: text("x-forwarded-for"),
            cors: text(CORS_HEADER),
            client_ip: client_ip(headers, peer),
        }
    }

    /// Whether `accept-encoding` lists the `br` token with a non-zero weight.
    pub fn accepts_brotli(&self) -> bool {
        self.accept_encoding
            .as_deref()
            .is_some_and(accepts_encoding_br)
    }

    /// `METHOD/version` prefix of request log lines, e.g. `GET/2.0`.
    pub fn protocol(&self) -> String {
        let version = match self.version {
            Version::HTTP_09 => "0.9",
            Version::HTTP_10 => "1.0",
            Version::HTTP_11 => "1.1",
            Version::HTTP_2 => "2.0",
            Version::HTTP_3 => "3.0",
            _ => "?",
        };
        format!("{}/{}", self.method, version)
    }
}

fn accepts_encoding_br(header: &str) -> bool {
    header.split(',').any(|entry| {
        let mut parts = entry.split(';');
        let coding = parts.next().unwrap_or_default().trim();
        if !coding.eq_ignore_ascii_case("br") {
            return false;
        }
        // `br;q=0` means "not acceptable"
        !parts.any(|param| {
            param
                .trim()
                .strip_prefix("q=")
                .and_then(|q| q.trim().parse::<f32>().ok())
                .is_some_and(|q| q <= 0.0)
        })
    })
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(Self::new(
            parts.method.clone(),
            parts.version,
            parts.uri.path(),
            &parts.headers,
            peer,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn context(accept_encoding: Option<&'static str>) -> RequestContext {
        let mut headers = HeaderMap::new();
        if let Some(value) = accept_encoding {
            headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static(value));
        }
        RequestContext::new(Method::GET, Version::HTTP_11, "/", &headers, None)
    }

    #[test]
    fn test_accepts_brotli() {
        assert!(context(Some("gzip, deflate, br")).accepts_brotli());
        assert!(context(Some("BR")).accepts_brotli());
        assert!(context(Some("br;q=0.5, gzip")).accepts_brotli());
        assert!(!context(Some("gzip, deflate")).accepts_brotli());
        assert!(!context(Some("br;q=0")).accepts_brotli());
        assert!(!context(Some("brotli-ish")).accepts_brotli());
        assert!(!context(None).accepts_brotli());
    }

    #[test]
    fn test_protocol_label() {
        let mut ctx = context(None);
        assert_eq!(ctx.protocol(), "GET/1.1");
        ctx.version = Version::HTTP_2;
        assert_eq!(ctx.protocol(), "GET/2.0");
    }

    #[test]
    fn test_headers_captured() {
        let mut headers = HeaderMap::new();
        headers.insert(CORS_HEADER, HeaderValue::from_static("https://api.example.com/x"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("9.9.9.9"));
        let ctx = RequestContext::new(Method::GET, Version::HTTP_2, "/cors", &headers, None);

        assert_eq!(ctx.cors.as_deref(), Some("https://api.example.com/x"));
        assert_eq!(ctx.x_forwarded_for.as_deref(), Some("9.9.9.9"));
        assert_eq!(ctx.client_ip, "9.9.9.9");
        assert!(ctx.forwarded.is_none());
    }
}
