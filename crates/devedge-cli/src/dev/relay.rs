//! CORS relay.
//!
//! `/cors` with the upstream URL in the `cors` header fetches that URL
//! server-side and returns its JSON body byte for byte. The body is only
//! checked to be JSON, never re-encoded. The caller always gets a 200: any
//! upstream problem degrades to an empty object, with the detail kept in the
//! log. There is no allow-list.

use crate::dev::transfer::common_headers;
use axum::body::Bytes;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use reqwest::Client;
use serde::de::IgnoredAny;
use std::time::Duration;

/// Result of one relayed call.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayOutcome {
    /// Upstream status, if a response arrived at all
    pub status: Option<StatusCode>,
    /// Upstream JSON as received, or `{}` on any failure
    pub body: Bytes,
}

impl RelayOutcome {
    fn degraded(status: Option<StatusCode>) -> Self {
        Self {
            status,
            body: empty_object(),
        }
    }
}

/// Build the shared upstream client. Every call is bounded by `timeout`.
pub fn client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("devedge/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// GET `url` asking for JSON.
pub async fn fetch(client: &Client, url: &str) -> RelayOutcome {
    let response = match client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("Relay request to {} failed: {}", url, e);
            return RelayOutcome::degraded(None);
        }
    };

    let status = Some(response.status());
    if !response.status().is_success() {
        return RelayOutcome::degraded(status);
    }

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!("Relay response from {} was cut short: {}", url, e);
            return RelayOutcome::degraded(status);
        }
    };

    match serde_json::from_slice::<IgnoredAny>(&body) {
        Ok(_) => RelayOutcome { status, body },
        Err(e) => {
            tracing::debug!("Relay response from {} is not JSON: {}", url, e);
            RelayOutcome::degraded(status)
        }
    }
}

/// The relay's 200 response for a JSON body.
pub fn json_response(body: Bytes) -> Response {
    let mut headers = common_headers();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    (StatusCode::OK, headers, body).into_response()
}

pub fn empty_object() -> Bytes {
    Bytes::from_static(b"{}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_degrades() {
        let client = client(Duration::from_secs(1)).unwrap();
        let outcome = fetch(&client, "not a url").await;
        assert_eq!(outcome.status, None);
        assert_eq!(outcome.body, empty_object());
    }

    #[tokio::test]
    async fn test_json_response_headers() {
        let response = json_response(Bytes::from_static(br#"{"a":1}"#));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], br#"{"a":1}"#);
    }
}
