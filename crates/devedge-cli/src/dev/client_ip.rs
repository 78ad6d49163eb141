//! Originating client address.
//!
//! Proxies report the original client in `forwarded` (RFC 7239) or
//! `x-forwarded-for`. The address is only used for logging.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Shown when no header or peer address is available.
pub const UNKNOWN: &str = "unknown";

/// Resolve the client address.
///
/// Order: the `for=` token of `forwarded`, then the first entry of
/// `x-forwarded-for`, then the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("forwarded")
        .and_then(|v| v.to_str().ok())
        .and_then(forwarded_for);
    if let Some(ip) = forwarded {
        return ip;
    }

    let x_forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = x_forwarded_for {
        return ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// First `for=` node of a `forwarded` header, without quotes or port.
///
/// Accepts `for=1.2.3.4`, `for="1.2.3.4:80"` and `for="[::1]:80"`.
pub fn forwarded_for(header: &str) -> Option<String> {
    let node = header
        .split([',', ';'])
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("for"))
        .map(|(_, value)| value.trim().trim_matches('"'))?;

    if node.is_empty() {
        return None;
    }

    // [v6] or [v6]:port
    if let Some(rest) = node.strip_prefix('[') {
        return rest.split_once(']').map(|(ip, _)| ip.to_string());
    }

    if let Ok(addr) = node.parse::<SocketAddr>() {
        return Some(addr.ip().to_string());
    }
    if let Ok(ip) = node.parse::<IpAddr>() {
        return Some(ip.to_string());
    }

    // v4:port, or an obfuscated identifier such as `_hidden`
    match node.split_once(':') {
        Some((host, _)) if host.parse::<IpAddr>().is_ok() => Some(host.to_string()),
        _ => Some(node.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_forwarded_forms() {
        assert_eq!(forwarded_for("for=1.2.3.4").as_deref(), Some("1.2.3.4"));
        assert_eq!(
            forwarded_for("for=\"1.2.3.4:80\"").as_deref(),
            Some("1.2.3.4")
        );
        assert_eq!(forwarded_for("for=\"[::1]:80\"").as_deref(), Some("::1"));
        assert_eq!(
            forwarded_for("proto=https; For=\"[2001:db8::17]\"; by=10.0.0.1").as_deref(),
            Some("2001:db8::17")
        );
        assert_eq!(
            forwarded_for("for=10.0.0.1, for=10.0.0.2").as_deref(),
            Some("10.0.0.1")
        );
        assert_eq!(forwarded_for("proto=https"), None);
        assert_eq!(forwarded_for("for=\"\""), None);
    }

    #[test]
    fn test_precedence() {
        let peer: SocketAddr = "192.168.1.5:50000".parse().unwrap();

        let all = headers(&[
            ("forwarded", "for=1.1.1.1"),
            ("x-forwarded-for", "2.2.2.2, 3.3.3.3"),
        ]);
        assert_eq!(client_ip(&all, Some(peer)), "1.1.1.1");

        let xff = headers(&[("x-forwarded-for", "2.2.2.2, 3.3.3.3")]);
        assert_eq!(client_ip(&xff, Some(peer)), "2.2.2.2");

        assert_eq!(client_ip(&HeaderMap::new(), Some(peer)), "192.168.1.5");
        assert_eq!(client_ip(&HeaderMap::new(), None), UNKNOWN);
    }

    #[test]
    fn test_forwarded_without_for_falls_through() {
        let map = headers(&[("forwarded", "proto=https"), ("x-forwarded-for", "4.4.4.4")]);
        assert_eq!(client_ip(&map, None), "4.4.4.4");
    }
}
