//! TLS setup for the HTTPS listener.
//!
//! Loads a preconfigured PEM key pair. HTTP/2 is offered through ALPN with
//! HTTP/1.1 as the fallback.

use crate::error::ServerError;
use rustls::ServerConfig as RustlsServerConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tokio_rustls::TlsAcceptor;

/// ALPN protocols in preference order.
pub const ALPN_PROTOCOLS: [&[u8]; 2] = [b"h2", b"http/1.1"];

/// Build a TLS acceptor from certificate and key files.
pub fn load_acceptor(cert_path: &Path, key_path: &Path) -> Result<TlsAcceptor, ServerError> {
    let certs = load_certs(cert_path)?;
    let key = load_key(key_path)?;

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let mut tls_config = RustlsServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| ServerError::Tls(format!("TLS config error: {}", e)))?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| ServerError::Tls(format!("TLS config error: {}", e)))?;
    tls_config.alpn_protocols = ALPN_PROTOCOLS.iter().map(|p| p.to_vec()).collect();

    Ok(TlsAcceptor::from(Arc::new(tls_config)))
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, ServerError> {
    let file = File::open(path).map_err(|e| {
        ServerError::Tls(format!("Failed to open cert file {}: {}", path.display(), e))
    })?;

    let certs = rustls_pemfile::certs(&mut BufReader::new(file))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            ServerError::Tls(format!("Failed to read certificates {}: {}", path.display(), e))
        })?;

    if certs.is_empty() {
        return Err(ServerError::Tls(format!(
            "No certificates found in {}",
            path.display()
        )));
    }
    Ok(certs)
}

fn load_key(path: &Path) -> Result<PrivateKeyDer<'static>, ServerError> {
    let file = File::open(path).map_err(|e| {
        ServerError::Tls(format!("Failed to open key file {}: {}", path.display(), e))
    })?;

    rustls_pemfile::private_key(&mut BufReader::new(file))
        .map_err(|e| {
            ServerError::Tls(format!("Failed to read private key {}: {}", path.display(), e))
        })?
        .ok_or_else(|| ServerError::Tls(format!("No private key found in {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_files() {
        let dir = TempDir::new().unwrap();
        let err = load_acceptor(&dir.path().join("https.crt"), &dir.path().join("https.key"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("Failed to open cert file"));
    }

    #[test]
    fn test_empty_pem_files() {
        let dir = TempDir::new().unwrap();
        let cert = dir.path().join("https.crt");
        let key = dir.path().join("https.key");
        std::fs::write(&cert, "").unwrap();
        std::fs::write(&key, "").unwrap();

        let err = load_certs(&cert).unwrap_err();
        assert!(err.to_string().contains("No certificates found"));

        let err = load_key(&key).unwrap_err();
        assert!(err.to_string().contains("No private key found"));
    }

    #[test]
    fn test_alpn_prefers_h2() {
        assert_eq!(ALPN_PROTOCOLS[0], b"h2");
        assert_eq!(ALPN_PROTOCOLS[1], b"http/1.1");
    }
}
