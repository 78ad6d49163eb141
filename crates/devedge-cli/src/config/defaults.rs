use devedge_build::BuildTarget;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

pub fn default_key_path() -> PathBuf {
    PathBuf::from("server/https.key")
}

pub fn default_cert_path() -> PathBuf {
    PathBuf::from("server/https.crt")
}

pub fn default_root() -> PathBuf {
    PathBuf::from(".")
}

pub fn default_document() -> String {
    "src/index.html".to_string()
}

pub fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

pub fn default_http_port() -> u16 {
    10040
}

pub fn default_https_port() -> u16 {
    10041
}

pub fn default_watch() -> Vec<PathBuf> {
    vec![PathBuf::from("package.json"), PathBuf::from("src")]
}

pub fn default_targets() -> Vec<BuildTarget> {
    vec![BuildTarget::default()]
}

pub fn default_vendor_marker() -> String {
    "node_modules".to_string()
}

pub fn default_relay_timeout_secs() -> u64 {
    30
}

pub fn default_bundler() -> PathBuf {
    PathBuf::from("esbuild")
}
