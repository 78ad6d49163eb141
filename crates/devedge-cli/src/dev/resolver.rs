//! Request path to file resolution.
//!
//! Every lookup goes to the filesystem; nothing is cached. A request that
//! names a directory gets that directory's default document, one level only.
//! Whatever the request or symlinks say, the result never leaves the root.

use percent_encoding::percent_decode_str;
use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};

/// A regular file inside the root, ready to be served.
#[derive(Debug)]
pub struct ResolvedFile {
    /// Canonical path
    pub path: PathBuf,
    pub metadata: Metadata,
}

/// Map a request path to a file under `root`.
///
/// Returns `None` for anything that should be answered with 404: missing
/// entries, paths that escape the root, and directories without a default
/// document.
pub async fn resolve(root: &Path, request_path: &str, default_document: &str) -> Option<ResolvedFile> {
    let root = tokio::fs::canonicalize(root).await.ok()?;
    let relative = sanitize(request_path)?;

    let mut candidate = root.join(relative);
    // Second pass only happens for directories.
    for _ in 0..2 {
        let path = tokio::fs::canonicalize(&candidate).await.ok()?;
        if !path.starts_with(&root) {
            tracing::debug!("Refusing {} outside of root", path.display());
            return None;
        }

        let metadata = tokio::fs::metadata(&path).await.ok()?;
        if metadata.is_file() {
            return Some(ResolvedFile { path, metadata });
        }
        if !metadata.is_dir() {
            return None;
        }
        candidate = path.join(default_document);
    }

    None
}

/// Turn a raw request path into a relative filesystem path.
///
/// Strips the query string, percent-decodes, and rejects `..`, drive
/// prefixes, NUL bytes and non-UTF-8 input.
pub fn sanitize(request_path: &str) -> Option<PathBuf> {
    let path = request_path.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    if decoded.contains('\0') {
        return None;
    }

    let mut relative = PathBuf::new();
    for component in Path::new(decoded.as_ref()).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => return None,
        }
    }
    Some(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src/app")).unwrap();
        std::fs::write(dir.path().join("src/index.html"), "<html></html>").unwrap();
        std::fs::write(dir.path().join("src/app/main.js"), "export {}").unwrap();
        std::fs::write(dir.path().join("hello world.txt"), "hi").unwrap();
        dir
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("/src/index.html"), Some(PathBuf::from("src/index.html")));
        assert_eq!(sanitize("/"), Some(PathBuf::new()));
        assert_eq!(sanitize("/a/./b?x=1"), Some(PathBuf::from("a/b")));
        assert_eq!(sanitize("/hello%20world.txt"), Some(PathBuf::from("hello world.txt")));
        assert_eq!(sanitize("/../etc/passwd"), None);
        assert_eq!(sanitize("/src/%2e%2e/%2e%2e/etc/passwd"), None);
        assert_eq!(sanitize("/%00"), None);
        assert_eq!(sanitize("/%ff"), None);
    }

    #[tokio::test]
    async fn test_resolve_file() {
        let dir = fixture();
        let file = resolve(dir.path(), "/src/app/main.js", "index.html")
            .await
            .unwrap();
        assert!(file.path.ends_with("src/app/main.js"));
        assert_eq!(file.metadata.len(), 9);

        let spaced = resolve(dir.path(), "/hello%20world.txt", "index.html").await;
        assert!(spaced.is_some());
    }

    #[tokio::test]
    async fn test_directory_resolves_to_default_document() {
        let dir = fixture();
        let via_dir = resolve(dir.path(), "/", "src/index.html").await.unwrap();
        let direct = resolve(dir.path(), "/src/index.html", "src/index.html")
            .await
            .unwrap();
        assert_eq!(via_dir.path, direct.path);
    }

    #[tokio::test]
    async fn test_directory_without_default_document() {
        let dir = fixture();
        assert!(resolve(dir.path(), "/src/app", "index.html").await.is_none());
    }

    #[tokio::test]
    async fn test_default_document_resolved_once() {
        let dir = fixture();
        // default document is itself a directory: no second redirection
        std::fs::create_dir_all(dir.path().join("nested/src/index.html")).unwrap();
        assert!(resolve(dir.path(), "/nested", "src").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_and_traversal() {
        let dir = fixture();
        assert!(resolve(dir.path(), "/nope.js", "index.html").await.is_none());
        assert!(resolve(dir.path(), "/../", "index.html").await.is_none());
        assert!(
            resolve(&dir.path().join("src"), "/../hello%20world.txt", "index.html")
                .await
                .is_none()
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escaping_root() {
        let outside = TempDir::new().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "secret").unwrap();

        let dir = fixture();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();
        assert!(resolve(dir.path(), "/link/secret.txt", "index.html").await.is_none());

        // Links that stay inside the root are fine.
        std::os::unix::fs::symlink(dir.path().join("src"), dir.path().join("alias")).unwrap();
        assert!(resolve(dir.path(), "/alias/index.html", "index.html").await.is_some());
    }
}
