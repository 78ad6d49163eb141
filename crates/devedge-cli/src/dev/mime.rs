//! Content types by file extension.

use std::path::Path;

/// Served for any extension missing from [`MIME_TABLE`].
pub const FALLBACK: &str = "application/octet-stream";

/// Lowercase extension (with dot) to content type.
pub const MIME_TABLE: &[(&str, &str)] = &[
    (".html", "text/html; charset=utf-8"),
    (".js", "text/javascript; charset=utf-8"),
    (".css", "text/css; charset=utf-8"),
    (".json", "application/json; charset=utf-8"),
    (".png", "image/png"),
    (".jpg", "image/jpg"),
    (".gif", "image/gif"),
    (".ico", "image/x-icon"),
    (".svg", "image/svg+xml"),
    (".wav", "audio/wav"),
    (".mp4", "video/mp4"),
    (".woff", "font/woff"),
    (".woff2", "font/woff2"),
    (".ttf", "font/ttf"),
    (".wasm", "application/wasm"),
];

/// Content type for a file, matched case-insensitively on its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return FALLBACK;
    };
    let ext = format!(".{}", ext.to_ascii_lowercase());

    MIME_TABLE
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, content_type)| *content_type)
        .unwrap_or(FALLBACK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(
            content_type_for(Path::new("src/index.html")),
            "text/html; charset=utf-8"
        );
        assert_eq!(
            content_type_for(Path::new("dist/index.js")),
            "text/javascript; charset=utf-8"
        );
        assert_eq!(content_type_for(Path::new("model.wasm")), "application/wasm");
    }

    #[test]
    fn test_extension_case_insensitive() {
        assert_eq!(content_type_for(Path::new("LOGO.PNG")), "image/png");
    }

    #[test]
    fn test_fallback() {
        assert_eq!(content_type_for(Path::new("README")), FALLBACK);
        assert_eq!(content_type_for(Path::new("index.js.map")), FALLBACK);
        assert_eq!(content_type_for(Path::new(".html")), FALLBACK);
    }
}
