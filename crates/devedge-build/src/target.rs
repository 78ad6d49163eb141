//! Build target description.
//!
//! A [`BuildTarget`] is one compilation unit handed to the bundler. A build run
//! compiles every configured target in order.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output module format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Esm,
    Cjs,
    Iife,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Esm => "esm",
            Format::Cjs => "cjs",
            Format::Iife => "iife",
        }
    }
}

/// Target platform environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Browser,
    Node,
    Neutral,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Browser => "browser",
            Platform::Node => "node",
            Platform::Neutral => "neutral",
        }
    }
}

/// One compilation unit.
///
/// Paths are relative to the bundler's working directory unless absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildTarget {
    /// Entry points (e.g. `["src/index.js"]`)
    pub entry_points: Vec<String>,

    /// Output file
    pub outfile: PathBuf,

    #[serde(default = "default_format")]
    pub format: Format,

    #[serde(default = "default_platform")]
    pub platform: Platform,

    /// Language target passed through to the bundler (e.g. `es2018`)
    #[serde(default = "default_language_target")]
    pub target: String,

    #[serde(default = "default_true")]
    pub bundle: bool,

    #[serde(default = "default_true")]
    pub sourcemap: bool,

    #[serde(default)]
    pub minify: bool,

    /// Modules left as runtime imports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external: Vec<String>,

    /// Comment prepended to the JavaScript output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,

    /// Where the bundler writes its input/output size metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metafile: Option<PathBuf>,
}

impl Default for BuildTarget {
    fn default() -> Self {
        Self {
            entry_points: vec!["src/index.js".to_string()],
            outfile: PathBuf::from("dist/index.js"),
            format: default_format(),
            platform: default_platform(),
            target: default_language_target(),
            bundle: true,
            sourcemap: true,
            minify: false,
            external: ["fs", "buffer", "util", "os"]
                .into_iter()
                .map(String::from)
                .collect(),
            banner: None,
            metafile: Some(PathBuf::from("dist/index.meta.json")),
        }
    }
}

impl BuildTarget {
    /// Short label for logs: the output file.
    pub fn label(&self) -> String {
        self.outfile.display().to_string()
    }
}

fn default_format() -> Format {
    Format::Esm
}

fn default_platform() -> Platform {
    Platform::Browser
}

fn default_language_target() -> String {
    "es2018".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_target_uses_defaults() {
        let target: BuildTarget = serde_json::from_str(
            r#"{ "entryPoints": ["src/app.js"], "outfile": "dist/app.js" }"#,
        )
        .unwrap();

        assert_eq!(target.format, Format::Esm);
        assert_eq!(target.platform, Platform::Browser);
        assert_eq!(target.target, "es2018");
        assert!(target.bundle && target.sourcemap);
        assert!(target.metafile.is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<BuildTarget, _> = serde_json::from_str(
            r#"{ "entryPoints": ["a.js"], "outfile": "b.js", "treeshake": true }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_enum_serialization() {
        assert_eq!(serde_json::to_string(&Format::Iife).unwrap(), "\"iife\"");
        assert_eq!(serde_json::to_string(&Platform::Node).unwrap(), "\"node\"");
    }
}
