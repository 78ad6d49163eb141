//! Bundler metafile parsing and build statistics.
//!
//! The metafile follows esbuild's layout: an `inputs` map and an `outputs` map,
//! both keyed by path and carrying a `bytes` size. Any other fields are ignored.

use crate::error::BuildError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Size record for one metafile input or output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetafileEntry {
    pub bytes: u64,
}

/// Per-input and per-output sizes written by one bundler run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metafile {
    #[serde(default)]
    pub inputs: BTreeMap<String, MetafileEntry>,
    #[serde(default)]
    pub outputs: BTreeMap<String, MetafileEntry>,
}

impl Metafile {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read and parse a metafile from disk.
    pub async fn read(path: &Path) -> Result<Self, BuildError> {
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            BuildError::message(format!("Failed to read metafile {}: {}", path.display(), e))
        })?;
        Self::from_json(&json).map_err(|e| {
            BuildError::message(format!("Invalid metafile {}: {}", path.display(), e))
        })
    }

    /// Derive build statistics.
    ///
    /// Inputs whose path starts with `vendor_marker` count as third-party
    /// modules, everything else as first-party imports. Source maps are left
    /// out of both the output byte total and the output file list.
    pub fn stats(&self, vendor_marker: &str) -> BuildStats {
        let mut stats = BuildStats::default();

        for (path, entry) in &self.inputs {
            if path.starts_with(vendor_marker) {
                stats.modules += 1;
                stats.module_bytes += entry.bytes;
            } else {
                stats.imports += 1;
                stats.import_bytes += entry.bytes;
            }
        }

        for (path, entry) in &self.outputs {
            if !path.ends_with(".map") {
                stats.output_files.push(path.clone());
                stats.output_bytes += entry.bytes;
            }
        }

        stats
    }
}

/// Structural statistics for a completed build run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStats {
    /// Third-party input count
    pub modules: usize,
    pub module_bytes: u64,
    /// First-party input count
    pub imports: usize,
    pub import_bytes: u64,
    pub output_bytes: u64,
    pub output_files: Vec<String>,
}

impl BuildStats {
    /// Fold another target's statistics into this one.
    pub fn merge(&mut self, other: BuildStats) {
        self.modules += other.modules;
        self.module_bytes += other.module_bytes;
        self.imports += other.imports;
        self.import_bytes += other.import_bytes;
        self.output_bytes += other.output_bytes;
        self.output_files.extend(other.output_files);
    }
}

impl fmt::Display for BuildStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "modules: {} ({}), imports: {} ({}), outputs: {} ({})",
            self.modules,
            format_size(self.module_bytes),
            self.imports,
            format_size(self.import_bytes),
            self.output_files.join(", "),
            format_size(self.output_bytes)
        )
    }
}

/// Format a byte count with the largest fitting unit (B, KB, MB, GB).
///
/// ```
/// use devedge_build::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// assert_eq!(format_size(1_048_576), "1.00 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}
