//! Bundler collaborator.
//!
//! The orchestrator only depends on the [`Bundler`] trait. [`EsbuildBundler`]
//! drives an `esbuild` executable; it is created once per process and reused
//! for every build run.

use crate::error::{BuildError, BuildMessage, Location};
use crate::metafile::{Metafile, MetafileEntry};
use crate::target::BuildTarget;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// External compiler contract.
///
/// Implementations write the target's output files and report the sizes of
/// what they read and wrote. Calls are never concurrent: the orchestrator
/// holds the bundler mutably for the duration of a run.
#[async_trait]
pub trait Bundler: Send {
    /// Compile one target.
    async fn bundle(&mut self, target: &BuildTarget) -> Result<Metafile, BuildError>;
}

/// [`Bundler`] backed by the `esbuild` command-line tool.
#[derive(Debug)]
pub struct EsbuildBundler {
    /// Executable name or path
    program: PathBuf,
    /// Working directory every relative target path is resolved against
    cwd: PathBuf,
    /// Version reported by the executable, cached after the first probe
    version: Option<String>,
}

impl EsbuildBundler {
    pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            cwd: cwd.into(),
            version: None,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Check that the executable runs and cache its version.
    pub async fn probe(&mut self) -> Result<&str, BuildError> {
        if self.version.is_none() {
            let output = Command::new(&self.program)
                .arg("--version")
                .current_dir(&self.cwd)
                .output()
                .await
                .map_err(|e| self.spawn_error(e))?;

            if !output.status.success() {
                return Err(BuildError::message(format!(
                    "{} --version exited with {}",
                    self.program.display(),
                    output.status
                )));
            }

            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            tracing::debug!("{} version {}", self.program.display(), version);
            self.version = Some(version);
        }

        Ok(self.version.as_deref().unwrap_or_default())
    }

    /// Command-line arguments for one target.
    pub fn args(&self, target: &BuildTarget) -> Vec<String> {
        let mut args = target.entry_points.clone();

        if target.bundle {
            args.push("--bundle".to_string());
        }
        args.push(format!("--outfile={}", target.outfile.display()));
        args.push(format!("--format={}", target.format.as_str()));
        args.push(format!("--platform={}", target.platform.as_str()));
        args.push(format!("--target={}", target.target));
        if target.sourcemap {
            args.push("--sourcemap".to_string());
        }
        if target.minify {
            args.push("--minify".to_string());
        }
        for external in &target.external {
            args.push(format!("--external:{}", external));
        }
        if let Some(ref banner) = target.banner {
            args.push(format!("--banner:js={}", banner));
        }
        if let Some(ref metafile) = target.metafile {
            args.push(format!("--metafile={}", metafile.display()));
        }
        args.push("--log-level=error".to_string());
        args.push("--color=false".to_string());

        args
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    fn spawn_error(&self, err: std::io::Error) -> BuildError {
        BuildError::message(format!(
            "Failed to start {}: {}",
            self.program.display(),
            err
        ))
    }
}

#[async_trait]
impl Bundler for EsbuildBundler {
    async fn bundle(&mut self, target: &BuildTarget) -> Result<Metafile, BuildError> {
        let output = Command::new(&self.program)
            .args(self.args(target))
            .current_dir(&self.cwd)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let mut errors = parse_diagnostics(&stderr);
            if errors.is_empty() {
                errors.push(BuildMessage::new(format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    stderr.trim()
                )));
            }
            return Err(BuildError::new(errors));
        }

        match target.metafile {
            Some(ref metafile) => Metafile::read(&self.resolve(metafile)).await,
            None => {
                // No metafile requested: report the output file alone.
                let outfile = self.resolve(&target.outfile);
                let bytes = tokio::fs::metadata(&outfile)
                    .await
                    .map(|m| m.len())
                    .map_err(|e| {
                        BuildError::message(format!(
                            "Missing output {}: {}",
                            outfile.display(),
                            e
                        ))
                    })?;

                let mut metafile = Metafile::default();
                metafile
                    .outputs
                    .insert(target.label(), MetafileEntry { bytes });
                Ok(metafile)
            }
        }
    }
}

/// Extract `[ERROR]` diagnostics from esbuild's text log output.
///
/// Each message may be followed by a `file:line:column:` line, which becomes
/// its location.
pub fn parse_diagnostics(stderr: &str) -> Vec<BuildMessage> {
    const MARKER: &str = "[ERROR] ";

    let mut errors: Vec<BuildMessage> = Vec::new();
    for line in stderr.lines() {
        if let Some(idx) = line.find(MARKER) {
            errors.push(BuildMessage::new(line[idx + MARKER.len()..].trim()));
            continue;
        }

        if let Some(current) = errors.last_mut() {
            if current.location.is_none() {
                current.location = parse_location(line.trim());
            }
        }
    }
    errors
}

fn parse_location(line: &str) -> Option<Location> {
    let rest = line.strip_suffix(':')?;
    let mut parts = rest.rsplitn(3, ':');
    let column = parts.next()?.parse().ok()?;
    let line_no = parts.next()?.parse().ok()?;
    let file = parts.next()?;
    if file.is_empty() || file.contains(char::is_whitespace) {
        return None;
    }
    Some(Location {
        file: file.to_string(),
        line: line_no,
        column,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{Format, Platform};

    #[test]
    fn test_args_for_default_target() {
        let bundler = EsbuildBundler::new("esbuild", ".");
        let args = bundler.args(&BuildTarget::default());

        assert_eq!(args[0], "src/index.js");
        assert!(args.contains(&"--bundle".to_string()));
        assert!(args.contains(&"--outfile=dist/index.js".to_string()));
        assert!(args.contains(&"--format=esm".to_string()));
        assert!(args.contains(&"--platform=browser".to_string()));
        assert!(args.contains(&"--target=es2018".to_string()));
        assert!(args.contains(&"--sourcemap".to_string()));
        assert!(args.contains(&"--external:fs".to_string()));
        assert!(args.contains(&"--metafile=dist/index.meta.json".to_string()));
        assert!(!args.contains(&"--minify".to_string()));
    }

    #[test]
    fn test_args_optional_flags() {
        let bundler = EsbuildBundler::new("esbuild", ".");
        let target = BuildTarget {
            entry_points: vec!["a.js".to_string(), "b.js".to_string()],
            format: Format::Iife,
            platform: Platform::Node,
            bundle: false,
            sourcemap: false,
            minify: true,
            external: vec![],
            banner: Some("/* hi */".to_string()),
            metafile: None,
            ..BuildTarget::default()
        };
        let args = bundler.args(&target);

        assert_eq!(&args[..2], &["a.js", "b.js"]);
        assert!(!args.contains(&"--bundle".to_string()));
        assert!(!args.contains(&"--sourcemap".to_string()));
        assert!(args.contains(&"--minify".to_string()));
        assert!(args.contains(&"--format=iife".to_string()));
        assert!(args.contains(&"--banner:js=/* hi */".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--metafile")));
    }

    #[test]
    fn test_parse_diagnostics_with_locations() {
        let stderr = "✘ [ERROR] Could not resolve \"./missing\"\n\
                      \n\
                      \x20   src/index.js:3:18:\n\
                      \x20     3 │ import x from './missing';\n\
                      \x20       ╵                   ~~~~~~~~~~~\n\
                      \n\
                      ✘ [ERROR] Expected \";\" but found \"}\"\n\
                      \n\
                      \x20   src/util.js:10:2:\n\
                      \n\
                      2 errors\n";

        let errors = parse_diagnostics(stderr);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].text, "Could not resolve \"./missing\"");
        assert_eq!(
            errors[0].location,
            Some(Location {
                file: "src/index.js".to_string(),
                line: 3,
                column: 18,
            })
        );
        assert_eq!(errors[1].location.as_ref().unwrap().file, "src/util.js");
    }

    #[test]
    fn test_parse_diagnostics_without_errors() {
        assert!(parse_diagnostics("some unrelated warning\n").is_empty());
    }

    #[tokio::test]
    async fn test_missing_executable_is_build_error() {
        let mut bundler = EsbuildBundler::new("devedge-no-such-bundler", ".");
        let err = bundler.bundle(&BuildTarget::default()).await.unwrap_err();
        assert!(err.errors[0].text.starts_with("Failed to start"));

        assert!(bundler.probe().await.is_err());
    }
}
