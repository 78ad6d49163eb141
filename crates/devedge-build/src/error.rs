//! Structured build failures.
//!
//! A failed build carries one or more [`BuildMessage`]s. The whole error
//! serializes to JSON so it can be logged verbatim.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Source position reported by the bundler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A single compiler diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildMessage {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Output file of the target that produced the message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl BuildMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            location: None,
            target: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for BuildMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}: {}", location, self.text),
            None => f.write_str(&self.text),
        }
    }
}

/// Captured failure of a build run.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{}", summary(.errors))]
pub struct BuildError {
    pub errors: Vec<BuildMessage>,
}

fn summary(errors: &[BuildMessage]) -> String {
    match errors {
        [] => "Build failed".to_string(),
        [only] => format!("Build failed: {}", only),
        [first, rest @ ..] => format!("Build failed: {} (and {} more)", first, rest.len()),
    }
}

impl BuildError {
    pub fn new(errors: Vec<BuildMessage>) -> Self {
        Self { errors }
    }

    /// Single-message error, for failures outside the compiler itself.
    pub fn message(text: impl Into<String>) -> Self {
        Self::new(vec![BuildMessage::new(text)])
    }

    /// Tag every message with the target that produced it.
    pub fn for_target(mut self, target: &str) -> Self {
        for error in &mut self.errors {
            error.target.get_or_insert_with(|| target.to_string());
        }
        self
    }

    /// Pretty JSON form of the error list, as written to the log.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.errors).unwrap_or_else(|_| format!("{:?}", self.errors))
    }
}
