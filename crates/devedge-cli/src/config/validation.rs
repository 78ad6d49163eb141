use crate::config::ServerConfig;
use crate::error::{ConfigError, Result};
use std::path::{Component, Path};

impl ServerConfig {
    /// Validate configuration for logical consistency.
    pub fn validate(&self) -> Result<()> {
        validate_default_document(&self.default_document)?;

        for (field, port) in [("httpPort", self.http_port), ("httpsPort", self.https_port)] {
            if port == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: "0".to_string(),
                    hint: "Use a port between 1 and 65535".to_string(),
                }
                .into());
            }
        }

        if self.http_port == self.https_port {
            return Err(ConfigError::InvalidValue {
                field: "httpsPort".to_string(),
                value: self.https_port.to_string(),
                hint: "The HTTP and HTTPS listeners need different ports".to_string(),
            }
            .into());
        }

        if self.targets.is_empty() {
            return Err(ConfigError::MissingField {
                field: "targets".to_string(),
                hint: "Provide at least one build target".to_string(),
            }
            .into());
        }

        for (idx, target) in self.targets.iter().enumerate() {
            if target.entry_points.is_empty() {
                return Err(ConfigError::MissingField {
                    field: format!("targets[{}].entryPoints", idx),
                    hint: "Each target needs at least one entry point".to_string(),
                }
                .into());
            }
        }

        if self.relay_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "relayTimeoutSecs".to_string(),
                value: "0".to_string(),
                hint: "Relay calls need a timeout of at least one second".to_string(),
            }
            .into());
        }

        if !self.root.is_dir() {
            return Err(ConfigError::InvalidValue {
                field: "root".to_string(),
                value: self.root.display().to_string(),
                hint: "Root must be an existing directory".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// The default document is joined onto request directories, so it must stay
/// a plain relative path.
pub fn validate_default_document(document: &str) -> Result<()> {
    if document.is_empty() {
        return Err(ConfigError::MissingField {
            field: "defaultDocument".to_string(),
            hint: "Set it to a file name such as index.html".to_string(),
        }
        .into());
    }

    let plain = Path::new(document)
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !plain {
        return Err(ConfigError::InvalidValue {
            field: "defaultDocument".to_string(),
            value: document.to_string(),
            hint: "Use a relative path without '..' segments".to_string(),
        }
        .into());
    }

    Ok(())
}
