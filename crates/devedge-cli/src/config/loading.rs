use crate::config::ServerConfig;
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde::Serialize;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent.
pub const CONFIG_FILE: &str = "devedge.config.json";

/// Prefix of environment overrides (`DEVEDGE_HTTP_PORT=8080`).
pub const ENV_PREFIX: &str = "DEVEDGE_";

/// Every `ServerConfig` key. Environment variables are only read for these.
pub const FIELDS: &[&str] = &[
    "keyPath",
    "certPath",
    "root",
    "defaultDocument",
    "host",
    "httpPort",
    "httpsPort",
    "watch",
    "targets",
    "vendorMarker",
    "relayTimeoutSecs",
    "bundler",
    "debounceMs",
];

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch: Option<Vec<PathBuf>>,
}

impl ServerConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(overrides: &CliOverrides, config_path: Option<&Path>) -> Result<Self> {
        let config = Self::figment(overrides, config_path)?
            .extract::<Self>()
            .map_err(|e| ConfigError::InvalidValue {
                field: "configuration".to_string(),
                value: e.to_string(),
                hint: format!("Check {} syntax and field types", CONFIG_FILE),
            })?;

        config.validate()?;
        Ok(config)
    }

    fn figment(overrides: &CliOverrides, config_path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        // An explicit --config must exist; the default file is optional.
        let config_file = match config_path {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::NotFound(path.to_path_buf()).into());
            }
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default_path = Path::new(CONFIG_FILE);
                default_path.is_file().then(|| default_path.to_path_buf())
            }
        };

        if let Some(path) = config_file {
            tracing::debug!("Loading config from {}", path.display());
            figment = figment.merge(Json::file(path));
        }

        // DEVEDGE_HTTP_PORT -> httpPort; other DEVEDGE_* variables are not ours.
        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .filter_map(|key| {
                    let field = env_key_to_field(key.as_str());
                    FIELDS.contains(&field.as_str()).then(|| field.into())
                })
                .lowercase(false),
        );

        Ok(figment.merge(Serialized::defaults(overrides)))
    }
}

/// `HTTP_PORT` / `http_port` -> `httpPort`.
pub(crate) fn env_key_to_field(key: &str) -> String {
    let mut field = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = !field.is_empty();
        } else if upper {
            field.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            field.push(c.to_ascii_lowercase());
        }
    }
    field
}
