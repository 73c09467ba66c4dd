//! Client configuration
//!
//! Configuration is a plain value handed to [`crate::rpc::RpcClient::new`].
//! It can be assembled from CLI flags, a JSON file and the environment;
//! [`ClientConfig::resolve`] applies them in that order of precedence.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Result, ShrewError};

/// Environment variable holding the endpoint URL or alias
pub const API_URL_ENV: &str = "METASHREW_API_URL";
/// Environment variable holding the Sandshrew project id
pub const PROJECT_ID_ENV: &str = "SANDSHREW_PROJECT_ID";

/// Local alkanes JSON-RPC gateway
pub const LOCAL_URL: &str = "http://localhost:18888";
/// Public Sandshrew mainnet endpoint
pub const PRODUCTION_URL: &str = "https://mainnet.sandshrew.io/v2/lasereyes";

/// Recognized endpoint aliases and the URLs they stand for
pub const ENDPOINT_ALIASES: [(&str, &str); 2] = [("local", LOCAL_URL), ("production", PRODUCTION_URL)];

/// Resolve an alias (`local`, `production`) or validate a URL
pub fn resolve_endpoint(value: &str) -> Result<String> {
    let value = value.trim();
    if let Some((_, url)) = ENDPOINT_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(value))
    {
        return Ok(url.to_string());
    }

    let url = reqwest::Url::parse(value)
        .map_err(|e| ShrewError::Config(format!("invalid endpoint '{}': {}", value, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(value.to_string()),
        scheme => Err(ShrewError::Config(format!(
            "endpoint '{}' must use http or https, not {}",
            value, scheme
        ))),
    }
}

/// Connection settings for the indexer RPC
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Endpoint URL (aliases are resolved before they land here)
    pub endpoint: String,
    /// Request timeout in seconds; the HTTP client default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Sandshrew project id. Kept for reporting only, it is never sent:
    /// requests carrying it were served less reliably.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: PRODUCTION_URL.to_string(),
            timeout_secs: None,
            project_id: None,
        }
    }
}

/// On-disk form; every field optional so a file can override only some
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Config for an alias or URL
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Self {
            endpoint: resolve_endpoint(endpoint)?,
            ..Default::default()
        })
    }

    /// Build from `METASHREW_API_URL` and `SANDSHREW_PROJECT_ID`
    pub fn from_env() -> Result<Self> {
        let mut config = match env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(&url)?,
            _ => Self::default(),
        };
        config.project_id = env::var(PROJECT_ID_ENV).ok().filter(|id| !id.is_empty());
        Ok(config)
    }

    /// Apply precedence: explicit flag, then file, then environment, then
    /// the production default
    pub fn resolve(
        endpoint_flag: Option<&str>,
        timeout_flag: Option<u64>,
        file: Option<&FileConfig>,
    ) -> Result<Self> {
        let mut config = Self::from_env()?;

        if let Some(file) = file {
            if let Some(endpoint) = &file.endpoint {
                config.endpoint = resolve_endpoint(endpoint)?;
            }
            if file.timeout_secs.is_some() {
                config.timeout_secs = file.timeout_secs;
            }
        }
        if let Some(endpoint) = endpoint_flag {
            config.endpoint = resolve_endpoint(endpoint)?;
        }
        if timeout_flag.is_some() {
            config.timeout_secs = timeout_flag;
        }

        if config.project_id.is_some() {
            warn!("{} is set but will not be sent with requests", PROJECT_ID_ENV);
        }
        debug!("Resolved RPC endpoint: {}", config.endpoint);
        Ok(config)
    }
}

/// Default config file location, `<config_dir>/shrewtrace/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("shrewtrace").join("config.json"))
}

/// Read a config file
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| ShrewError::Config(format!("failed to parse {}: {}", path.display(), e)))
}

/// Read the config file at `path`, or the default location if it exists
pub fn load_optional_file_config(path: Option<&Path>) -> Result<Option<FileConfig>> {
    match path {
        Some(path) => load_file_config(path).map(Some),
        None => match default_config_path() {
            Some(path) if path.exists() => {
                debug!("Loading config from {}", path.display());
                load_file_config(&path).map(Some)
            }
            _ => Ok(None),
        },
    }
}
