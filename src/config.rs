//! Configuration loading from a TOML file with environment overrides
//!
//! Both binaries share one [`Config`]; each reads the section it cares
//! about. Environment variables take precedence over the file so container
//! deployments can override without editing it.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::exec::nobel::DEFAULT_API_URL;

/// Main configuration shared by both server binaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Listener settings
    pub server: ServerConfig,
    /// File-analysis flavor settings
    pub files: FilesConfig,
    /// Aggregation flavor settings
    pub nobel: NobelConfig,
}

/// Listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host/IP to bind (default: 127.0.0.1)
    pub host: String,
    /// Port to listen on (default: 8080)
    pub port: u16,
    /// Worker threads: 1 = current-thread runtime, 0 = one per CPU core
    pub threads: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            threads: 0,
        }
    }
}

/// File-analysis flavor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Root directory searched for requested files; created if absent
    pub root_dir: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            root_dir: "root".to_string(),
        }
    }
}

/// Aggregation flavor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NobelConfig {
    /// Data Source endpoint for prize records
    pub api_url: String,
}

impl Default for NobelConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist.
///
/// Environment variables override file values: `CONTENTD_HOST`,
/// `CONTENTD_PORT`, `CONTENTD_THREADS`, `CONTENTD_ROOT_DIR`,
/// `CONTENTD_API_URL`.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let mut config = if path.exists() {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?
    } else {
        Config::default()
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Default configuration, written out when no config file exists yet
#[must_use]
pub fn create_default_config() -> Config {
    Config::default()
}

/// Load configuration, writing a default config file first when none exists
/// so operators have something concrete to edit.
pub fn load_or_create_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        let rendered = toml::to_string_pretty(&create_default_config())
            .context("rendering default config")?;
        std::fs::write(path, rendered)
            .with_context(|| format!("writing default config file {}", path.display()))?;
        tracing::info!("created default config file: {}", path.display());
    }
    load_config(path)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(host) = std::env::var("CONTENTD_HOST") {
        config.server.host = host;
    }
    if let Some(port) = env_parsed("CONTENTD_PORT") {
        config.server.port = port;
    }
    if let Some(threads) = env_parsed("CONTENTD_THREADS") {
        config.server.threads = threads;
    }
    if let Ok(root_dir) = std::env::var("CONTENTD_ROOT_DIR") {
        config.files.root_dir = root_dir;
    }
    if let Ok(api_url) = std::env::var("CONTENTD_API_URL") {
        config.nobel.api_url = api_url;
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|raw| raw.parse().ok())
}
