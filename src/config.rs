//! Configuration loader and validator for the blog import/store CLI.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub import: Import,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub data_dir: String,
}

/// Import pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Import {
    /// Rows per insert batch during bulk import.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Historical hosts whose `/wp-content/uploads/` URLs get rewritten to the
    /// site-relative `/uploads/` path. Exact-match prefixes, scheme included.
    #[serde(default)]
    pub legacy_hosts: Vec<String>,
}

fn default_batch_size() -> usize {
    50
}

impl Config {
    /// Ensure required directories exist (creates `app.data_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if self.app.data_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(&self.app.data_dir)
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }
    if cfg.import.batch_size == 0 {
        return Err(ConfigError::Invalid("import.batch_size must be > 0"));
    }
    if cfg
        .import
        .legacy_hosts
        .iter()
        .any(|h| h.trim().is_empty() || h.ends_with('/'))
    {
        return Err(ConfigError::Invalid(
            "import.legacy_hosts entries must be non-empty and carry no trailing slash",
        ));
    }
    Ok(())
}

/// Example YAML configuration with the blog's two historical upload hosts.
pub fn example() -> &'static str {
    r#"app:
  data_dir: "./data"

import:
  batch_size: 50
  legacy_hosts:
    - "http://pennquinn.com"
    - "http://live-pennquinn.pantheonsite.io"
"#
}
