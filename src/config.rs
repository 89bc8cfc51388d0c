use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ApiError;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the backing API, e.g. `http://192.168.100.2:8000`.
  pub base_url: String,
  /// Request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
  DEFAULT_TIMEOUT_SECS
}

impl Config {
  /// Build a config directly from a base URL, for embedding callers.
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      api: ApiConfig {
        base_url: base_url.into(),
        timeout_secs: DEFAULT_TIMEOUT_SECS,
      },
    }
  }

  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./bursar.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/bursar/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self, ApiError> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(ApiError::Storage(format!(
          "config file not found: {}",
          p.display()
        )));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(ApiError::Storage(
        "no configuration file found; create one at ~/.config/bursar/config.yaml".into(),
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("bursar.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("bursar").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self, ApiError> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| ApiError::Storage(format!("failed to read config file {}: {}", path.display(), e)))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| ApiError::Storage(format!("failed to parse config file {}: {}", path.display(), e)))?;

    Ok(config)
  }
}
