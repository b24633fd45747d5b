//! Configuration loading.
//!
//! Sources, in increasing precedence: built-in defaults, `ragline.toml` in
//! the working directory (falling back to `~/.ragline/config.toml`), then
//! environment variables. `.env` files are honored before the environment
//! is read.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod constants;

use constants::{defaults, dot_dir, env as env_vars};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("config file {path} is not valid TOML: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RaglineConfig {
    /// Base URL of the backend, without a trailing slash.
    pub api_url: String,
    /// Per-request timeout for non-streaming calls, in seconds. Streaming
    /// calls are unbounded.
    pub request_timeout_secs: u64,
    /// How many trailing messages the chat view renders on open.
    pub history_window: usize,
}

impl Default for RaglineConfig {
    fn default() -> Self {
        Self {
            api_url: defaults::BASE_URL.to_string(),
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
            history_window: defaults::HISTORY_WINDOW,
        }
    }
}

impl RaglineConfig {
    /// Load from the standard locations with environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = match Self::find_config_file() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load a specific file, still honoring environment overrides.
    pub fn load_with_overrides(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    fn find_config_file() -> Option<PathBuf> {
        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }

        let dotted = dirs::home_dir()?
            .join(dot_dir::DIR_NAME)
            .join(dot_dir::CONFIG_FILE);
        dotted.is_file().then_some(dotted)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(env_vars::API_URL) {
            if !url.is_empty() {
                self.api_url = url;
            }
        }
        if let Ok(secs) = std::env::var(env_vars::REQUEST_TIMEOUT_SECS) {
            if let Ok(secs) = secs.parse() {
                self.request_timeout_secs = secs;
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
