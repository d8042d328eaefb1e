use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::errors::{constants::*, Result, VoxError};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_synthesis_timeout")]
    pub synthesis_timeout_secs: u64,
    #[serde(default = "default_voices_timeout")]
    pub voices_timeout_secs: u64,
    pub otel_http_url: Option<String>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_synthesis_timeout() -> u64 {
    SYNTHESIS_TIMEOUT_SECS
}

fn default_voices_timeout() -> u64 {
    VOICES_TIMEOUT_SECS
}

impl Config {
    /// Load the config file when present, otherwise fall back to `VOX_*` environment variables.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let config = std::fs::read_to_string(path)?;
            Ok(toml::from_str::<Config>(&config)?)
        } else {
            Self::from_env()
        }
    }

    pub fn from_env() -> Result<Self> {
        let base_url = required_var(ENV_BASE_URL)?;
        let api_key = required_var(ENV_API_KEY)?;
        let data_dir = env::var(ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir());
        let synthesis_timeout_secs =
            numeric_var(ENV_SYNTHESIS_TIMEOUT_SECS)?.unwrap_or(SYNTHESIS_TIMEOUT_SECS);
        let voices_timeout_secs =
            numeric_var(ENV_VOICES_TIMEOUT_SECS)?.unwrap_or(VOICES_TIMEOUT_SECS);
        let otel_http_url = env::var(ENV_OTEL_HTTP_URL).ok();

        Ok(Config {
            base_url,
            api_key,
            data_dir,
            synthesis_timeout_secs,
            voices_timeout_secs,
            otel_http_url,
        })
    }

    pub fn presets_path(&self) -> PathBuf {
        self.data_dir.join(PRESETS_FILE_NAME)
    }

    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }

    pub fn voices_timeout(&self) -> Duration {
        Duration::from_secs(self.voices_timeout_secs)
    }
}

fn required_var(name: &str) -> Result<String> {
    env::var(name).map_err(|_| VoxError::missing_env_var(name))
}

fn numeric_var(name: &str) -> Result<Option<u64>> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| VoxError::config(format!("{} must be a number: {}", name, e))),
        Err(_) => Ok(None),
    }
}
