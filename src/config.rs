//! Configuration loading and data folder resolution
//!
//! The config file is resolved in priority order:
//! 1. Explicit path (command-line argument)
//! 2. `PANTRYPAL_CONFIG` environment variable
//! 3. `<config_dir>/pantrypal/config.toml`
//! 4. Compiled defaults
//!
//! An explicitly named file that does not exist is an error; a missing
//! default file silently falls back to the compiled defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "PANTRYPAL_CONFIG";
pub const DATA_DIR_ENV_VAR: &str = "PANTRYPAL_DATA_DIR";

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub ollama: OllamaConfig,
    pub image: ImageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
    /// How often the file adapter looks for writes made by other processes
    pub watch_interval_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            watch_interval_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub port: u16,
    pub model: String,
    pub temperature: f32,
    pub num_predict: i32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: String::from("http://localhost"),
            port: 11434,
            model: String::from("llama3.1"),
            temperature: 0.7,
            num_predict: 2048,
        }
    }
}

/// Image generation endpoint (OpenAI-style `images/generations` API)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Leave unset to disable image generation entirely
    pub endpoint: Option<String>,
    pub model: String,
    pub size: String,
    /// Name of the environment variable holding the bearer token
    pub api_key_env: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: String::from("gpt-image-1"),
            size: String::from("1536x1024"),
            api_key_env: String::from("PANTRYPAL_IMAGE_API_KEY"),
        }
    }
}

impl ImageConfig {
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration following the documented priority order
    pub fn load(cli_path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        if let Some(path) = cli_path {
            return Self::from_file(path).map(|config| (config, ConfigSource::File(path.into())));
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            return Self::from_file(&path).map(|config| (config, ConfigSource::File(path)));
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                return Self::from_file(&path).map(|config| (config, ConfigSource::File(path)));
            }
        }

        Ok((Self::default(), ConfigSource::Defaults))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Resolve the data folder: argument, environment, config file, OS default
    pub fn resolve_data_dir(&self, cli_arg: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = cli_arg {
            return Ok(path.to_path_buf());
        }

        if let Ok(path) = std::env::var(DATA_DIR_ENV_VAR) {
            return Ok(PathBuf::from(path));
        }

        if let Some(path) = &self.storage.data_dir {
            return Ok(path.clone());
        }

        dirs::data_dir()
            .map(|dir| dir.join("pantrypal"))
            .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pantrypal").join("config.toml"))
}
