//! Configuration file loading and parsing.

use crate::env::{vars, Environment};
use crate::types::CourierConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up inside the project directory.
pub const CONFIG_FILE_NAME: &str = "courier.yaml";

static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("valid env var pattern"));

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given directory.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: dir.as_ref().to_path_buf(),
        }
    }

    /// Load from `COURIER_CONFIG_PATH` if set, otherwise from
    /// `courier.yaml` in the current directory.
    pub fn from_env() -> Result<CourierConfig, ConfigError> {
        match Environment::get(vars::COURIER_CONFIG_PATH) {
            Some(path) => Self::load_file(path),
            None => Self::default().load(),
        }
    }

    /// Path of the config file this loader reads.
    pub fn config_path(&self) -> PathBuf {
        self.base_path.join(CONFIG_FILE_NAME)
    }

    /// Load `courier.yaml`, returning defaults when the file is absent.
    pub fn load(&self) -> Result<CourierConfig, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            return Ok(CourierConfig::default());
        }

        Self::load_file(config_path)
    }

    /// Load an explicit file. A missing file is an error here.
    pub fn load_file(path: impl AsRef<Path>) -> Result<CourierConfig, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let expanded = expand_env_vars(&contents)?;

        let config: CourierConfig =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        validate(&config)?;
        Ok(config)
    }

    /// Write `config` to `courier.yaml`, creating the directory if needed.
    pub fn save(&self, config: &CourierConfig) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.base_path)?;

        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        std::fs::write(self.config_path(), yaml)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}

/// Expand `${VAR}` and `${VAR:-default}`.
fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = content.to_string();

    for cap in ENV_VAR_PATTERN.captures_iter(content) {
        let var_name = &cap[1];
        let default = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) => v,
            Err(_) => match default {
                Some(d) => d.to_string(),
                None => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            },
        };

        result = result.replace(&cap[0], &value);
    }

    Ok(result)
}

fn validate(config: &CourierConfig) -> Result<(), ConfigError> {
    let invalid = |message: &str| ConfigError::ValidationError {
        message: message.to_string(),
    };

    if config.client.request_timeout_ms == 0 {
        return Err(invalid("client.request_timeout_ms must be greater than 0"));
    }
    if config.client.connect_timeout_ms == 0 {
        return Err(invalid("client.connect_timeout_ms must be greater than 0"));
    }

    let server = &config.server;
    if server.read_timeout_secs == 0
        || server.read_header_timeout_secs == 0
        || server.write_timeout_secs == 0
        || server.idle_timeout_secs == 0
    {
        return Err(invalid("server timeouts must be greater than 0"));
    }

    Ok(())
}
