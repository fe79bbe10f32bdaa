// Configuration loading and parsing (squad-builder.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Default config file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "squad-builder.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Public Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    pub search: SearchConfig,
    /// Directory for the log file (the TUI owns the terminal).
    pub log_dir: String,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend serving /api/players, /api/calc and
    /// /api/squads. Trailing slashes are trimmed.
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Pause after the last keystroke before the catalog query is issued.
    pub debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: BackendConfig {
                base_url: "http://127.0.0.1:8000".to_string(),
            },
            search: SearchConfig { debounce_ms: 150 },
            log_dir: "logs".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw file structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the whole squad-builder.toml file. Every
/// section and field is optional; omissions take the defaults above.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    backend: BackendSection,
    #[serde(default)]
    search: SearchSection,
    #[serde(default)]
    log_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BackendSection {
    base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchSection {
    debounce_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load configuration from the default path. A missing file is not an
/// error: built-in defaults apply.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new(DEFAULT_CONFIG_PATH))
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        info!("no config file at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ConfigFile = toml::from_str(&text).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })?;

    let defaults = Config::default();
    let config = Config {
        backend: BackendConfig {
            base_url: file
                .backend
                .base_url
                .unwrap_or(defaults.backend.base_url)
                .trim_end_matches('/')
                .to_string(),
        },
        search: SearchConfig {
            debounce_ms: file
                .search
                .debounce_ms
                .unwrap_or(defaults.search.debounce_ms),
        },
        log_dir: file.log_dir.unwrap_or(defaults.log_dir),
    };

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let url = &config.backend.base_url;
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::ValidationError {
            field: "backend.base_url".to_string(),
            message: format!("expected an http(s) URL, got `{url}`"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
