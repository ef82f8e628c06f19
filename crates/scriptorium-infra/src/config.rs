//! Configuration loader for Scriptorium.
//!
//! Reads `config.toml` from the data directory (`~/.scriptorium/` by
//! default) or an explicit path, and deserializes it into [`AppConfig`].
//! Falls back to defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use scriptorium_types::config::AppConfig;
use scriptorium_types::error::ConfigError;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "SCRIPTORIUM_DATA_DIR";

/// Resolve the data directory: `SCRIPTORIUM_DATA_DIR`, then `~/.scriptorium`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".scriptorium")
}

/// Default SQLite URL for the interaction log inside the data directory.
pub fn default_database_url() -> String {
    format!(
        "sqlite://{}?mode=rwc",
        resolve_data_dir().join("interactions.db").display()
    )
}

/// Read and parse a config file.
///
/// Returns `Ok(None)` when the file does not exist.
pub async fn read_config(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    toml::from_str::<AppConfig>(&content)
        .map(Some)
        .map_err(|err| ConfigError::Parse {
            path: path.display().to_string(),
            message: err.to_string(),
        })
}

/// Result of [`load_config`].
///
/// Loading happens before the tracing subscriber exists, so problems are
/// kept here and reported through [`LoadedConfig::report`] once it does.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub path: PathBuf,
    pub fallback: Option<ConfigError>,
    found: bool,
}

impl LoadedConfig {
    /// Log where the configuration came from.
    pub fn report(&self) {
        match (&self.fallback, self.found) {
            (Some(err), _) => tracing::warn!("{err}, using defaults"),
            (None, true) => tracing::debug!("Loaded config from {}", self.path.display()),
            (None, false) => {
                tracing::debug!("No config found at {}, using defaults", self.path.display())
            }
        }
    }
}

/// Load configuration from `path`, or `{data_dir}/config.toml` when `None`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file cannot be read or parsed, returns the default and keeps the
///   error in [`LoadedConfig::fallback`].
pub async fn load_config(path: Option<&Path>) -> LoadedConfig {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => resolve_data_dir().join("config.toml"),
    };

    match read_config(&path).await {
        Ok(Some(config)) => LoadedConfig {
            config,
            path,
            fallback: None,
            found: true,
        },
        Ok(None) => LoadedConfig {
            config: AppConfig::default(),
            path,
            fallback: None,
            found: false,
        },
        Err(err) => LoadedConfig {
            config: AppConfig::default(),
            path,
            fallback: Some(err),
            found: true,
        },
    }
}
