//! API key resolution.
//!
//! The key is read from the process environment after loading a `.env`
//! file from the working directory, if one exists. Environment variables
//! already set take precedence over `.env` entries.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use scriptorium_types::error::ConfigError;

/// Outcome of loading a `.env` file.
///
/// `.env` is read before the tracing subscriber exists, so the outcome is
/// kept and logged through [`DotenvStatus::report`] once it does.
#[derive(Debug)]
pub enum DotenvStatus {
    Loaded(PathBuf),
    NotFound,
    Failed(String),
}

impl DotenvStatus {
    fn from_result(result: Result<PathBuf, dotenvy::Error>) -> Self {
        match result {
            Ok(path) => DotenvStatus::Loaded(path),
            Err(err) if err.not_found() => DotenvStatus::NotFound,
            Err(err) => DotenvStatus::Failed(err.to_string()),
        }
    }

    pub fn report(&self) {
        match self {
            DotenvStatus::Loaded(path) => tracing::debug!("Loaded environment from {}", path.display()),
            DotenvStatus::NotFound => {}
            DotenvStatus::Failed(err) => tracing::warn!("Failed to load .env: {err}"),
        }
    }
}

/// Load `.env` from the working directory (or a parent) into the process
/// environment. A missing file is not an error.
pub fn load_dotenv() -> DotenvStatus {
    DotenvStatus::from_result(dotenvy::dotenv())
}

/// Load a specific env file into the process environment.
pub fn load_dotenv_from(path: &Path) -> DotenvStatus {
    DotenvStatus::from_result(dotenvy::from_path(path).map(|()| path.to_path_buf()))
}

/// Look up the API key in `env_var`.
///
/// An unset, empty, or non-Unicode variable is reported as missing.
pub fn resolve_api_key(env_var: &str) -> Result<SecretString, ConfigError> {
    match std::env::var(env_var) {
        Ok(value) if !value.trim().is_empty() => Ok(SecretString::from(value)),
        _ => Err(ConfigError::MissingApiKey {
            env_var: env_var.to_string(),
        }),
    }
}
