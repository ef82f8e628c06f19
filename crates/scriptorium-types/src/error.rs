use thiserror::Error;

use crate::llm::LlmError;

/// Errors from the essay writer.
#[derive(Debug, Error)]
pub enum EssayError {
    #[error("essay topic must not be empty")]
    EmptyTopic,

    #[error("requested {requested} revisions, limit is {limit}")]
    TooManyRevisions { requested: u32, limit: u32 },

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Errors from the research assistant.
#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("research topic must not be empty")]
    EmptyTopic,

    #[error("analyst count must be between {min} and {max}, got {requested}")]
    AnalystCountOutOfRange { requested: u32, min: u32, max: u32 },

    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("no analyst selected")]
    NoAnalystSelected,

    #[error("analyst '{0}' is not part of this research team")]
    UnknownAnalyst(String),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Errors from session lookup.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,
}

/// Errors raised while assembling configuration and credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{env_var} is missing. Set it in your environment or .env file.")]
    MissingApiKey { env_var: String },

    #[error("failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },
}

/// Errors from repository operations (used by trait definitions in scriptorium-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),
}
