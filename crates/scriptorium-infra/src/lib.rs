//! Infrastructure layer for Scriptorium.
//!
//! Contains implementations of the traits defined in `scriptorium-core`:
//! the OpenAI-compatible LLM provider (Groq by default), the SQLite
//! interaction log, configuration loading, and API key resolution.

pub mod config;
pub mod credentials;
pub mod llm;
pub mod sqlite;
