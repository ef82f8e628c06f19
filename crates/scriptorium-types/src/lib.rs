//! Shared domain types for Scriptorium.
//!
//! This crate contains the types used across the workspace: LLM request and
//! response shapes, essay and research sessions, analyst personas,
//! interaction log records, configuration, and error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror, schemars.

pub mod config;
pub mod error;
pub mod essay;
pub mod interaction;
pub mod llm;
pub mod research;
