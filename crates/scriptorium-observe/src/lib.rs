//! Observability setup for Scriptorium.

pub mod tracing_setup;
