//! SQLite storage layer.
//!
//! The interaction log backed by SQLite with WAL mode and split read/write
//! connection pools.

pub mod interaction_log;
pub mod pool;
