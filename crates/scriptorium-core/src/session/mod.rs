//! Per-visit session state.
//!
//! Sessions are held in memory and handed to each request handler through
//! an explicit [`store::SessionStore`] rather than ambient globals.

pub mod store;
