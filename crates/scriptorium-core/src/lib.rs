//! Generation flows and storage traits for Scriptorium.
//!
//! This crate defines the "ports" (provider and interaction log traits) that
//! the infrastructure layer implements, plus the essay and research flows
//! built on top of them. It depends only on `scriptorium-types` -- never on
//! `scriptorium-infra` or any network/database crate.

pub mod dispatch;
pub mod essay;
pub mod interaction;
pub mod llm;
pub mod research;
pub mod session;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
