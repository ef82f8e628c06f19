//! HTTP layer: HTML form UI, JSON API, and shared plumbing.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod templates;
