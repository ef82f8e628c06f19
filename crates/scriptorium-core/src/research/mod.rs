//! Research assistant: analyst personas, interviews, final report.

pub mod assistant;
pub mod prompts;
