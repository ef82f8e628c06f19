//! Essay writer: plan, draft, critique, then bounded revision rounds.

pub mod prompts;
pub mod writer;
