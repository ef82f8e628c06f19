//! Instruction templates for the research assistant.

use scriptorium_types::research::Analyst;

/// Human message accompanying the analyst-generation instructions.
pub const GENERATE_ANALYSTS_MESSAGE: &str = "Generate the set of analysts.";

pub const REPORT_SYSTEM_PROMPT: &str =
    "Generate a comprehensive research report based on the interviews conducted.";

/// Sent as the report input when no interview has happened yet.
pub const EMPTY_TRANSCRIPT: &str = "No interviews have been conducted.";

/// System instruction for persona generation.
pub fn analyst_instructions(topic: &str, max_analysts: u32) -> String {
    format!(
        "You are tasked with creating a set of AI analyst personas. Follow these instructions carefully:\n\
         1. First, review the research topic: {topic}\n\
         2. Determine the most interesting themes.\n\
         3. Pick the top {max_analysts} themes.\n\
         4. Assign one analyst to each theme."
    )
}

/// System instruction placing the model in an analyst's role.
pub fn interview_system_prompt(analyst: &Analyst) -> String {
    format!(
        "You are {}, {}. Respond to questions based on your expertise and perspective.",
        analyst.name, analyst.role
    )
}
