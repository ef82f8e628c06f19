//! Fixed instruction templates for the essay writer.

pub const PLAN_PROMPT: &str = "You are an expert writer tasked with writing a high-level outline of an essay.\nWrite an outline for the given topic. Provide relevant notes or instructions for each section.";

pub const DRAFT_PROMPT: &str =
    "Using the provided outline, write a full essay draft. Ensure clear structure and coherence.";

pub const CRITIQUE_PROMPT: &str =
    "Review the draft and provide constructive feedback on clarity, coherence, and structure.";

pub const REVISION_PROMPT: &str =
    "Revise the essay based on critique and improve its overall quality.";

/// Input for a revision call: the current draft and the critique of it.
pub fn revision_input(draft: &str, critique: &str) -> String {
    format!("Draft:\n{draft}\n\nCritique:\n{critique}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_input_contains_both_parts() {
        let input = revision_input("the essay", "too short");
        assert_eq!(input, "Draft:\nthe essay\n\nCritique:\ntoo short");
    }
}
