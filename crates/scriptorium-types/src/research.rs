//! Research assistant types: analyst personas, interview turns, sessions.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest analyst count the research form accepts.
pub const MIN_ANALYSTS: u32 = 1;
/// Largest analyst count the research form accepts.
pub const MAX_ANALYSTS: u32 = 5;

/// A simulated analyst persona produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Analyst {
    /// Primary affiliation of the analyst.
    pub affiliation: String,
    /// Name of the analyst.
    pub name: String,
    /// Role of the analyst in the context of the topic.
    pub role: String,
    /// Description of the analyst focus, concerns, and motives.
    pub description: String,
}

impl Analyst {
    /// Multi-line persona summary.
    pub fn persona(&self) -> String {
        format!(
            "Name: {}\nRole: {}\nAffiliation: {}\nDescription: {}\n",
            self.name, self.role, self.affiliation, self.description
        )
    }
}

/// Structured output shape requested from the model.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Perspectives {
    /// Comprehensive list of analysts with their roles and affiliations.
    pub analysts: Vec<Analyst>,
}

/// One question/answer exchange with an analyst.
///
/// `analyst_name` is fixed at the time of asking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewTurn {
    pub analyst_name: String,
    pub question: String,
    pub answer: String,
    pub asked_at: DateTime<Utc>,
}

/// Request to generate a research team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalystRequest {
    pub topic: String,
    #[serde(default = "default_analyst_count")]
    pub max_analysts: u32,
}

fn default_analyst_count() -> u32 {
    3
}

/// Request to interview one analyst.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewRequest {
    /// Analyst to address; `None` keeps the current selection.
    #[serde(default)]
    pub analyst: Option<String>,
    pub question: String,
}

/// Per-visit research state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchSession {
    pub id: Uuid,
    pub topic: String,
    pub analysts: Vec<Analyst>,
    /// Index into `analysts`.
    pub current_analyst: Option<usize>,
    pub interview_history: Vec<InterviewTurn>,
    pub final_report: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ResearchSession {
    /// Create a session around a freshly generated team. The first analyst,
    /// if any, starts out selected.
    pub fn new(topic: impl Into<String>, analysts: Vec<Analyst>) -> Self {
        let current_analyst = if analysts.is_empty() { None } else { Some(0) };
        Self {
            id: Uuid::now_v7(),
            topic: topic.into(),
            analysts,
            current_analyst,
            interview_history: Vec::new(),
            final_report: None,
            created_at: Utc::now(),
        }
    }

    /// Replace the research team, discarding history and report.
    pub fn replace_analysts(&mut self, topic: impl Into<String>, analysts: Vec<Analyst>) {
        self.topic = topic.into();
        self.current_analyst = if analysts.is_empty() { None } else { Some(0) };
        self.analysts = analysts;
        self.interview_history.clear();
        self.final_report = None;
    }

    /// Select the first analyst with the given name. Returns `false` (and
    /// leaves the selection alone) when no analyst matches.
    pub fn select_analyst(&mut self, name: &str) -> bool {
        match self.analysts.iter().position(|a| a.name == name) {
            Some(index) => {
                self.current_analyst = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn current(&self) -> Option<&Analyst> {
        self.current_analyst.and_then(|i| self.analysts.get(i))
    }

    pub fn find_analyst(&self, name: &str) -> Option<&Analyst> {
        self.analysts.iter().find(|a| a.name == name)
    }

    pub fn record_turn(&mut self, turn: InterviewTurn) {
        self.interview_history.push(turn);
    }

    /// Turns answered by the named analyst, oldest first.
    pub fn turns_with<'a>(&'a self, analyst_name: &'a str) -> impl Iterator<Item = &'a InterviewTurn> {
        self.interview_history
            .iter()
            .filter(move |t| t.analyst_name == analyst_name)
    }

    /// Render the history as a plain transcript, one line per message.
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for turn in &self.interview_history {
            out.push_str(&format!("You: {}\n", turn.question));
            out.push_str(&format!("{}: {}\n", turn.analyst_name, turn.answer));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyst(name: &str, role: &str) -> Analyst {
        Analyst {
            affiliation: "Institute".to_string(),
            name: name.to_string(),
            role: role.to_string(),
            description: "Focus".to_string(),
        }
    }

    fn turn(analyst_name: &str, question: &str) -> InterviewTurn {
        InterviewTurn {
            analyst_name: analyst_name.to_string(),
            question: question.to_string(),
            answer: format!("answer to {question}"),
            asked_at: Utc::now(),
        }
    }

    #[test]
    fn test_persona_format() {
        let a = analyst("Dr. Ada", "Clinical lead");
        assert_eq!(
            a.persona(),
            "Name: Dr. Ada\nRole: Clinical lead\nAffiliation: Institute\nDescription: Focus\n"
        );
    }

    #[test]
    fn test_new_selects_first_analyst() {
        let session = ResearchSession::new("ai", vec![analyst("A", "r1"), analyst("B", "r2")]);
        assert_eq!(session.current().unwrap().name, "A");

        let empty = ResearchSession::new("ai", vec![]);
        assert!(empty.current().is_none());
    }

    #[test]
    fn test_select_unknown_analyst_keeps_selection() {
        let mut session = ResearchSession::new("ai", vec![analyst("A", "r1"), analyst("B", "r2")]);
        assert!(session.select_analyst("B"));
        assert!(!session.select_analyst("Z"));
        assert_eq!(session.current().unwrap().name, "B");
    }

    #[test]
    fn test_reselecting_does_not_mutate_history() {
        let mut session = ResearchSession::new("ai", vec![analyst("A", "r1"), analyst("B", "r2")]);
        session.record_turn(turn("A", "q1"));
        let before = session.interview_history.clone();

        session.select_analyst("B");
        session.select_analyst("A");

        assert_eq!(session.interview_history, before);
        assert_eq!(session.interview_history[0].analyst_name, "A");
    }

    #[test]
    fn test_replace_analysts_clears_history_and_report() {
        let mut session = ResearchSession::new("ai", vec![analyst("A", "r1")]);
        session.record_turn(turn("A", "q1"));
        session.final_report = Some("report".to_string());

        session.replace_analysts("climate", vec![analyst("C", "r3")]);
        assert_eq!(session.topic, "climate");
        assert!(session.interview_history.is_empty());
        assert!(session.final_report.is_none());
        assert_eq!(session.current().unwrap().name, "C");
    }

    #[test]
    fn test_transcript_labels_each_turn_with_its_analyst() {
        let mut session = ResearchSession::new("ai", vec![analyst("A", "r1"), analyst("B", "r2")]);
        session.record_turn(turn("A", "q1"));
        session.record_turn(turn("B", "q2"));
        let transcript = session.transcript();
        assert_eq!(
            transcript,
            "You: q1\nA: answer to q1\nYou: q2\nB: answer to q2\n"
        );
    }

    #[test]
    fn test_turns_with_filters_by_analyst() {
        let mut session = ResearchSession::new("ai", vec![analyst("A", "r1"), analyst("B", "r2")]);
        session.record_turn(turn("A", "q1"));
        session.record_turn(turn("B", "q2"));
        session.record_turn(turn("A", "q3"));
        let questions: Vec<&str> = session.turns_with("A").map(|t| t.question.as_str()).collect();
        assert_eq!(questions, vec!["q1", "q3"]);
    }

    #[test]
    fn test_perspectives_schema_lists_analyst_fields() {
        let schema = schemars::schema_for!(Perspectives);
        let json = serde_json::to_string(&schema).unwrap();
        for field in ["affiliation", "name", "role", "description", "analysts"] {
            assert!(json.contains(field), "schema missing {field}");
        }
    }

    #[test]
    fn test_analyst_request_default_count() {
        let req: AnalystRequest = serde_json::from_str(r#"{"topic":"ai"}"#).unwrap();
        assert_eq!(req.max_analysts, 3);
    }
}
