//! Research assistant operations.
//!
//! Each operation is a single remote call. Interview turns are answered in
//! isolation unless `carry_history` is enabled, in which case earlier turns
//! with the same analyst are replayed as conversation context.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use scriptorium_types::error::ResearchError;
use scriptorium_types::interaction::{InteractionKind, InteractionRecord};
use scriptorium_types::llm::Message;
use scriptorium_types::research::{
    Analyst, InterviewTurn, MAX_ANALYSTS, MIN_ANALYSTS, Perspectives, ResearchSession,
};

use crate::dispatch::PromptDispatcher;
use crate::interaction::box_log::BoxInteractionLog;
use crate::interaction::record_best_effort;

use super::prompts::{
    EMPTY_TRANSCRIPT, GENERATE_ANALYSTS_MESSAGE, REPORT_SYSTEM_PROMPT, analyst_instructions,
    interview_system_prompt,
};

pub struct ResearchAssistant {
    dispatcher: PromptDispatcher,
    log: Arc<BoxInteractionLog>,
    carry_history: bool,
}

impl ResearchAssistant {
    pub fn new(dispatcher: PromptDispatcher, log: Arc<BoxInteractionLog>, carry_history: bool) -> Self {
        Self {
            dispatcher,
            log,
            carry_history,
        }
    }

    /// Check a team request without contacting the model.
    pub fn validate_team_request(topic: &str, max_analysts: u32) -> Result<(), ResearchError> {
        if topic.trim().is_empty() {
            return Err(ResearchError::EmptyTopic);
        }
        if !(MIN_ANALYSTS..=MAX_ANALYSTS).contains(&max_analysts) {
            return Err(ResearchError::AnalystCountOutOfRange {
                requested: max_analysts,
                min: MIN_ANALYSTS,
                max: MAX_ANALYSTS,
            });
        }
        Ok(())
    }

    /// Ask the model for up to `max_analysts` personas.
    ///
    /// The returned list is whatever the model produced: its length is not
    /// checked against `max_analysts` and names are not deduplicated.
    #[tracing::instrument(name = "generate_analysts", skip(self, topic), fields(model = %self.dispatcher.model()))]
    pub async fn generate_analysts(
        &self,
        session_id: Uuid,
        topic: &str,
        max_analysts: u32,
    ) -> Result<Vec<Analyst>, ResearchError> {
        Self::validate_team_request(topic, max_analysts)?;
        let system = analyst_instructions(topic.trim(), max_analysts);

        let perspectives: Perspectives = self
            .dispatcher
            .generate_structured(&system, GENERATE_ANALYSTS_MESSAGE)
            .await?;

        if perspectives.analysts.len() != max_analysts as usize {
            tracing::debug!(
                requested = max_analysts,
                returned = perspectives.analysts.len(),
                "model returned a different number of analysts"
            );
        }

        let response = match serde_json::to_string(&perspectives) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize analysts for the interaction log");
                format!("{:?}", perspectives.analysts)
            }
        };
        self.record(session_id, InteractionKind::Analysts, &system, GENERATE_ANALYSTS_MESSAGE, response)
            .await;
        Ok(perspectives.analysts)
    }

    /// Ask one question of an analyst.
    ///
    /// `analyst_name` picks the analyst explicitly; `None` uses the
    /// session's current selection. The session is not modified; the caller
    /// records the returned turn.
    #[tracing::instrument(name = "interview", skip(self, session, question), fields(session_id = %session.id))]
    pub async fn interview(
        &self,
        session: &ResearchSession,
        analyst_name: Option<&str>,
        question: &str,
    ) -> Result<InterviewTurn, ResearchError> {
        let analyst = match analyst_name {
            Some(name) => session
                .find_analyst(name)
                .ok_or_else(|| ResearchError::UnknownAnalyst(name.to_string()))?,
            None => session.current().ok_or(ResearchError::NoAnalystSelected)?,
        };
        let question = question.trim();
        if question.is_empty() {
            return Err(ResearchError::EmptyQuestion);
        }

        let system = interview_system_prompt(analyst);
        let mut messages = Vec::new();
        if self.carry_history {
            for turn in session.turns_with(&analyst.name) {
                messages.push(Message::user(turn.question.clone()));
                messages.push(Message::assistant(turn.answer.clone()));
            }
        }
        messages.push(Message::user(question));

        let answer = self
            .dispatcher
            .generate_conversation(&system, messages)
            .await?;

        self.record(session.id, InteractionKind::Interview, &system, question, answer.clone())
            .await;

        Ok(InterviewTurn {
            analyst_name: analyst.name.clone(),
            question: question.to_string(),
            answer,
            asked_at: Utc::now(),
        })
    }

    /// Produce the final report from the interview transcript.
    #[tracing::instrument(name = "final_report", skip(self, session), fields(session_id = %session.id))]
    pub async fn final_report(&self, session: &ResearchSession) -> Result<String, ResearchError> {
        let transcript = session.transcript();
        let input = if transcript.is_empty() {
            EMPTY_TRANSCRIPT.to_string()
        } else {
            transcript
        };

        let report = self
            .dispatcher
            .generate_with_system(REPORT_SYSTEM_PROMPT, &input)
            .await?;

        self.record(session.id, InteractionKind::Report, REPORT_SYSTEM_PROMPT, &input, report.clone())
            .await;
        Ok(report)
    }

    async fn record(&self, session_id: Uuid, kind: InteractionKind, system: &str, human: &str, response: String) {
        let record = InteractionRecord::new(
            session_id,
            kind,
            format!("{system}\n\n{human}"),
            response,
            self.dispatcher.model(),
        );
        record_best_effort(&self.log, record).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::memory::MemoryInteractionLog;
    use crate::llm::box_provider::BoxLlmProvider;
    use crate::testing::{RequestLog, ScriptedProvider};
    use scriptorium_types::llm::MessageRole;

    const TWO_ANALYSTS: &str = r#"{"analysts":[
        {"affiliation":"Mayo Clinic","name":"Dr. Lena Ortiz","role":"Clinical AI lead","description":"Diagnostics"},
        {"affiliation":"EFF","name":"Sam Reyes","role":"Privacy advocate","description":"Patient data"}
    ]}"#;

    fn assistant(provider: ScriptedProvider, carry_history: bool) -> (ResearchAssistant, RequestLog, Arc<BoxInteractionLog>) {
        let requests = provider.requests();
        let log = Arc::new(BoxInteractionLog::new(MemoryInteractionLog::new()));
        let dispatcher = PromptDispatcher::new(Arc::new(BoxLlmProvider::new(provider)), "gemma2-9b-it", 512);
        (ResearchAssistant::new(dispatcher, Arc::clone(&log), carry_history), requests, log)
    }

    fn analyst(name: &str, role: &str) -> Analyst {
        Analyst {
            affiliation: "Lab".to_string(),
            name: name.to_string(),
            role: role.to_string(),
            description: "Focus".to_string(),
        }
    }

    fn team() -> ResearchSession {
        ResearchSession::new(
            "AI in healthcare",
            vec![analyst("Dr. Lena Ortiz", "Clinical AI lead"), analyst("Sam Reyes", "Privacy advocate")],
        )
    }

    #[tokio::test]
    async fn test_generate_analysts_sends_instructions() {
        let (assistant, requests, _) = assistant(ScriptedProvider::new([TWO_ANALYSTS]), false);
        let analysts = assistant
            .generate_analysts(Uuid::now_v7(), "AI in healthcare", 2)
            .await
            .unwrap();
        assert_eq!(analysts.len(), 2);
        assert_eq!(analysts[1].name, "Sam Reyes");

        let sent = requests.lock().unwrap();
        let system = sent[0].system.as_deref().unwrap();
        assert!(system.contains("research topic: AI in healthcare"));
        assert!(system.contains("top 2 themes"));
        assert_eq!(sent[0].messages[0].content, GENERATE_ANALYSTS_MESSAGE);
        assert!(sent[0].output_config.is_some());
    }

    #[tokio::test]
    async fn test_analysts_record_holds_returned_team() {
        let (assistant, _, log) = assistant(ScriptedProvider::new([TWO_ANALYSTS]), false);
        let id = Uuid::now_v7();
        assistant.generate_analysts(id, "AI in healthcare", 2).await.unwrap();

        let records = log.list(&id).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, InteractionKind::Analysts);
        let logged: Perspectives = serde_json::from_str(&records[0].response).unwrap();
        assert_eq!(logged.analysts.len(), 2);
        assert_eq!(logged.analysts[0].name, "Dr. Lena Ortiz");
    }

    #[tokio::test]
    async fn test_returned_count_is_not_enforced() {
        let (assistant, _, _) = assistant(ScriptedProvider::new([TWO_ANALYSTS]), false);
        let analysts = assistant
            .generate_analysts(Uuid::now_v7(), "AI in healthcare", 5)
            .await
            .unwrap();
        assert_eq!(analysts.len(), 2);
    }

    #[tokio::test]
    async fn test_team_request_validation_makes_no_calls() {
        let (assistant, requests, _) = assistant(ScriptedProvider::new([TWO_ANALYSTS]), false);
        let id = Uuid::now_v7();
        assert!(matches!(
            assistant.generate_analysts(id, "  ", 3).await,
            Err(ResearchError::EmptyTopic)
        ));
        assert!(matches!(
            assistant.generate_analysts(id, "topic", 0).await,
            Err(ResearchError::AnalystCountOutOfRange { requested: 0, .. })
        ));
        assert!(matches!(
            assistant.generate_analysts(id, "topic", 6).await,
            Err(ResearchError::AnalystCountOutOfRange { requested: 6, .. })
        ));
        assert!(requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_structured_output_is_an_error() {
        let (assistant, _, _) = assistant(ScriptedProvider::new(["not json"]), false);
        let err = assistant
            .generate_analysts(Uuid::now_v7(), "topic", 3)
            .await
            .unwrap_err();
        assert!(matches!(err, ResearchError::Llm(_)));
    }

    #[tokio::test]
    async fn test_interview_prompt_contains_name_and_role() {
        let (assistant, requests, _) = assistant(ScriptedProvider::new(["An answer"]), false);
        let session = team();
        let turn = assistant
            .interview(&session, Some("Sam Reyes"), "Who owns the data?")
            .await
            .unwrap();

        assert_eq!(turn.analyst_name, "Sam Reyes");
        assert_eq!(turn.answer, "An answer");

        let sent = requests.lock().unwrap();
        let system = sent[0].system.as_deref().unwrap();
        assert!(system.contains("Sam Reyes"));
        assert!(system.contains("Privacy advocate"));
        assert_eq!(sent[0].messages.len(), 1);
        assert_eq!(sent[0].messages[0].content, "Who owns the data?");
    }

    #[tokio::test]
    async fn test_interview_defaults_to_current_selection() {
        let (assistant, requests, _) = assistant(ScriptedProvider::new(["ok"]), false);
        let mut session = team();
        session.select_analyst("Sam Reyes");
        let turn = assistant.interview(&session, None, "Q").await.unwrap();
        assert_eq!(turn.analyst_name, "Sam Reyes");
        assert!(requests.lock().unwrap()[0].system.as_deref().unwrap().contains("Sam Reyes"));
    }

    #[tokio::test]
    async fn test_interview_does_not_replay_history_by_default() {
        let (assistant, requests, _) = assistant(ScriptedProvider::new(["first", "second"]), false);
        let mut session = team();
        let turn = assistant.interview(&session, None, "Q1").await.unwrap();
        session.record_turn(turn);
        assistant.interview(&session, None, "Q2").await.unwrap();

        let sent = requests.lock().unwrap();
        assert_eq!(sent[1].messages.len(), 1);
        assert_eq!(sent[1].messages[0].content, "Q2");
    }

    #[tokio::test]
    async fn test_carry_history_replays_same_analyst_turns_only() {
        let (assistant, requests, _) = assistant(ScriptedProvider::new(["a1", "b1", "a2"]), true);
        let mut session = team();
        let t1 = assistant.interview(&session, Some("Dr. Lena Ortiz"), "Q1").await.unwrap();
        session.record_turn(t1);
        let t2 = assistant.interview(&session, Some("Sam Reyes"), "Q2").await.unwrap();
        session.record_turn(t2);
        assistant.interview(&session, Some("Dr. Lena Ortiz"), "Q3").await.unwrap();

        let sent = requests.lock().unwrap();
        let contents: Vec<(&MessageRole, &str)> = sent[2]
            .messages
            .iter()
            .map(|m| (&m.role, m.content.as_str()))
            .collect();
        assert_eq!(
            contents,
            vec![
                (&MessageRole::User, "Q1"),
                (&MessageRole::Assistant, "a1"),
                (&MessageRole::User, "Q3"),
            ]
        );
    }

    #[tokio::test]
    async fn test_interview_rejects_bad_input_without_calls() {
        let (assistant, requests, _) = assistant(ScriptedProvider::new(["x"]), false);
        let session = team();
        assert!(matches!(
            assistant.interview(&session, Some("Nobody"), "Q").await,
            Err(ResearchError::UnknownAnalyst(name)) if name == "Nobody"
        ));
        assert!(matches!(
            assistant.interview(&session, None, "   ").await,
            Err(ResearchError::EmptyQuestion)
        ));

        let empty = ResearchSession::new("topic", vec![]);
        assert!(matches!(
            assistant.interview(&empty, None, "Q").await,
            Err(ResearchError::NoAnalystSelected)
        ));
        assert!(requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_final_report_sends_transcript() {
        let (assistant, requests, log) = assistant(ScriptedProvider::new(["# Report"]), false);
        let mut session = team();
        session.record_turn(InterviewTurn {
            analyst_name: "Sam Reyes".to_string(),
            question: "Risks?".to_string(),
            answer: "Leaks.".to_string(),
            asked_at: Utc::now(),
        });

        let report = assistant.final_report(&session).await.unwrap();
        assert_eq!(report, "# Report");

        {
            let sent = requests.lock().unwrap();
            assert_eq!(sent[0].system.as_deref(), Some(REPORT_SYSTEM_PROMPT));
            assert_eq!(sent[0].messages[0].content, "You: Risks?\nSam Reyes: Leaks.\n");
        }

        let records = log.list(&session.id).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, InteractionKind::Report);
    }

    #[tokio::test]
    async fn test_final_report_without_interviews() {
        let (assistant, requests, _) = assistant(ScriptedProvider::new(["empty report"]), false);
        assistant.final_report(&team()).await.unwrap();
        assert_eq!(requests.lock().unwrap()[0].messages[0].content, EMPTY_TRANSCRIPT);
    }
}
