//! Essay writing flow.
//!
//! `plan -> draft -> critique`, followed by up to `max_revisions` rounds of
//! `revise -> critique`. With zero revisions this is exactly three calls.

use std::sync::Arc;

use scriptorium_types::error::EssayError;
use scriptorium_types::essay::{EssayRequest, EssaySession};
use scriptorium_types::interaction::{InteractionKind, InteractionRecord};

use crate::dispatch::PromptDispatcher;
use crate::interaction::box_log::BoxInteractionLog;
use crate::interaction::record_best_effort;

use super::prompts::{CRITIQUE_PROMPT, DRAFT_PROMPT, PLAN_PROMPT, REVISION_PROMPT, revision_input};

/// Remote calls one essay run makes for `revisions` rounds, saturating at
/// `u32::MAX`.
pub fn model_calls(revisions: u32) -> u32 {
    revisions.saturating_mul(2).saturating_add(3)
}

pub struct EssayWriter {
    dispatcher: PromptDispatcher,
    log: Arc<BoxInteractionLog>,
    default_revisions: u32,
    revision_limit: u32,
}

impl EssayWriter {
    pub fn new(
        dispatcher: PromptDispatcher,
        log: Arc<BoxInteractionLog>,
        default_revisions: u32,
        revision_limit: u32,
    ) -> Self {
        Self {
            dispatcher,
            log,
            default_revisions: default_revisions.min(revision_limit),
            revision_limit,
        }
    }

    pub fn revision_limit(&self) -> u32 {
        self.revision_limit
    }

    pub fn default_revisions(&self) -> u32 {
        self.default_revisions
    }

    /// Check a request without contacting the model.
    pub fn validate(&self, request: &EssayRequest) -> Result<u32, EssayError> {
        if request.topic.trim().is_empty() {
            return Err(EssayError::EmptyTopic);
        }
        let revisions = request.max_revisions.unwrap_or(self.default_revisions);
        if revisions > self.revision_limit {
            return Err(EssayError::TooManyRevisions {
                requested: revisions,
                limit: self.revision_limit,
            });
        }
        Ok(revisions)
    }

    /// Run the full flow for one topic.
    #[tracing::instrument(name = "write_essay", skip_all, fields(model = %self.dispatcher.model()))]
    pub async fn write(&self, request: &EssayRequest) -> Result<EssaySession, EssayError> {
        let max_revisions = self.validate(request)?;
        let topic = request.topic.trim();
        let mut session = EssaySession::new(topic, max_revisions);
        tracing::info!(session_id = %session.id, max_revisions, "essay generation started");

        session.plan = self
            .step(&session, InteractionKind::Plan, PLAN_PROMPT, topic)
            .await?;

        let draft = self
            .step(&session, InteractionKind::Draft, DRAFT_PROMPT, &session.plan)
            .await?;
        session.push_draft(draft);

        session.critique = self
            .step(&session, InteractionKind::Critique, CRITIQUE_PROMPT, &session.draft)
            .await?;

        while session.can_revise() {
            let input = revision_input(&session.draft, &session.critique);
            let revised = self
                .step(&session, InteractionKind::Revision, REVISION_PROMPT, &input)
                .await?;
            session.push_draft(revised);
            session.revision_number += 1;

            session.critique = self
                .step(&session, InteractionKind::Critique, CRITIQUE_PROMPT, &session.draft)
                .await?;
        }

        tracing::info!(
            session_id = %session.id,
            revisions = session.revision_number,
            "essay generation finished"
        );
        Ok(session)
    }

    async fn step(
        &self,
        session: &EssaySession,
        kind: InteractionKind,
        template: &str,
        input: &str,
    ) -> Result<String, EssayError> {
        tracing::debug!(session_id = %session.id, step = %kind, "essay step");
        let output = self.dispatcher.generate(template, input).await?;
        let record = InteractionRecord::new(
            session.id,
            kind,
            format!("{template}\n{input}"),
            output.clone(),
            self.dispatcher.model(),
        );
        record_best_effort(&self.log, record).await;
        Ok(output)
    }
}
