//! Essay writer session types.
//!
//! An essay session holds the plan, every draft produced so far, and the
//! latest critique for one "Generate Essay" action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to write an essay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EssayRequest {
    pub topic: String,
    /// Number of revise/critique rounds after the first critique.
    /// `None` uses the configured default.
    #[serde(default)]
    pub max_revisions: Option<u32>,
}

/// Result of one essay-writing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EssaySession {
    pub id: Uuid,
    pub topic: String,
    pub plan: String,
    /// Latest draft; always equal to the last entry of `drafts`.
    pub draft: String,
    /// Critique of the latest draft.
    pub critique: String,
    /// Every draft in production order (initial draft first).
    pub drafts: Vec<String>,
    pub revision_number: u32,
    pub max_revisions: u32,
    pub created_at: DateTime<Utc>,
}

impl EssaySession {
    /// Start a session for `topic` with no content yet.
    pub fn new(topic: impl Into<String>, max_revisions: u32) -> Self {
        Self {
            id: Uuid::now_v7(),
            topic: topic.into(),
            plan: String::new(),
            draft: String::new(),
            critique: String::new(),
            drafts: Vec::new(),
            revision_number: 0,
            max_revisions,
            created_at: Utc::now(),
        }
    }

    /// Record a new draft, keeping `draft` and `drafts` in sync.
    pub fn push_draft(&mut self, draft: String) {
        self.drafts.push(draft.clone());
        self.draft = draft;
    }

    /// Whether another revision round is allowed.
    pub fn can_revise(&self) -> bool {
        self.revision_number < self.max_revisions
    }
}
