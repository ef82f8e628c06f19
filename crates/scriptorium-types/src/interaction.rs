//! Append-only interaction log records.
//!
//! Every remote generation step is recorded against the session that
//! triggered it, in call order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Which generation step produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Plan,
    Draft,
    Critique,
    Revision,
    Analysts,
    Interview,
    Report,
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InteractionKind::Plan => "plan",
            InteractionKind::Draft => "draft",
            InteractionKind::Critique => "critique",
            InteractionKind::Revision => "revision",
            InteractionKind::Analysts => "analysts",
            InteractionKind::Interview => "interview",
            InteractionKind::Report => "report",
        };
        f.write_str(s)
    }
}

impl FromStr for InteractionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plan" => Ok(InteractionKind::Plan),
            "draft" => Ok(InteractionKind::Draft),
            "critique" => Ok(InteractionKind::Critique),
            "revision" => Ok(InteractionKind::Revision),
            "analysts" => Ok(InteractionKind::Analysts),
            "interview" => Ok(InteractionKind::Interview),
            "report" => Ok(InteractionKind::Report),
            other => Err(format!("invalid interaction kind: '{other}'")),
        }
    }
}

/// One logged generation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub id: Uuid,
    pub session_id: Uuid,
    /// Position within the session, starting at 0.
    pub sequence: u32,
    pub kind: InteractionKind,
    /// Text sent to the model (system and human parts joined).
    pub prompt: String,
    pub response: String,
    pub model: String,
    pub recorded_at: DateTime<Utc>,
}

impl InteractionRecord {
    /// Build a record; `sequence` is assigned by the log on append.
    pub fn new(
        session_id: Uuid,
        kind: InteractionKind,
        prompt: impl Into<String>,
        response: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            session_id,
            sequence: 0,
            kind,
            prompt: prompt.into(),
            response: response.into(),
            model: model.into(),
            recorded_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display_parse() {
        for kind in [
            InteractionKind::Plan,
            InteractionKind::Draft,
            InteractionKind::Critique,
            InteractionKind::Revision,
            InteractionKind::Analysts,
            InteractionKind::Interview,
            InteractionKind::Report,
        ] {
            assert_eq!(kind.to_string().parse::<InteractionKind>().unwrap(), kind);
        }
        assert!("summary".parse::<InteractionKind>().is_err());
    }

    #[test]
    fn test_new_record_starts_unsequenced() {
        let session_id = Uuid::now_v7();
        let record = InteractionRecord::new(session_id, InteractionKind::Plan, "p", "r", "m");
        assert_eq!(record.session_id, session_id);
        assert_eq!(record.sequence, 0);
        assert_eq!(record.kind, InteractionKind::Plan);
    }
}
