//! JSON API handlers.
//!
//! Endpoints:
//! - POST /api/v1/essays                    - Write an essay
//! - GET  /api/v1/essays/{id}               - Get an essay session
//! - POST /api/v1/research                  - Generate analysts, create a session
//! - GET  /api/v1/research/{id}             - Get a research session
//! - POST /api/v1/research/{id}/interviews  - Interview an analyst
//! - POST /api/v1/research/{id}/report      - Generate the final report
//! - GET  /api/v1/sessions/{id}/interactions - Interaction log for a session

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use uuid::Uuid;

use scriptorium_types::error::SessionError;
use scriptorium_types::essay::{EssayRequest, EssaySession};
use scriptorium_types::interaction::InteractionRecord;
use scriptorium_types::research::{AnalystRequest, InterviewRequest, InterviewTurn, ResearchSession};

use crate::http::error::AppError;
use crate::http::handlers::parse_uuid;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// Body of a final report response.
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub session_id: Uuid,
    pub report: String,
}

/// POST /api/v1/essays
pub async fn create_essay(
    State(state): State<AppState>,
    Json(request): Json<EssayRequest>,
) -> Result<ApiResponse<EssaySession>, AppError> {
    let timer = RequestTimer::start();
    let session = state.essay_writer.write(&request).await?;
    let id = session.id;
    state.essays.insert(id, session.clone());

    Ok(timer
        .success(session)
        .with_link("self", &format!("/api/v1/essays/{id}"))
        .with_link("interactions", &format!("/api/v1/sessions/{id}/interactions")))
}

/// GET /api/v1/essays/{id}
pub async fn get_essay(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<EssaySession>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_uuid(&id)?;
    let session = state.essays.get(&id)?;
    Ok(timer
        .success(session)
        .with_link("self", &format!("/api/v1/essays/{id}")))
}

/// POST /api/v1/research
pub async fn create_research(
    State(state): State<AppState>,
    Json(request): Json<AnalystRequest>,
) -> Result<ApiResponse<ResearchSession>, AppError> {
    let timer = RequestTimer::start();
    let topic = request.topic.trim();
    let mut session = ResearchSession::new(topic, Vec::new());
    let analysts = state
        .research
        .generate_analysts(session.id, topic, request.max_analysts)
        .await?;
    session.replace_analysts(topic, analysts);

    let id = session.id;
    state.research_sessions.insert(id, session.clone());

    Ok(timer
        .success(session)
        .with_link("self", &format!("/api/v1/research/{id}"))
        .with_link("interviews", &format!("/api/v1/research/{id}/interviews"))
        .with_link("report", &format!("/api/v1/research/{id}/report")))
}

/// GET /api/v1/research/{id}
pub async fn get_research(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<ResearchSession>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_uuid(&id)?;
    let session = state.research_sessions.get(&id)?;
    Ok(timer
        .success(session)
        .with_link("self", &format!("/api/v1/research/{id}")))
}

/// POST /api/v1/research/{id}/interviews
///
/// The interviewed analyst becomes the session's current selection.
pub async fn interview(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<InterviewRequest>,
) -> Result<ApiResponse<InterviewTurn>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_uuid(&id)?;
    let snapshot = state.research_sessions.get(&id)?;

    let turn = state
        .research
        .interview(&snapshot, request.analyst.as_deref(), &request.question)
        .await?;

    let recorded = turn.clone();
    state.research_sessions.update(&id, move |session| {
        session.select_analyst(&recorded.analyst_name);
        session.record_turn(recorded);
    })?;

    Ok(timer
        .success(turn)
        .with_link("session", &format!("/api/v1/research/{id}")))
}

/// POST /api/v1/research/{id}/report
pub async fn report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<ReportResponse>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_uuid(&id)?;
    let snapshot = state.research_sessions.get(&id)?;

    let report = state.research.final_report(&snapshot).await?;
    let stored = report.clone();
    state
        .research_sessions
        .update(&id, move |session| session.final_report = Some(stored))?;

    Ok(timer
        .success(ReportResponse {
            session_id: id,
            report,
        })
        .with_link("session", &format!("/api/v1/research/{id}")))
}

/// GET /api/v1/sessions/{id}/interactions
///
/// Works for both essay and research sessions, and for any session the
/// log still holds records for (a durable log outlives the in-memory
/// stores). 404 only when neither the log nor a store knows the id.
pub async fn list_interactions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<InteractionRecord>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_uuid(&id)?;

    let records = state.interactions.list(&id).await?;
    if records.is_empty() && !state.essays.contains(&id) && !state.research_sessions.contains(&id) {
        return Err(SessionError::NotFound.into());
    }
    Ok(timer.success(records))
}
