//! Research assistant pages.
//!
//! Endpoints:
//! - GET  /research                - Topic form with analyst count slider
//! - POST /research                - Generate analysts, create a session
//! - GET  /research/{id}           - Analysts, interview form, history, report
//! - POST /research/{id}/select    - Select an analyst by name
//! - POST /research/{id}/interview - Ask the selected analyst a question
//! - POST /research/{id}/report    - Generate the final report

use axum::Form;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use minijinja::context;
use serde::Deserialize;
use uuid::Uuid;

use scriptorium_core::research::assistant::ResearchAssistant;
use scriptorium_types::error::ResearchError;
use scriptorium_types::research::{MAX_ANALYSTS, MIN_ANALYSTS, ResearchSession};

use crate::http::error::AppError;
use crate::http::handlers::parse_uuid;
use crate::http::templates::HtmlPage;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TeamForm {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub max_analysts: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectForm {
    pub analyst: String,
}

#[derive(Debug, Deserialize)]
pub struct InterviewForm {
    #[serde(default)]
    pub analyst: Option<String>,
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct ResearchQuery {
    pub analyst: Option<String>,
}

fn default_analysts(state: &AppState) -> u32 {
    state.config.research.analyst_count_default()
}

fn form_page(
    state: &AppState,
    status: StatusCode,
    topic: &str,
    max_analysts: u32,
    notice: Option<String>,
) -> HtmlPage {
    state.templates.page(
        status,
        "research_form.html",
        context! {
            topic => topic,
            max_analysts => max_analysts,
            min_analysts => MIN_ANALYSTS,
            max_analysts_limit => MAX_ANALYSTS,
            notice => notice,
        },
    )
}

fn session_page(
    state: &AppState,
    status: StatusCode,
    session: &ResearchSession,
    selected: Option<&str>,
    question: &str,
    notice: Option<String>,
) -> HtmlPage {
    let selected = selected
        .and_then(|name| session.find_analyst(name))
        .or_else(|| session.current())
        .map(|a| a.name.as_str())
        .unwrap_or_default();

    state.templates.page(
        status,
        "research.html",
        context! {
            session => session,
            selected => selected,
            question => question,
            notice => notice,
        },
    )
}

fn notice_for(error: &ResearchError) -> String {
    match error {
        ResearchError::EmptyTopic => "Please enter a research topic.".to_string(),
        ResearchError::EmptyQuestion => "Please enter a question.".to_string(),
        other => other.to_string(),
    }
}

fn load(state: &AppState, id: &str) -> Result<(Uuid, ResearchSession), HtmlPage> {
    parse_uuid(id)
        .and_then(|id| {
            let session = state.research_sessions.get(&id)?;
            Ok((id, session))
        })
        .map_err(|e| state.templates.error_page(e))
}

/// GET /research
pub async fn research_form(State(state): State<AppState>) -> HtmlPage {
    form_page(&state, StatusCode::OK, "", default_analysts(&state), None)
}

/// POST /research
///
/// Invalid input re-renders the form with a notice and makes no remote call.
pub async fn submit_team(
    State(state): State<AppState>,
    Form(form): Form<TeamForm>,
) -> Result<Redirect, HtmlPage> {
    let fallback = default_analysts(&state);
    let max_analysts = match form.max_analysts.as_deref().map(str::trim) {
        None | Some("") => fallback,
        Some(raw) => raw.parse::<u32>().unwrap_or(0),
    };

    if let Err(e) = ResearchAssistant::validate_team_request(&form.topic, max_analysts) {
        return Err(form_page(
            &state,
            StatusCode::BAD_REQUEST,
            &form.topic,
            fallback,
            Some(notice_for(&e)),
        ));
    }

    let topic = form.topic.trim();
    let mut session = ResearchSession::new(topic, Vec::new());
    let analysts = state
        .research
        .generate_analysts(session.id, topic, max_analysts)
        .await
        .map_err(|e| state.templates.error_page(e.into()))?;
    session.replace_analysts(topic, analysts);

    let id = session.id;
    state.research_sessions.insert(id, session);
    Ok(Redirect::to(&format!("/research/{id}")))
}

/// GET /research/{id}
///
/// `?analyst=` preselects an analyst for this render only.
pub async fn show_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ResearchQuery>,
) -> HtmlPage {
    match load(&state, &id) {
        Ok((_, session)) => session_page(
            &state,
            StatusCode::OK,
            &session,
            query.analyst.as_deref(),
            "",
            None,
        ),
        Err(page) => page,
    }
}

/// POST /research/{id}/select
pub async fn select_analyst(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<SelectForm>,
) -> Result<Redirect, HtmlPage> {
    let (id, _) = load(&state, &id)?;
    let selected = state
        .research_sessions
        .update(&id, |session| session.select_analyst(&form.analyst))
        .map_err(|e| state.templates.error_page(e.into()))?;

    if !selected {
        return Err(state
            .templates
            .error_page(ResearchError::UnknownAnalyst(form.analyst).into()));
    }
    Ok(Redirect::to(&format!("/research/{id}")))
}

/// POST /research/{id}/interview
pub async fn ask_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<InterviewForm>,
) -> Result<Redirect, HtmlPage> {
    let (id, snapshot) = load(&state, &id)?;
    let analyst = form.analyst.as_deref().map(str::trim).filter(|a| !a.is_empty());

    let turn = match state.research.interview(&snapshot, analyst, &form.question).await {
        Ok(turn) => turn,
        Err(e) => {
            let e = AppError::from(e);
            if e.is_validation() {
                let notice = match &e {
                    AppError::Research(inner) => notice_for(inner),
                    other => other.parts().2,
                };
                return Err(session_page(
                    &state,
                    StatusCode::BAD_REQUEST,
                    &snapshot,
                    analyst,
                    &form.question,
                    Some(notice),
                ));
            }
            return Err(state.templates.error_page(e));
        }
    };

    let analyst_name = turn.analyst_name.clone();
    state
        .research_sessions
        .update(&id, move |session| {
            session.select_analyst(&analyst_name);
            session.record_turn(turn);
        })
        .map_err(|e| state.templates.error_page(e.into()))?;

    Ok(Redirect::to(&format!("/research/{id}")))
}

/// POST /research/{id}/report
pub async fn generate_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, HtmlPage> {
    let (id, snapshot) = load(&state, &id)?;
    let report = state
        .research
        .final_report(&snapshot)
        .await
        .map_err(|e| state.templates.error_page(e.into()))?;

    state
        .research_sessions
        .update(&id, |session| session.final_report = Some(report))
        .map_err(|e| state.templates.error_page(e.into()))?;

    Ok(Redirect::to(&format!("/research/{id}#report")))
}
