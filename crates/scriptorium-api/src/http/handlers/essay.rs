//! Essay writer pages.
//!
//! Endpoints:
//! - GET  /essay      - Topic form
//! - POST /essay      - Run plan/draft/critique and redirect to the result
//! - GET  /essay/{id} - Show plan, draft, and critique

use axum::Form;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use minijinja::context;
use serde::Deserialize;

use scriptorium_types::error::EssayError;
use scriptorium_types::essay::EssayRequest;

use crate::http::error::AppError;
use crate::http::handlers::parse_uuid;
use crate::http::templates::HtmlPage;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EssayForm {
    #[serde(default)]
    pub topic: String,
    /// Raw field value; an empty string means "use the default".
    #[serde(default)]
    pub revisions: Option<String>,
}

fn form_page(
    state: &AppState,
    status: StatusCode,
    topic: &str,
    revisions: u32,
    notice: Option<String>,
) -> HtmlPage {
    state.templates.page(
        status,
        "essay_form.html",
        context! {
            topic => topic,
            revisions => revisions,
            revision_limit => state.essay_writer.revision_limit(),
            notice => notice,
        },
    )
}

fn notice_for(error: &EssayError) -> String {
    match error {
        EssayError::EmptyTopic => "Please enter an essay topic.".to_string(),
        other => other.to_string(),
    }
}

/// GET /essay
pub async fn essay_form(State(state): State<AppState>) -> HtmlPage {
    let revisions = state.essay_writer.default_revisions();
    form_page(&state, StatusCode::OK, "", revisions, None)
}

/// POST /essay
///
/// Invalid input re-renders the form with a notice and makes no remote call.
pub async fn submit_essay(
    State(state): State<AppState>,
    Form(form): Form<EssayForm>,
) -> Result<Redirect, HtmlPage> {
    let default_revisions = state.essay_writer.default_revisions();
    let max_revisions = match form.revisions.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match raw.parse::<u32>() {
            Ok(n) => Some(n),
            Err(_) => {
                return Err(form_page(
                    &state,
                    StatusCode::BAD_REQUEST,
                    &form.topic,
                    default_revisions,
                    Some(format!("Revision rounds must be a whole number, got '{raw}'.")),
                ));
            }
        },
    };

    let request = EssayRequest {
        topic: form.topic.clone(),
        max_revisions,
    };
    if let Err(e) = state.essay_writer.validate(&request) {
        return Err(form_page(
            &state,
            StatusCode::BAD_REQUEST,
            &form.topic,
            max_revisions.unwrap_or(default_revisions),
            Some(notice_for(&e)),
        ));
    }

    let session = state
        .essay_writer
        .write(&request)
        .await
        .map_err(|e| state.templates.error_page(e.into()))?;

    let id = session.id;
    state.essays.insert(id, session);
    Ok(Redirect::to(&format!("/essay/{id}")))
}

/// GET /essay/{id}
pub async fn show_essay(State(state): State<AppState>, Path(id): Path<String>) -> HtmlPage {
    let essay = match parse_uuid(&id).and_then(|id| state.essays.get(&id).map_err(AppError::from)) {
        Ok(essay) => essay,
        Err(e) => return state.templates.error_page(e),
    };
    state
        .templates
        .page(StatusCode::OK, "essay.html", context! { essay => essay })
}
