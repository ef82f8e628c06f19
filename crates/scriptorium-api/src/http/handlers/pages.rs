//! Landing page and health check.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use minijinja::context;

use crate::http::templates::HtmlPage;
use crate::state::AppState;

/// GET / - Links to both tools.
pub async fn index(State(state): State<AppState>) -> HtmlPage {
    state.templates.page(StatusCode::OK, "index.html", context! {})
}

/// GET /health - Liveness check.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
