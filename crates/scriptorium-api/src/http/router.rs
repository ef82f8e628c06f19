//! Axum router configuration with middleware.
//!
//! HTML pages live at the root; the JSON API is under `/api/v1/`.
//! Middleware: CORS (API only) and request tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/essays", post(handlers::api::create_essay))
        .route("/essays/{id}", get(handlers::api::get_essay))
        .route("/research", post(handlers::api::create_research))
        .route("/research/{id}", get(handlers::api::get_research))
        .route("/research/{id}/interviews", post(handlers::api::interview))
        .route("/research/{id}/report", post(handlers::api::report))
        .route(
            "/sessions/{id}/interactions",
            get(handlers::api::list_interactions),
        )
        .layer(cors);

    let pages = Router::new()
        .route("/", get(handlers::pages::index))
        .route(
            "/essay",
            get(handlers::essay::essay_form).post(handlers::essay::submit_essay),
        )
        .route("/essay/{id}", get(handlers::essay::show_essay))
        .route(
            "/research",
            get(handlers::research::research_form).post(handlers::research::submit_team),
        )
        .route("/research/{id}", get(handlers::research::show_session))
        .route(
            "/research/{id}/select",
            post(handlers::research::select_analyst),
        )
        .route(
            "/research/{id}/interview",
            post(handlers::research::ask_question),
        )
        .route(
            "/research/{id}/report",
            post(handlers::research::generate_report),
        );

    Router::new()
        .merge(pages)
        .nest("/api/v1", api_routes)
        .route("/health", get(handlers::pages::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
