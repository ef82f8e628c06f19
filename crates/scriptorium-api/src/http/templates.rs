//! HTML page templates.
//!
//! Templates are compiled into the binary and rendered with `minijinja`.
//! Names ending in `.html` are auto-escaped.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use minijinja::{Environment, context};
use serde::Serialize;

use crate::http::error::AppError;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("essay_form.html", include_str!("../../templates/essay_form.html")),
    ("essay.html", include_str!("../../templates/essay.html")),
    ("research_form.html", include_str!("../../templates/research_form.html")),
    ("research.html", include_str!("../../templates/research.html")),
    ("error.html", include_str!("../../templates/error.html")),
];

/// Rendered HTML page with its status code.
#[derive(Debug)]
pub struct HtmlPage {
    pub status: StatusCode,
    pub body: String,
}

impl IntoResponse for HtmlPage {
    fn into_response(self) -> Response {
        (self.status, Html(self.body)).into_response()
    }
}

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, AppError> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(ctx))
            .map_err(|e| AppError::Internal(format!("failed to render {name}: {e}")))
    }

    /// Render `error` as a full page.
    pub fn error_page(&self, error: AppError) -> HtmlPage {
        let (status, code, message) = error.parts();
        if status.is_server_error() {
            tracing::error!(code, %message, "page request failed");
        }
        let body = self
            .render(
                "error.html",
                context! { status => status.as_u16(), code => code, message => &message },
            )
            .unwrap_or_else(|_| format!("{} {code}: {message}", status.as_u16()));
        HtmlPage { status, body }
    }

    /// Render a page, or the error page if rendering fails.
    pub fn page<S: Serialize>(&self, status: StatusCode, name: &str, ctx: S) -> HtmlPage {
        match self.render(name, ctx) {
            Ok(body) => HtmlPage { status, body },
            Err(e) => self.error_page(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_compile() {
        let templates = Templates::new().unwrap();
        let html = templates.render("index.html", context! {}).unwrap();
        assert!(html.contains("href=\"/essay\""));
        assert!(html.contains("href=\"/research\""));
    }

    #[test]
    fn test_output_is_escaped() {
        let templates = Templates::new().unwrap();
        let page = templates.error_page(AppError::Validation("<script>".to_string()));
        assert_eq!(page.status, StatusCode::BAD_REQUEST);
        assert!(page.body.contains("&lt;script&gt;"));
        assert!(!page.body.contains("<script>"));
    }
}
