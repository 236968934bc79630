// Library interface for policy-ui

pub mod config;
pub mod form;
pub mod list;
pub mod routes;
pub mod shell;

use anyhow::{Context, Result};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use policy_client::{HttpPolicyClient, PolicyApi};
use std::sync::Arc;
use tera::Tera;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::info;

pub use config::Config;
pub use shell::Shell;

#[derive(Clone)]
pub struct AppState {
    pub shell: Shell,
    pub tera: Tera,
}

impl AppState {
    /// State backed by the HTTP policy API named in `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let client = HttpPolicyClient::new(&config.api_base_url, config.request_timeout())
            .context("Failed to create policy API client")?;
        info!("Using policy API at {}", client.collection_url());
        Self::with_api(Arc::new(client))
    }

    pub fn with_api(api: Arc<dyn PolicyApi>) -> Result<Self> {
        Ok(Self {
            shell: Shell::new(api),
            tera: load_templates()?,
        })
    }
}

/// Compile the page templates from the crate's `templates/` directory.
pub fn load_templates() -> Result<Tera> {
    let tpl_glob = format!("{}/templates/**/*.html", env!("CARGO_MANIFEST_DIR"));
    Tera::new(&tpl_glob).with_context(|| format!("Parsing error for Tera templates ({})", tpl_glob))
}

// Custom error type for better error handling
#[derive(Debug)]
pub struct AppError {
    pub status_code: StatusCode,
    pub message: String,
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Internal server error: {}", err),
        }
    }
}

impl From<tera::Error> for AppError {
    fn from(err: tera::Error) -> Self {
        AppError {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Template rendering error: {}", err),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code, self.message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

// Health check endpoint
async fn health() -> impl IntoResponse {
    "OK"
}

// Fallback handler for 404s
async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Html(
            r#"
<!DOCTYPE html>
<html>
<head>
    <title>404 - Not Found</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 40px; }
        .error { color: #d32f2f; }
    </style>
</head>
<body>
    <h1 class="error">404 - Page Not Found</h1>
    <p><a href="/">&larr; Back to Policies</a></p>
</body>
</html>
    "#,
        ),
    )
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(health))
        .route("/policies", post(routes::submit_policy))
        .route("/policies/:id/edit", post(routes::select_for_edit))
        .route("/policies/:id/delete", post(routes::delete_policy))
        .route("/edit/cancel", post(routes::cancel_edit))
        .route("/refresh", post(routes::refresh))
        .route("/error/dismiss", post(routes::dismiss_error))
        .route("/api/policies", get(routes::list_policies_api))
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .with_state(state)
}
