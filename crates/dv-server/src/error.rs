//! Error types for the HTTP server.

use std::any::Any;
use std::error::Error as _;
use std::fmt::Write;
use std::path::PathBuf;

use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use dv_renderer::RenderError;

use crate::archive::ArchiveError;

/// Body of every 404 response.
pub(crate) const NOT_FOUND_BODY: &str = "<h1>NOTHING TO SEE HERE</h1>";

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Path does not exist under the content root, or escapes it.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Converter or highlighter failure.
    #[error("Render error")]
    Render(#[from] RenderError),

    /// Archive or archive member could not be read.
    #[error("Archive error")]
    Archive(#[from] ArchiveError),

    /// Page template failed to render.
    #[error("Template error")]
    Template(#[from] minijinja::Error),

    /// I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

/// Error building the server state.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Content root is missing or unreadable.
    #[error("Cannot open content root {path}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Highlighting theme could not be loaded.
    #[error("Cannot load highlighter")]
    Highlighter(#[from] RenderError),

    /// A bundled template failed to compile.
    #[error("Invalid page template")]
    Template(#[from] minijinja::Error),
}

impl ServerError {
    /// Plain-text report of the error and its source chain.
    pub(crate) fn report(&self) -> String {
        let mut report = format!("Error: {self}\n");
        let mut source = self.source();
        while let Some(cause) = source {
            let _ = writeln!(report, "Caused by: {cause}");
            source = cause.source();
        }
        report
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, Html(NOT_FOUND_BODY)).into_response(),
            Self::Render(_) | Self::Archive(_) | Self::Template(_) | Self::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                self.report(),
            )
                .into_response(),
        }
    }
}

/// Response for a request whose handler panicked, e.g. inside a converter.
///
/// Reported like any other failure: status 500 with a plain-text body.
pub(crate) fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = message, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("Error: Request handler panicked\nCaused by: {message}\n"),
    )
        .into_response()
}
