//! Highlighter stylesheet endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET /static/pygments.css.
///
/// Generated from the same theme used for highlighting, with every rule
/// scoped under `.codehilite`.
pub(crate) async fn get_stylesheet(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let css = state.highlighter.stylesheet()?;
    Ok(([(header::CONTENT_TYPE, "text/css; charset=utf-8")], css))
}
