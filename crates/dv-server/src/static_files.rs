//! Static asset serving.
//!
//! Files under the configured assets directory are served at `/assets`.
//! The route is only mounted when the directory exists.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Create router for `/assets`.
pub(crate) fn assets_router(assets_dir: &Path) -> Router<Arc<AppState>> {
    if !assets_dir.is_dir() {
        tracing::debug!(dir = %assets_dir.display(), "Assets directory missing, /assets disabled");
        return Router::new();
    }
    Router::new().nest_service("/assets", ServeDir::new(assets_dir))
}
