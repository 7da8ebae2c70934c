//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::error::panic_response;
use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route(
            "/static/pygments.css",
            get(handlers::stylesheet::get_stylesheet),
        )
        .route("/", get(handlers::browse::browse_root))
        .route("/{*path}", get(handlers::browse::browse));

    router = router.merge(static_files::assets_router(&state.assets_dir));

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer())
                .layer(CatchPanicLayer::custom(panic_response)),
        )
        .with_state(state)
}
