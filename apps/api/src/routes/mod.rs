pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::dialogue::handlers;
use crate::extraction::document::MAX_DOCUMENT_BYTES;
use crate::state::AppState;

/// Headroom over the document limit for multipart framing and text parts.
const UPLOAD_BODY_LIMIT: usize = MAX_DOCUMENT_BYTES + 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Menu
        .route("/api/v1/modes", get(handlers::handle_list_modes))
        // Sessions
        .route(
            "/api/v1/modes/:mode/sessions",
            post(handlers::handle_create_session),
        )
        .route(
            "/api/v1/modes/:mode/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_reset_session),
        )
        // Stage flow
        .route(
            "/api/v1/modes/:mode/sessions/:id/submit",
            post(handlers::handle_submit),
        )
        .route(
            "/api/v1/modes/:mode/sessions/:id/advance",
            post(handlers::handle_advance),
        )
        .route(
            "/api/v1/modes/:mode/sessions/:id/document",
            post(handlers::handle_document).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/api/v1/modes/:mode/sessions/:id/debrief",
            post(handlers::handle_debrief),
        )
        .with_state(state)
}
