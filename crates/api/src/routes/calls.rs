//! Route definitions for the `/calls` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::calls;
use crate::state::AppState;

/// Routes mounted at `/calls`.
///
/// ```text
/// GET  /{id}                  -> get_call
/// POST /{id}/feedback         -> record_feedback
/// GET  /{id}/recording-url    -> recording_url
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(calls::get_call))
        .route("/{id}/feedback", post(calls::record_feedback))
        .route("/{id}/recording-url", get(calls::recording_url))
}
