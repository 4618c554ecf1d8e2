//! Route definitions for provider webhooks.

use axum::routing::post;
use axum::Router;

use crate::handlers::webhooks;
use crate::state::AppState;

/// Routes mounted at `/webhooks`.
///
/// ```text
/// POST /recording-status    -> recording_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/recording-status", post(webhooks::recording_status))
}
