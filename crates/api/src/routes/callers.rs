//! Route definitions for the `/callers` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::callers;
use crate::state::AppState;

/// Routes mounted at `/callers`.
///
/// ```text
/// GET /status    -> caller_status  (?profile_id=&number=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/status", get(callers::caller_status))
}
