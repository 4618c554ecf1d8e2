//! Route definitions for passcode verification.

use axum::routing::post;
use axum::Router;

use crate::handlers::passcode;
use crate::state::AppState;

/// Routes mounted at `/passcode`.
///
/// ```text
/// POST /verify    -> verify
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/verify", post(passcode::verify))
}
