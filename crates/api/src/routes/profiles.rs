//! Route definitions for the `/profiles` resource.
//!
//! Profile CRUD lives outside this service; only the passcode rotation
//! endpoint is exposed here.

use axum::routing::put;
use axum::Router;

use crate::handlers::passcode;
use crate::state::AppState;

/// Routes mounted at `/profiles`.
///
/// ```text
/// PUT /{id}/passcode    -> set_passcode
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/passcode", put(passcode::set_passcode))
}
