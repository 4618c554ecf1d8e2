pub mod callers;
pub mod calls;
pub mod health;
pub mod passcode;
pub mod profiles;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /webhooks/recording-status       provider recording-ready webhook (POST)
///
/// /calls/{id}                      call row with verdict (GET)
/// /calls/{id}/feedback             record caretaker feedback (POST)
/// /calls/{id}/recording-url        signed recording GET URL (GET)
///
/// /callers/status                  blocked/trusted standing (GET)
///
/// /passcode/verify                 passcode check with lockout (POST)
/// /profiles/{id}/passcode          set or rotate a passcode (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/webhooks", webhooks::router())
        .nest("/calls", calls::router())
        .nest("/callers", callers::router())
        .nest("/passcode", passcode::router())
        .nest("/profiles", profiles::router())
}
