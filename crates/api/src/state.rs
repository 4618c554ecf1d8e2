use std::sync::Arc;

use callshield_cloud::StorageProvider;
use callshield_pipeline::RecordingIntake;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: callshield_db::DbPool,
    /// Server configuration, including the passcode pepper set.
    pub config: Arc<ServerConfig>,
    /// The recording intake pipeline driven by the provider webhook.
    pub intake: Arc<RecordingIntake>,
    /// Recording storage, for signed read URLs.
    pub storage: Arc<dyn StorageProvider>,
}
