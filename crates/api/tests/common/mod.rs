//! Shared helpers for API integration tests.
//!
//! External collaborators (telephony, speech) are stubbed; the database,
//! the router middleware stack and local recording storage are real.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use callshield_api::config::ServerConfig;
use callshield_api::router::build_app_router;
use callshield_api::state::AppState;
use callshield_cloud::{LocalStorage, StorageProvider};
use callshield_core::lexicon::FraudLexicon;
use callshield_core::passcode::PepperSet;
use callshield_pipeline::{RecordingIntake, ScoringConfig};
use callshield_speech::{SpeechError, SpeechToText, Transcription};
use callshield_telephony::{CallMetadata, RecordingProvider, TelephonyError};

/// The transcript the stubbed speech service returns for every recording.
pub const SCAM_TRANSCRIPT: &str =
    "Hi this is the IRS, you must pay immediately with a gift card or face arrest";

struct StubProvider;

#[async_trait::async_trait]
impl RecordingProvider for StubProvider {
    async fn lookup_call(&self, _call_sid: &str) -> Result<CallMetadata, TelephonyError> {
        Ok(CallMetadata::default())
    }

    async fn download_recording(&self, _url: &str) -> Result<Vec<u8>, TelephonyError> {
        Ok(b"RIFF-stub-audio".to_vec())
    }
}

struct StubSpeech;

#[async_trait::async_trait]
impl SpeechToText for StubSpeech {
    async fn transcribe(&self, _audio: &[u8]) -> Result<Option<Transcription>, SpeechError> {
        Ok(Some(Transcription {
            transcript: SCAM_TRANSCRIPT.to_string(),
            confidence: Some(0.9),
        }))
    }
}

/// Build a test `ServerConfig` with safe defaults and a fixed pepper set.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        peppers: PepperSet::parse("1:test_pepper_secret", 1).unwrap(),
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and stubbed collaborators.
///
/// This mirrors the state construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();

    let storage_root = std::env::temp_dir().join("callshield-api-tests");
    let storage: Arc<dyn StorageProvider> = Arc::new(LocalStorage::new(storage_root));

    let intake = Arc::new(RecordingIntake::new(
        pool.clone(),
        Arc::new(StubProvider),
        Arc::clone(&storage),
        Arc::new(StubSpeech),
        None,
        FraudLexicon::builtin(),
        ScoringConfig::default(),
    ));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        intake,
        storage,
    };

    build_app_router(state, &config)
}

/// Insert a profile and return its id.
pub async fn seed_profile(pool: &PgPool, virtual_number: &str, automation: bool) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO profiles
            (display_name, virtual_number, notify_push,
             auto_mark_enabled, auto_block_on_fraud, auto_trust_on_safe)
         VALUES ('Grandma', $1, true, $2, $2, $2)
         RETURNING id",
    )
    .bind(virtual_number)
    .bind(automation)
    .fetch_one(pool)
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_form(app: Router, uri: &str, body: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}
