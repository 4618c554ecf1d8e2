//! Integration tests for the provider recording-status webhook.

mod common;

use axum::http::StatusCode;
use common::{body_bytes, post_form, post_json, seed_profile};
use sqlx::PgPool;

const WEBHOOK_URI: &str = "/api/v1/webhooks/recording-status";

fn scam_payload(recording_sid: &str) -> String {
    format!(
        "CallSid=CA1001&RecordingSid={recording_sid}\
         &RecordingUrl=https%3A%2F%2Fprovider.test%2Frecordings%2F{recording_sid}\
         &RecordingStatus=completed&RecordingDuration=42\
         &From=%2B15558675309&To=%2B15550001111"
    )
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn webhook_scores_the_call_and_returns_empty_200(pool: PgPool) {
    seed_profile(&pool, "+15550001111", true).await;
    let app = common::build_test_app(pool.clone());

    let response = post_form(app, WEBHOOK_URI, &scam_payload("RE1001")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.is_empty());

    // The stubbed IRS gift-card transcript maxes out the scorer.
    let (score, level, alert_required): (i32, String, bool) = sqlx::query_as(
        "SELECT fraud_score, fraud_risk_level, fraud_alert_required
         FROM calls WHERE provider_recording_sid = 'RE1001'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(score, 100);
    assert_eq!(level, "critical");
    assert!(alert_required);

    let (alerts,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM call_alerts WHERE alert_type = 'fraud'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(alerts, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unroutable_webhook_still_returns_200(pool: PgPool) {
    // No profile for the To number.
    let app = common::build_test_app(pool.clone());

    let response = post_form(app, WEBHOOK_URI, &scam_payload("RE1002")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let (calls,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM calls")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(calls, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn redelivered_webhook_is_idempotent(pool: PgPool) {
    seed_profile(&pool, "+15550001111", true).await;

    for _ in 0..2 {
        let app = common::build_test_app(pool.clone());
        let response = post_form(app, WEBHOOK_URI, &scam_payload("RE1003")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let (calls,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM calls")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(calls, 1);
    let (alerts,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM call_alerts")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(alerts, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unparseable_webhook_payload_is_acknowledged(pool: PgPool) {
    // A JSON body the form extractor rejects must still get 200 so the
    // provider does not retry it forever.
    let app = common::build_test_app(pool.clone());

    let response = post_json(
        app,
        WEBHOOK_URI,
        serde_json::json!({ "CallSid": "CA1004" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.is_empty());

    let (calls,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM calls")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(calls, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn webhook_without_call_sid_is_acknowledged(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let response = post_form(app, WEBHOOK_URI, "RecordingStatus=completed").await;
    assert_eq!(response.status(), StatusCode::OK);

    let (calls,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM calls")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(calls, 0);
}
