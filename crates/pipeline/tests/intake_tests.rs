//! Integration tests for the recording intake pipeline.
//!
//! Collaborators are stubbed; the database and local recording storage are
//! real, so these tests cover the idempotence and automation invariants end
//! to end.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use assert_matches::assert_matches;
use sqlx::PgPool;

use callshield_cloud::LocalStorage;
use callshield_core::lexicon::FraudLexicon;
use callshield_core::phone::caller_hash;
use callshield_core::scorer::RiskLevel;
use callshield_pipeline::{IntakeOutcome, RecordingIntake, RecordingNotice, ScoringConfig};
use callshield_speech::{SpeechError, SpeechToText, Transcription};
use callshield_telephony::{CallMetadata, RecordingProvider, TelephonyError};

const SCAM_SCRIPT: &str =
    "Hi this is the IRS, you must pay immediately with a gift card or face arrest";
const FAMILY_CALL: &str = "Hi mom, just calling to say hi, call me back";

// ---------------------------------------------------------------------------
// Stub collaborators
// ---------------------------------------------------------------------------

struct StubProvider {
    fail_download: bool,
    downloads: AtomicU32,
}

impl StubProvider {
    fn new() -> Self {
        Self {
            fail_download: false,
            downloads: AtomicU32::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            fail_download: true,
            downloads: AtomicU32::new(0),
        }
    }
}

#[async_trait::async_trait]
impl RecordingProvider for StubProvider {
    async fn lookup_call(&self, _call_sid: &str) -> Result<CallMetadata, TelephonyError> {
        Ok(CallMetadata::default())
    }

    async fn download_recording(&self, _url: &str) -> Result<Vec<u8>, TelephonyError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        if self.fail_download {
            return Err(TelephonyError::ApiError {
                status: 502,
                body: "upstream unavailable".into(),
            });
        }
        Ok(b"RIFF-stub-audio".to_vec())
    }
}

struct StubSpeech {
    transcript: Option<String>,
}

#[async_trait::async_trait]
impl SpeechToText for StubSpeech {
    async fn transcribe(&self, _audio: &[u8]) -> Result<Option<Transcription>, SpeechError> {
        Ok(self.transcript.clone().map(|transcript| Transcription {
            transcript,
            confidence: Some(0.92),
        }))
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    intake: RecordingIntake,
    provider: Arc<StubProvider>,
    _storage_dir: tempfile::TempDir,
}

fn build_intake(pool: PgPool, provider: Arc<StubProvider>, transcript: Option<&str>) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(LocalStorage::new(dir.path().to_path_buf()));
    let speech = Arc::new(StubSpeech {
        transcript: transcript.map(str::to_string),
    });
    let intake = RecordingIntake::new(
        pool,
        provider.clone(),
        storage,
        speech,
        None,
        FraudLexicon::builtin(),
        ScoringConfig::default(),
    );
    Harness {
        intake,
        provider,
        _storage_dir: dir,
    }
}

async fn seed_profile(pool: &PgPool, virtual_number: &str, automation: bool) -> i64 {
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

fn notice(recording_sid: &str) -> RecordingNotice {
    RecordingNotice {
        call_sid: Some("CA0001".into()),
        recording_sid: Some(recording_sid.into()),
        recording_url: Some("https://provider.test/recordings/RE0001".into()),
        recording_status: Some("completed".into()),
        recording_duration_secs: Some(42),
        from_number: Some("+15558675309".into()),
        to_number: Some("+15550001111".into()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn scam_call_is_scored_alerted_and_blocked(pool: PgPool) {
    let profile_id = seed_profile(&pool, "+15550001111", true).await;
    let h = build_intake(pool.clone(), Arc::new(StubProvider::new()), Some(SCAM_SCRIPT));

    let outcome = h.intake.handle_recording_ready(notice("RE0001")).await.unwrap();
    let call_id = assert_matches!(
        outcome,
        IntakeOutcome::Scored {
            call_id,
            score: 100,
            level: RiskLevel::Critical,
            alert_required: true,
            alert_raised: true,
        } => call_id
    );

    let (score, level, storage_path, transcript): (i32, String, String, String) =
        sqlx::query_as(
            "SELECT fraud_score, fraud_risk_level, storage_path, transcript
             FROM calls WHERE id = $1",
        )
        .bind(call_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(score, 100);
    assert_eq!(level, "critical");
    assert_eq!(storage_path, format!("profiles/{profile_id}/calls/{call_id}.wav"));
    assert_eq!(transcript, SCAM_SCRIPT);

    // One pending fraud alert with a verdict snapshot.
    let (alert_count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM call_alerts WHERE call_id = $1 AND alert_type = 'fraud' AND status = 'pending'",
    )
    .bind(call_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(alert_count, 1);

    // Automation blocked the caller with the score-driven reason.
    let (reason,): (String,) = sqlx::query_as(
        "SELECT reason FROM blocked_callers WHERE profile_id = $1 AND caller_hash = $2",
    )
    .bind(profile_id)
    .bind(caller_hash("+15558675309"))
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(reason, "auto_fraud_score");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn redelivery_is_idempotent(pool: PgPool) {
    seed_profile(&pool, "+15550001111", true).await;
    let h = build_intake(pool.clone(), Arc::new(StubProvider::new()), Some(SCAM_SCRIPT));

    let first = h.intake.handle_recording_ready(notice("RE0001")).await.unwrap();
    let first_id = assert_matches!(first, IntakeOutcome::Scored { call_id, .. } => call_id);

    let second = h.intake.handle_recording_ready(notice("RE0001")).await.unwrap();
    assert_eq!(second, IntakeOutcome::Duplicate { call_id: first_id });

    // Exactly one call row and one fraud alert; no duplicate download work.
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
    assert_eq!(h.provider.downloads.load(Ordering::SeqCst), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn innocent_call_scores_zero_with_no_alert(pool: PgPool) {
    seed_profile(&pool, "+15550001111", true).await;
    let h = build_intake(pool.clone(), Arc::new(StubProvider::new()), Some(FAMILY_CALL));

    let outcome = h.intake.handle_recording_ready(notice("RE0002")).await.unwrap();
    assert_matches!(
        outcome,
        IntakeOutcome::Scored {
            score: 0,
            level: RiskLevel::Low,
            alert_required: false,
            alert_raised: false,
            ..
        }
    );

    let (alerts,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM call_alerts")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(alerts, 0);
    let (blocked,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM blocked_callers")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(blocked, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unroutable_notice_is_ignored(pool: PgPool) {
    // No profile seeded for the destination number.
    let h = build_intake(pool.clone(), Arc::new(StubProvider::new()), Some(SCAM_SCRIPT));

    let outcome = h.intake.handle_recording_ready(notice("RE0003")).await.unwrap();
    assert_matches!(outcome, IntakeOutcome::Ignored { .. });

    let (calls,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM calls")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(calls, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_transcription_ends_with_no_score(pool: PgPool) {
    seed_profile(&pool, "+15550001111", true).await;
    let h = build_intake(pool.clone(), Arc::new(StubProvider::new()), None);

    let outcome = h.intake.handle_recording_ready(notice("RE0004")).await.unwrap();
    let call_id = assert_matches!(outcome, IntakeOutcome::NoTranscript { call_id } => call_id);

    // Recording stored, no verdict.
    let (storage_path, score): (Option<String>, Option<i32>) =
        sqlx::query_as("SELECT storage_path, fraud_score FROM calls WHERE id = $1")
            .bind(call_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(storage_path.is_some());
    assert_eq!(score, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn download_failure_leaves_the_row_retryable(pool: PgPool) {
    seed_profile(&pool, "+15550001111", true).await;
    let h = build_intake(pool.clone(), Arc::new(StubProvider::failing()), Some(SCAM_SCRIPT));

    let err = h.intake.handle_recording_ready(notice("RE0005")).await.unwrap_err();
    assert!(err.to_string().contains("502"));

    // The row exists, unscored, ready for the redelivery retry.
    let (calls, scored): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COUNT(fraud_score) FROM calls",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(calls, 1);
    assert_eq!(scored, 0);

    // A successful redelivery picks the same row up and finishes the job.
    let retry = build_intake(pool.clone(), Arc::new(StubProvider::new()), Some(SCAM_SCRIPT));
    let outcome = retry.intake.handle_recording_ready(notice("RE0005")).await.unwrap();
    assert_matches!(outcome, IntakeOutcome::Scored { score: 100, .. });
    let (calls,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM calls")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(calls, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn automation_respects_the_master_switch(pool: PgPool) {
    seed_profile(&pool, "+15550001111", false).await;
    let h = build_intake(pool.clone(), Arc::new(StubProvider::new()), Some(SCAM_SCRIPT));

    let outcome = h.intake.handle_recording_ready(notice("RE0006")).await.unwrap();
    assert_matches!(outcome, IntakeOutcome::Scored { alert_required: true, .. });

    // Alert yes, list mutation no.
    let (blocked,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM blocked_callers")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(blocked, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn repeat_callers_earn_a_boost(pool: PgPool) {
    let profile_id = seed_profile(&pool, "+15550001111", false).await;
    let hash = caller_hash("+15558675309");

    // Five prior calls from the same caller inside the window.
    for i in 0..5 {
        sqlx::query(
            "INSERT INTO calls (provider_call_sid, provider_recording_sid, profile_id, caller_hash)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(format!("CAprior{i}"))
        .bind(format!("REprior{i}"))
        .bind(profile_id)
        .bind(&hash)
        .execute(&pool)
        .await
        .unwrap();
    }

    // "warrant" + "account number" floors at 80; +10 repeat boost lands 90.
    let h = build_intake(
        pool.clone(),
        Arc::new(StubProvider::new()),
        Some("there is a warrant we need your account number"),
    );
    let outcome = h.intake.handle_recording_ready(notice("RE0007")).await.unwrap();
    assert_matches!(
        outcome,
        IntakeOutcome::Scored {
            score: 90,
            level: RiskLevel::Critical,
            ..
        }
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn safe_phrases_dampen_the_score(pool: PgPool) {
    let profile_id = seed_profile(&pool, "+15550001111", false).await;
    sqlx::query("UPDATE profiles SET safe_phrases = ARRAY['poker night'] WHERE id = $1")
        .bind(profile_id)
        .execute(&pool)
        .await
        .unwrap();

    // "donation" floors at 60; one safe-phrase match subtracts 15.
    let h = build_intake(
        pool.clone(),
        Arc::new(StubProvider::new()),
        Some("please consider a donation for poker night"),
    );
    let outcome = h.intake.handle_recording_ready(notice("RE0008")).await.unwrap();
    assert_matches!(
        outcome,
        IntakeOutcome::Scored {
            score: 45,
            level: RiskLevel::Medium,
            ..
        }
    );
}
