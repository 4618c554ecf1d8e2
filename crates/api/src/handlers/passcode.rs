//! Passcode verification and rotation handlers.
//!
//! Verification is the call-time gate: a trusted caller keys in the
//! profile's passcode to be put through. Failures accumulate per
//! `(profile, source IP)` and escalate into timed lockouts; the active
//! lockout is mirrored onto the profile row for call routing.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use callshield_core::error::CoreError;
use callshield_core::passcode::{
    hash_passcode, lockout_duration_secs, validate_passcode_format, verify_passcode,
};
use callshield_core::phone::canonicalize_number;
use callshield_core::types::DbId;
use callshield_db::repositories::{PasscodeAttemptRepo, ProfileRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Request body for passcode verification.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    /// The profile's virtual number, any formatting.
    pub virtual_number: String,
    pub passcode: String,
}

/// Verification response payload.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub verified: bool,
    pub profile_id: DbId,
}

/// The caller's source IP for lockout bucketing.
///
/// The service sits behind the provider's proxy, so the first hop of
/// `X-Forwarded-For` is the caller. Requests without the header share one
/// bucket rather than bypassing the lockout.
fn source_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// POST /api/v1/passcode/verify
///
/// Check a passcode against the profile for a virtual number. A locked-out
/// pair gets 429 with `retry_after_secs`; a wrong passcode gets 401 and a
/// recorded failure; success clears all failure state.
pub async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<VerifyRequest>,
) -> AppResult<Json<VerifyResponse>> {
    let ip = source_ip(&headers);

    let profile =
        ProfileRepo::find_by_virtual_number(&state.pool, &canonicalize_number(&body.virtual_number))
            .await?
            .ok_or_else(|| CoreError::Unauthorized("Unknown virtual number".into()))?;

    // Lockout check comes before any hash work.
    let now = Utc::now();
    let attempt = PasscodeAttemptRepo::find(&state.pool, profile.id, &ip).await?;
    if let Some(attempt) = &attempt {
        if attempt.is_locked(now) {
            let retry_after_secs = attempt
                .locked_until
                .map(|until| (until - now).num_seconds().max(1))
                .unwrap_or(1);
            return Err(AppError::RateLimited { retry_after_secs });
        }
    }

    let (Some(hash), Some(version)) = (&profile.passcode_hash, profile.passcode_pepper_version)
    else {
        return Err(CoreError::Unauthorized("No passcode is set for this profile".into()).into());
    };

    if verify_passcode(&body.passcode, hash, version, &state.config.peppers)? {
        // Success wipes the failure row and the profile mirror.
        PasscodeAttemptRepo::clear(&state.pool, profile.id, &ip).await?;
        ProfileRepo::set_locked_until(&state.pool, profile.id, None).await?;
        tracing::info!(profile_id = profile.id, "Passcode verified");
        return Ok(Json(VerifyResponse {
            verified: true,
            profile_id: profile.id,
        }));
    }

    let attempt = PasscodeAttemptRepo::record_failure(&state.pool, profile.id, &ip).await?;
    if let Some(secs) = lockout_duration_secs(attempt.failed_attempts) {
        let locked_until = now + Duration::seconds(secs);
        PasscodeAttemptRepo::set_locked_until(&state.pool, attempt.id, Some(locked_until)).await?;
        ProfileRepo::set_locked_until(&state.pool, profile.id, Some(locked_until)).await?;
        tracing::warn!(
            profile_id = profile.id,
            failed_attempts = attempt.failed_attempts,
            lockout_secs = secs,
            "Passcode lockout engaged"
        );
    } else {
        tracing::info!(
            profile_id = profile.id,
            failed_attempts = attempt.failed_attempts,
            "Passcode verification failed"
        );
    }
    Err(CoreError::Unauthorized("Invalid passcode".into()).into())
}

/// Request body for setting a passcode.
#[derive(Debug, Deserialize)]
pub struct SetPasscodeRequest {
    /// 4 to 8 ASCII digits.
    pub passcode: String,
}

/// PUT /api/v1/profiles/{id}/passcode
///
/// Set or rotate a profile's passcode. The hash is produced under the
/// current pepper version, which is stored alongside it.
pub async fn set_passcode(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<SetPasscodeRequest>,
) -> AppResult<StatusCode> {
    validate_passcode_format(&body.passcode)?;
    let (hash, version) = hash_passcode(&body.passcode, &state.config.peppers)?;

    let updated = ProfileRepo::set_passcode(&state.pool, id, &hash, version).await?;
    if !updated {
        return Err(CoreError::NotFound {
            entity: "Profile",
            id,
        }
        .into());
    }
    tracing::info!(profile_id = id, pepper_version = version, "Passcode updated");
    Ok(StatusCode::NO_CONTENT)
}
