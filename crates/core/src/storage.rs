//! Storage path convention and signed-URL expiry constants.
//!
//! The intake pipeline and the recording-url handler both derive object keys
//! from this module so a re-delivered webhook overwrites the same object
//! instead of accumulating copies.

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default expiry for signed recording GET URLs (seconds).
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 300;

/// Maximum expiry a client may request for a signed URL (seconds).
pub const MAX_SIGNED_URL_TTL_SECS: u64 = 3600;

/// File extension for stored recordings.
pub const RECORDING_EXTENSION: &str = "wav";

// ---------------------------------------------------------------------------
// Object keys
// ---------------------------------------------------------------------------

/// Deterministic object key for a call recording.
///
/// `profiles/{profile_id}/calls/{call_id}.wav` — derived from stable row ids
/// only, so re-processing the same recording writes to the same key.
pub fn recording_object_key(profile_id: DbId, call_id: DbId) -> String {
    format!("profiles/{profile_id}/calls/{call_id}.{RECORDING_EXTENSION}")
}

// ---------------------------------------------------------------------------
// TTL validation
// ---------------------------------------------------------------------------

/// Resolve a requested signed-URL expiry to an effective one.
///
/// `None` falls back to [`DEFAULT_SIGNED_URL_TTL_SECS`]. Zero is rejected;
/// anything above [`MAX_SIGNED_URL_TTL_SECS`] is clamped down to the cap.
pub fn resolve_signed_url_ttl(requested_secs: Option<u64>) -> Result<u64, CoreError> {
    match requested_secs {
        None => Ok(DEFAULT_SIGNED_URL_TTL_SECS),
        Some(0) => Err(CoreError::Validation(
            "Signed URL expiry must be at least 1 second".into(),
        )),
        Some(secs) => Ok(secs.min(MAX_SIGNED_URL_TTL_SECS)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
