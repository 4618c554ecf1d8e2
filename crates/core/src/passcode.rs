//! Peppered passcode hashing and the failed-attempt lockout schedule.
//!
//! Passcode hashes use Argon2id in PHC string format, keyed with a
//! server-held pepper. Peppers are versioned: each stored hash records the
//! pepper version that produced it, and verification looks the pepper up by
//! that stored version, so rotating the current pepper never invalidates
//! existing passcodes.

use std::collections::HashMap;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Consecutive failures at which a lockout begins.
pub const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Lockout durations in seconds, indexed by `failed_attempts - MAX_FAILED_ATTEMPTS`.
/// Failures past the end of the table stay at the final entry.
const LOCKOUT_BACKOFF_SECS: &[i64] = &[30, 300, 900, 1800, 3600];

/// Minimum passcode length (digits).
pub const MIN_PASSCODE_LENGTH: usize = 4;

/// Maximum passcode length (digits).
pub const MAX_PASSCODE_LENGTH: usize = 8;

// ---------------------------------------------------------------------------
// Pepper set
// ---------------------------------------------------------------------------

/// The set of known pepper secrets, keyed by version.
///
/// Parsed from a `"1:secret_a,2:secret_b"` spec string. New hashes always use
/// the configured current version; verification uses whichever version the
/// stored hash carries.
#[derive(Debug, Clone)]
pub struct PepperSet {
    peppers: HashMap<i32, String>,
    current_version: i32,
}

impl PepperSet {
    /// Parse a pepper spec string and select the current version.
    ///
    /// The spec is a comma-separated list of `version:secret` entries. The
    /// current version must appear in the list and no secret may be empty.
    pub fn parse(spec: &str, current_version: i32) -> Result<Self, CoreError> {
        let mut peppers = HashMap::new();
        for entry in spec.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (version_str, secret) = entry.split_once(':').ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid pepper entry '{entry}'. Expected 'version:secret'"
                ))
            })?;
            let version: i32 = version_str.trim().parse().map_err(|_| {
                CoreError::Validation(format!("Invalid pepper version '{version_str}'"))
            })?;
            if secret.is_empty() {
                return Err(CoreError::Validation(format!(
                    "Pepper version {version} has an empty secret"
                )));
            }
            if peppers.insert(version, secret.to_string()).is_some() {
                return Err(CoreError::Validation(format!(
                    "Pepper version {version} appears more than once"
                )));
            }
        }
        if peppers.is_empty() {
            return Err(CoreError::Validation(
                "Pepper spec contains no entries".into(),
            ));
        }
        if !peppers.contains_key(&current_version) {
            return Err(CoreError::Validation(format!(
                "Current pepper version {current_version} is not in the pepper spec"
            )));
        }
        Ok(Self {
            peppers,
            current_version,
        })
    }

    /// The version new hashes are produced under.
    pub fn current_version(&self) -> i32 {
        self.current_version
    }

    /// The secret for the current version.
    pub fn current_secret(&self) -> &str {
        &self.peppers[&self.current_version]
    }

    /// Look up a secret by stored version.
    pub fn secret_for(&self, version: i32) -> Option<&str> {
        self.peppers.get(&version).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Build an Argon2id instance keyed with the given pepper.
fn peppered_argon2(pepper: &str) -> Result<Argon2<'_>, CoreError> {
    Argon2::new_with_secret(
        pepper.as_bytes(),
        Algorithm::Argon2id,
        Version::V0x13,
        Params::default(),
    )
    .map_err(|e| CoreError::Internal(format!("Argon2 setup failed: {e}")))
}

/// Hash a passcode under the pepper set's current version.
///
/// Returns the PHC hash string and the pepper version it was produced under;
/// both must be stored together.
pub fn hash_passcode(passcode: &str, peppers: &PepperSet) -> Result<(String, i32), CoreError> {
    let argon2 = peppered_argon2(peppers.current_secret())?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(passcode.as_bytes(), &salt)
        .map_err(|e| CoreError::Internal(format!("Passcode hashing failed: {e}")))?;
    Ok((hash.to_string(), peppers.current_version()))
}

/// Verify a passcode against a stored hash and its recorded pepper version.
///
/// Returns `Ok(false)` both for a wrong passcode and for an unknown pepper
/// version; an unknown version means the hash can never verify, which callers
/// treat the same as a mismatch.
pub fn verify_passcode(
    passcode: &str,
    stored_hash: &str,
    stored_version: i32,
    peppers: &PepperSet,
) -> Result<bool, CoreError> {
    let Some(secret) = peppers.secret_for(stored_version) else {
        return Ok(false);
    };
    let argon2 = peppered_argon2(secret)?;
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| CoreError::Internal(format!("Stored passcode hash is malformed: {e}")))?;
    match argon2.verify_password(passcode.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CoreError::Internal(format!(
            "Passcode verification failed: {e}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Format validation
// ---------------------------------------------------------------------------

/// Validate that a passcode is 4 to 8 ASCII digits.
pub fn validate_passcode_format(passcode: &str) -> Result<(), CoreError> {
    let digits_only = passcode.chars().all(|c| c.is_ascii_digit());
    if !digits_only || passcode.len() < MIN_PASSCODE_LENGTH || passcode.len() > MAX_PASSCODE_LENGTH
    {
        return Err(CoreError::Validation(format!(
            "Passcode must be {MIN_PASSCODE_LENGTH} to {MAX_PASSCODE_LENGTH} digits"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Lockout schedule
// ---------------------------------------------------------------------------

/// Lockout duration for a consecutive-failure count.
///
/// `None` below [`MAX_FAILED_ATTEMPTS`]. From the threshold on, each further
/// failure steps through the backoff table; failures past the end of the
/// table keep the final one-hour duration.
pub fn lockout_duration_secs(failed_attempts: i32) -> Option<i64> {
    if failed_attempts < MAX_FAILED_ATTEMPTS {
        return None;
    }
    let index = (failed_attempts - MAX_FAILED_ATTEMPTS) as usize;
    Some(LOCKOUT_BACKOFF_SECS[index.min(LOCKOUT_BACKOFF_SECS.len() - 1)])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_peppers() -> PepperSet {
        PepperSet::parse("1:old_pepper_secret,2:new_pepper_secret", 2).unwrap()
    }

    // -- Pepper set --------------------------------------------------------

    #[test]
    fn parse_reads_versions_and_secrets() {
        let set = test_peppers();
        assert_eq!(set.current_version(), 2);
        assert_eq!(set.current_secret(), "new_pepper_secret");
        assert_eq!(set.secret_for(1), Some("old_pepper_secret"));
        assert_eq!(set.secret_for(3), None);
    }

    #[test]
    fn parse_rejects_missing_current_version() {
        let err = PepperSet::parse("1:secret", 2).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn parse_rejects_empty_spec() {
        assert!(PepperSet::parse("", 1).is_err());
        assert!(PepperSet::parse(" , ,", 1).is_err());
    }

    #[test]
    fn parse_rejects_duplicate_versions() {
        assert!(PepperSet::parse("1:a,1:b", 1).is_err());
    }

    #[test]
    fn parse_rejects_malformed_entries() {
        assert!(PepperSet::parse("no_colon_here", 1).is_err());
        assert!(PepperSet::parse("x:secret", 1).is_err());
        assert!(PepperSet::parse("1:", 1).is_err());
    }

    // -- Hashing and verification ------------------------------------------

    #[test]
    fn hash_and_verify_round_trip() {
        let peppers = test_peppers();
        let (hash, version) = hash_passcode("4821", &peppers).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert_eq!(version, 2);
        assert!(verify_passcode("4821", &hash, version, &peppers).unwrap());
    }

    #[test]
    fn wrong_passcode_fails_verification() {
        let peppers = test_peppers();
        let (hash, version) = hash_passcode("4821", &peppers).unwrap();
        assert!(!verify_passcode("1234", &hash, version, &peppers).unwrap());
    }

    #[test]
    fn old_pepper_version_still_verifies_after_rotation() {
        // Hash under version 1, then verify with a set whose current is 2.
        let old = PepperSet::parse("1:old_pepper_secret", 1).unwrap();
        let (hash, version) = hash_passcode("4821", &old).unwrap();
        assert_eq!(version, 1);

        let rotated = test_peppers();
        assert!(verify_passcode("4821", &hash, version, &rotated).unwrap());
    }

    #[test]
    fn hash_under_wrong_pepper_fails_verification() {
        // Same PHC hash, different secret: Argon2 output differs.
        let peppers = test_peppers();
        let (hash, _) = hash_passcode("4821", &peppers).unwrap();
        assert!(!verify_passcode("4821", &hash, 1, &peppers).unwrap());
    }

    #[test]
    fn unknown_stored_version_verifies_false() {
        let peppers = test_peppers();
        let (hash, _) = hash_passcode("4821", &peppers).unwrap();
        assert!(!verify_passcode("4821", &hash, 99, &peppers).unwrap());
    }

    // -- Format validation -------------------------------------------------

    #[test]
    fn valid_passcode_lengths_pass() {
        assert!(validate_passcode_format("1234").is_ok());
        assert!(validate_passcode_format("12345678").is_ok());
    }

    #[test]
    fn out_of_range_lengths_fail() {
        assert!(validate_passcode_format("123").is_err());
        assert!(validate_passcode_format("123456789").is_err());
    }

    #[test]
    fn non_digit_passcodes_fail() {
        assert!(validate_passcode_format("12a4").is_err());
        assert!(validate_passcode_format("12 4").is_err());
        assert!(validate_passcode_format("").is_err());
    }

    // -- Lockout schedule --------------------------------------------------

    #[test]
    fn no_lockout_below_threshold() {
        assert_eq!(lockout_duration_secs(0), None);
        assert_eq!(lockout_duration_secs(4), None);
    }

    #[test]
    fn lockout_steps_through_backoff_table() {
        assert_eq!(lockout_duration_secs(5), Some(30));
        assert_eq!(lockout_duration_secs(6), Some(300));
        assert_eq!(lockout_duration_secs(7), Some(900));
        assert_eq!(lockout_duration_secs(8), Some(1800));
        assert_eq!(lockout_duration_secs(9), Some(3600));
    }

    #[test]
    fn lockout_saturates_at_one_hour() {
        assert_eq!(lockout_duration_secs(10), Some(3600));
        assert_eq!(lockout_duration_secs(50), Some(3600));
    }
}
