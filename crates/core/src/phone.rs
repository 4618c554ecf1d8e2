//! Phone number canonicalization and the caller hash.
//!
//! Block/trust/history tables never store raw phone numbers; they are keyed
//! by a deterministic SHA-256 digest of the canonical E.164-ish form so the
//! same caller always joins to the same rows regardless of how the provider
//! formatted the number on a given delivery.

use sha2::{Digest, Sha256};

/// Reduce a phone number to a canonical comparable form.
///
/// Keeps digits only, then re-applies a single leading `+`. Ten-digit
/// numbers are assumed to be NANP and get a `1` country code so
/// `(555) 867-5309` and `+15558675309` canonicalize identically.
pub fn canonicalize_number(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        10 => format!("+1{digits}"),
        11 if digits.starts_with('1') => format!("+{digits}"),
        _ => format!("+{digits}"),
    }
}

/// Compute the deterministic caller hash for a raw phone number.
///
/// This is the join key for the blocked/trusted tables and for
/// caller-history counting. It is a plain one-way digest, not an HMAC:
/// the threat model is "don't store raw numbers in list tables", not
/// resistance to offline enumeration.
pub fn caller_hash(raw_number: &str) -> String {
    let canonical = canonicalize_number(raw_number);
    let digest = Sha256::digest(canonical.as_bytes());
    format!("{digest:x}")
}
