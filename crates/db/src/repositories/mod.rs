//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod alert_repo;
pub mod blocked_caller_repo;
pub mod call_repo;
pub mod passcode_attempt_repo;
pub mod profile_repo;
pub mod trusted_contact_repo;

pub use alert_repo::AlertRepo;
pub use blocked_caller_repo::BlockedCallerRepo;
pub use call_repo::CallRepo;
pub use passcode_attempt_repo::PasscodeAttemptRepo;
pub use profile_repo::ProfileRepo;
pub use trusted_contact_repo::TrustedContactRepo;
