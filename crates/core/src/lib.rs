//! Pure domain logic for the call screening service.
//!
//! Everything in this crate is deterministic and free of I/O so the scorer,
//! automation rules, and lockout math can be unit-tested without a database
//! or any external collaborator.

pub mod alert;
pub mod automation;
pub mod error;
pub mod lexicon;
pub mod passcode;
pub mod phone;
pub mod scorer;
pub mod storage;
pub mod types;
pub mod voice;
