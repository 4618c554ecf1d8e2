//! REST client for the telephony provider.
//!
//! Covers exactly what the intake pipeline needs from the provider: a
//! synchronous call-metadata lookup (to fill fields a webhook delivery
//! omitted) and the raw recording download. Everything else the provider
//! API offers is out of scope.

pub mod client;
pub mod config;

pub use client::{CallMetadata, RecordingProvider, TelephonyClient, TelephonyError};
pub use config::TelephonyConfig;
