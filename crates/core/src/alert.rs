//! Alert type and status enumerations shared by the repository layer and the
//! automation actuator.
//!
//! Alert rows are keyed by `(call_id, alert_type)`, so the string forms here
//! double as half of the uniqueness key and must never change once persisted.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Alert type
// ---------------------------------------------------------------------------

/// What an alert is about.
///
/// `Fraud` alerts are raised by the intake pipeline when a scored call crosses
/// the profile's alert threshold. Feedback can later retag them to `Safe` or
/// keep them `Fraud`. `SyntheticVoice` alerts come from the offline deepfake
/// detector and live alongside the fraud alert for the same call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Fraud,
    Safe,
    SyntheticVoice,
}

impl AlertType {
    /// Parse an alert type string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "fraud" => Ok(Self::Fraud),
            "safe" => Ok(Self::Safe),
            "synthetic_voice" => Ok(Self::SyntheticVoice),
            _ => Err(CoreError::Validation(format!(
                "Invalid alert type '{s}'. Must be one of: fraud, safe, synthetic_voice"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fraud => "fraud",
            Self::Safe => "safe",
            Self::SyntheticVoice => "synthetic_voice",
        }
    }
}

// ---------------------------------------------------------------------------
// Alert status
// ---------------------------------------------------------------------------

/// Lifecycle status of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    /// Raised and not yet seen by anyone.
    Pending,
    /// A caretaker has seen the alert.
    Acknowledged,
    /// Closed, either manually or by feedback on the underlying call.
    Resolved,
}

impl AlertStatus {
    /// Parse a status string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "acknowledged" => Ok(Self::Acknowledged),
            "resolved" => Ok(Self::Resolved),
            _ => Err(CoreError::Validation(format!(
                "Invalid alert status '{s}'. Must be one of: pending, acknowledged, resolved"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Acknowledged => "acknowledged",
            Self::Resolved => "resolved",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
