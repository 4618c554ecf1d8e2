//! Automation decision rules for caller block/trust lists.
//!
//! This module decides WHAT should happen to a caller's list entries; the
//! pipeline actuator applies the decisions against the database. Keeping the
//! decision pure makes the gating rules (master switch, per-direction flags)
//! trivially testable.

use serde::{Deserialize, Serialize};

use crate::alert::AlertType;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

/// Per-profile automation preferences, as stored on the profile row.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutomationPrefs {
    /// Master switch. Nothing fires when this is off.
    pub auto_mark_enabled: bool,
    /// Block callers on fraud verdicts and fraud feedback.
    pub auto_block_on_fraud: bool,
    /// Trust callers when feedback marks a call safe.
    pub auto_trust_on_safe: bool,
}

// ---------------------------------------------------------------------------
// Block reasons
// ---------------------------------------------------------------------------

/// Why a caller landed on the block list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    /// The scorer crossed the profile's alert threshold.
    AutoFraudScore,
    /// A human marked the call as fraud.
    FeedbackFraud,
    /// Added by hand outside the automation path.
    Manual,
}

impl BlockReason {
    /// Parse a reason string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "auto_fraud_score" => Ok(Self::AutoFraudScore),
            "feedback_fraud" => Ok(Self::FeedbackFraud),
            "manual" => Ok(Self::Manual),
            _ => Err(CoreError::Validation(format!(
                "Invalid block reason '{s}'. Must be one of: auto_fraud_score, feedback_fraud, manual"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoFraudScore => "auto_fraud_score",
            Self::FeedbackFraud => "feedback_fraud",
            Self::Manual => "manual",
        }
    }
}

// ---------------------------------------------------------------------------
// Feedback status
// ---------------------------------------------------------------------------

/// Human feedback recorded against a scored call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    MarkedSafe,
    MarkedFraud,
    Reviewed,
    Archived,
}

impl FeedbackStatus {
    /// Parse a feedback status string from a request or the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "marked_safe" => Ok(Self::MarkedSafe),
            "marked_fraud" => Ok(Self::MarkedFraud),
            "reviewed" => Ok(Self::Reviewed),
            "archived" => Ok(Self::Archived),
            _ => Err(CoreError::Validation(format!(
                "Invalid feedback status '{s}'. Must be one of: marked_safe, marked_fraud, reviewed, archived"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MarkedSafe => "marked_safe",
            Self::MarkedFraud => "marked_fraud",
            Self::Reviewed => "reviewed",
            Self::Archived => "archived",
        }
    }

    /// The alert type this feedback retags an existing alert to, if any.
    ///
    /// `reviewed` and `archived` resolve alerts without changing their type.
    pub fn alert_retag(&self) -> Option<AlertType> {
        match self {
            Self::MarkedSafe => Some(AlertType::Safe),
            Self::MarkedFraud => Some(AlertType::Fraud),
            Self::Reviewed | Self::Archived => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// A single list mutation the actuator should apply, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationAction {
    /// Delete any trusted-contact entry for the caller.
    RemoveTrusted,
    /// Upsert a blocked-caller entry.
    BlockCaller { reason: BlockReason },
    /// Delete any blocked-caller entry for the caller.
    RemoveBlocked,
    /// Upsert a trusted-contact entry.
    TrustCaller,
}

/// Actions to apply when the pipeline lands a fraud verdict.
///
/// The trusted entry is removed before the block is written so the caller is
/// never on both lists, even transiently.
pub fn automation_on_verdict(prefs: &AutomationPrefs) -> Vec<AutomationAction> {
    if !prefs.auto_mark_enabled || !prefs.auto_block_on_fraud {
        return Vec::new();
    }
    vec![
        AutomationAction::RemoveTrusted,
        AutomationAction::BlockCaller {
            reason: BlockReason::AutoFraudScore,
        },
    ]
}

/// Actions to apply when human feedback is recorded.
pub fn automation_on_feedback(
    prefs: &AutomationPrefs,
    feedback: FeedbackStatus,
) -> Vec<AutomationAction> {
    if !prefs.auto_mark_enabled {
        return Vec::new();
    }
    match feedback {
        FeedbackStatus::MarkedFraud if prefs.auto_block_on_fraud => vec![
            AutomationAction::RemoveTrusted,
            AutomationAction::BlockCaller {
                reason: BlockReason::FeedbackFraud,
            },
        ],
        FeedbackStatus::MarkedSafe if prefs.auto_trust_on_safe => vec![
            AutomationAction::RemoveBlocked,
            AutomationAction::TrustCaller,
        ],
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
