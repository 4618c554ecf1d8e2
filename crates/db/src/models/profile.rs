//! Protected-profile entity model.

use serde::Serialize;
use sqlx::FromRow;

use callshield_core::automation::AutomationPrefs;
use callshield_core::lexicon::DEFAULT_ALERT_THRESHOLD;
use callshield_core::types::{DbId, Timestamp};

/// Full profile row from the `profiles` table.
///
/// Contains the passcode hash -- NEVER serialize this to API responses
/// directly. Use [`ProfileResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: DbId,
    pub display_name: String,
    /// The provider virtual number assigned to this profile, E.164.
    pub virtual_number: String,
    /// Per-profile alert threshold; `None` falls back to the system default.
    pub alert_threshold: Option<i32>,
    pub notify_push: bool,
    pub notify_sms: bool,
    pub auto_mark_enabled: bool,
    pub auto_block_on_fraud: bool,
    pub auto_trust_on_safe: bool,
    /// Caretaker-curated phrases that dampen the fraud score when present.
    pub safe_phrases: Vec<String>,
    pub passcode_hash: Option<String>,
    pub passcode_pepper_version: Option<i32>,
    pub passcode_locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Profile {
    /// Score at or above which a scored call must raise a fraud alert.
    pub fn effective_alert_threshold(&self) -> i32 {
        self.alert_threshold.unwrap_or(DEFAULT_ALERT_THRESHOLD)
    }

    /// True when at least one notification channel is enabled.
    pub fn any_channel_enabled(&self) -> bool {
        self.notify_push || self.notify_sms
    }

    /// Automation preferences consumed by the actuator.
    pub fn automation_prefs(&self) -> AutomationPrefs {
        AutomationPrefs {
            auto_mark_enabled: self.auto_mark_enabled,
            auto_block_on_fraud: self.auto_block_on_fraud,
            auto_trust_on_safe: self.auto_trust_on_safe,
        }
    }
}

/// Safe profile representation for API responses (no passcode material).
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub id: DbId,
    pub display_name: String,
    pub virtual_number: String,
    pub alert_threshold: Option<i32>,
    pub notify_push: bool,
    pub notify_sms: bool,
    pub auto_mark_enabled: bool,
    pub auto_block_on_fraud: bool,
    pub auto_trust_on_safe: bool,
    pub safe_phrases: Vec<String>,
    pub passcode_locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            display_name: p.display_name,
            virtual_number: p.virtual_number,
            alert_threshold: p.alert_threshold,
            notify_push: p.notify_push,
            notify_sms: p.notify_sms,
            auto_mark_enabled: p.auto_mark_enabled,
            auto_block_on_fraud: p.auto_block_on_fraud,
            auto_trust_on_safe: p.auto_trust_on_safe,
            safe_phrases: p.safe_phrases,
            passcode_locked_until: p.passcode_locked_until,
            created_at: p.created_at,
        }
    }
}
