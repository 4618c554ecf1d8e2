//! Automation actuator: applies the pure decision rules from
//! `callshield_core::automation` against the caller-list tables.
//!
//! Everything here is best-effort by contract. Automation runs after the
//! action that triggered it (a persisted verdict or a recorded feedback
//! write) has already succeeded, so a failed list write is logged and
//! swallowed rather than rolled back into the caller's response.

use callshield_core::automation::{
    automation_on_feedback, automation_on_verdict, AutomationAction, FeedbackStatus,
};
use callshield_core::types::DbId;
use callshield_db::models::call::Call;
use callshield_db::models::profile::Profile;
use callshield_db::repositories::{AlertRepo, BlockedCallerRepo, TrustedContactRepo};
use callshield_db::DbPool;

/// Applies automation decisions to the block/trust lists and alert rows.
pub struct AutomationActuator;

impl AutomationActuator {
    /// React to a fraud verdict from the intake pipeline.
    ///
    /// Returns the number of list mutations that succeeded.
    pub async fn on_verdict(pool: &DbPool, profile: &Profile, caller_hash: &str) -> u32 {
        let actions = automation_on_verdict(&profile.automation_prefs());
        Self::apply_actions(pool, profile.id, caller_hash, &actions).await
    }

    /// React to human feedback on a call: resolve and retag its alerts,
    /// then apply any list mutations the feedback calls for.
    pub async fn on_feedback(
        pool: &DbPool,
        profile: &Profile,
        call: &Call,
        feedback: FeedbackStatus,
    ) {
        // Alerts resolve on any feedback, automation-enabled or not; a
        // human looked at the call, so there is nothing left to surface.
        match AlertRepo::resolve_for_call(pool, call.id).await {
            Ok(resolved) if resolved > 0 => {
                tracing::info!(call_id = call.id, resolved, "Alerts resolved by feedback");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(call_id = call.id, error = %e, "Alert resolution failed");
            }
        }
        if let Some(retag) = feedback.alert_retag() {
            if let Err(e) = AlertRepo::retag_for_call(pool, call.id, retag).await {
                tracing::error!(call_id = call.id, error = %e, "Alert retag failed");
            }
        }

        let Some(hash) = call.caller_hash.as_deref() else {
            return;
        };
        let actions = automation_on_feedback(&profile.automation_prefs(), feedback);
        Self::apply_actions(pool, profile.id, hash, &actions).await;
    }

    /// Apply a decided action list in order, logging failures and carrying
    /// on. The ordering matters: the opposing list entry is removed before
    /// the new one is written so a caller is never on both lists.
    async fn apply_actions(
        pool: &DbPool,
        profile_id: DbId,
        caller_hash: &str,
        actions: &[AutomationAction],
    ) -> u32 {
        let mut applied = 0;
        for action in actions {
            let result: Result<(), sqlx::Error> = match action {
                AutomationAction::RemoveTrusted => {
                    TrustedContactRepo::remove(pool, profile_id, caller_hash)
                        .await
                        .map(|_| ())
                }
                AutomationAction::BlockCaller { reason } => {
                    BlockedCallerRepo::upsert(pool, profile_id, caller_hash, reason.as_str())
                        .await
                        .map(|_| ())
                }
                AutomationAction::RemoveBlocked => {
                    BlockedCallerRepo::remove(pool, profile_id, caller_hash)
                        .await
                        .map(|_| ())
                }
                AutomationAction::TrustCaller => {
                    TrustedContactRepo::upsert(pool, profile_id, caller_hash, None)
                        .await
                        .map(|_| ())
                }
            };
            match result {
                Ok(()) => {
                    applied += 1;
                    tracing::info!(profile_id, ?action, "Automation action applied");
                }
                Err(e) => {
                    tracing::error!(profile_id, ?action, error = %e, "Automation action failed");
                }
            }
        }
        applied
    }
}
