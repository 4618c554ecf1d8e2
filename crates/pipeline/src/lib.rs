//! The call-intake pipeline: webhook-driven orchestration from "a recording
//! is ready" to a persisted fraud verdict, plus the automation actuator that
//! converts verdicts and feedback into caller-list mutations.

pub mod automation;
pub mod intake;

pub use automation::AutomationActuator;
pub use intake::{IntakeError, IntakeOutcome, RecordingIntake, RecordingNotice, ScoringConfig};
