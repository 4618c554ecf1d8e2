//! Speech collaborators: the speech-to-text service client and the offline
//! synthetic-voice detector subprocess runner.
//!
//! Both are best-effort collaborators by contract: a missing transcript and
//! an unavailable detector are valid states the pipeline carries on from,
//! never pipeline-fatal errors.

pub mod detector;
pub mod transcribe;

pub use detector::{DetectorConfig, RawNetDetector, VoiceScreener};
pub use transcribe::{SpeechConfig, SpeechError, SpeechToText, Transcription, TranscriptionClient};
