//! Speech capture from a platform recognizer
//!
//! A [`Recognizer`] emits raw recognition events. [`SpeechCapture`] reduces
//! one activation's events to exactly one [`CaptureOutcome`], classifying
//! every platform failure so none escape the adapter.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::Result;

/// Recognition language used when none is configured
pub const DEFAULT_LANG: &str = "en-US";

/// Settings passed to the recognizer on every activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    /// BCP 47 language tag
    pub lang: String,
    /// Keep listening after the first final result
    pub continuous: bool,
    /// Deliver partial results while the user is speaking
    pub interim_results: bool,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            lang: DEFAULT_LANG.to_string(),
            continuous: false,
            interim_results: false,
        }
    }
}

/// Raw event from a platform recognizer
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// A final recognition result
    Result {
        transcript: String,
        confidence: Option<f32>,
    },
    /// Platform-reported failure (e.g. `not-allowed`, `no-speech`)
    Error { code: String },
    /// The recognition session ended
    End,
}

/// Platform speech-recognition facility
pub trait Recognizer: Send + Sync {
    /// Begin one recognition session
    ///
    /// Events for the session arrive on the returned channel. The session is
    /// over when `End` is sent or the channel closes.
    ///
    /// # Errors
    ///
    /// Returns error if the platform refuses to start listening
    fn start(&self, options: &RecognitionOptions) -> Result<mpsc::Receiver<RecognitionEvent>>;

    /// Abort the current session without producing a result
    fn abort(&self);
}

/// Classified reason a capture produced no transcript
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The user or platform denied microphone access
    #[error("microphone permission denied")]
    PermissionDenied,

    /// Recognition finished without hearing anything
    #[error("no speech detected")]
    NoSpeechDetected,

    /// Any other platform failure, with the platform's code
    #[error("recognition failed: {0}")]
    RecognitionError(String),
}

impl CaptureError {
    /// Map a platform error code to a capture error
    #[must_use]
    pub fn from_platform_code(code: &str) -> Self {
        match code {
            "not-allowed" | "service-not-allowed" => Self::PermissionDenied,
            "no-speech" => Self::NoSpeechDetected,
            other => Self::RecognitionError(other.to_string()),
        }
    }

    /// Stable machine-readable code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::NoSpeechDetected => "no_speech_detected",
            Self::RecognitionError(_) => "recognition_error",
        }
    }

    /// Message shown to the user
    #[must_use]
    pub const fn status_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "Please allow microphone access to use voice commands.",
            Self::NoSpeechDetected => "No speech detected. Please try speaking again.",
            Self::RecognitionError(_) => "Voice recognition error. Please try again.",
        }
    }
}

/// Result of one capture activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A finalized, non-empty transcript
    Transcript(String),
    /// Capture failed; see the error for why
    Failed(CaptureError),
    /// Capture was stopped before a result arrived
    Cancelled,
}

/// Turns recognizer sessions into transcripts
#[derive(Clone)]
pub struct SpeechCapture {
    recognizer: Arc<dyn Recognizer>,
    options: RecognitionOptions,
}

impl SpeechCapture {
    /// Create a capture adapter over a recognizer
    #[must_use]
    pub fn new(recognizer: Arc<dyn Recognizer>, options: RecognitionOptions) -> Self {
        Self {
            recognizer,
            options,
        }
    }

    /// Options used for each activation
    #[must_use]
    pub const fn options(&self) -> &RecognitionOptions {
        &self.options
    }

    /// Listen once
    ///
    /// Cancelling `cancel` stops the capture: the recognizer is aborted and
    /// [`CaptureOutcome::Cancelled`] is returned.
    pub async fn start(&self, cancel: &CancellationToken) -> CaptureOutcome {
        let mut events = match self.recognizer.start(&self.options) {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(error = %e, "recognizer failed to start");
                return CaptureOutcome::Failed(CaptureError::RecognitionError(e.to_string()));
            }
        };

        tracing::debug!(lang = %self.options.lang, "listening");

        let event = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                self.recognizer.abort();
                tracing::debug!("capture stopped");
                return CaptureOutcome::Cancelled;
            }
            event = events.recv() => event,
        };

        let outcome = match event {
            Some(RecognitionEvent::Result {
                transcript,
                confidence,
            }) => {
                let transcript = transcript.trim();
                if transcript.is_empty() {
                    CaptureOutcome::Failed(CaptureError::NoSpeechDetected)
                } else {
                    tracing::info!(transcript, ?confidence, "speech recognized");
                    CaptureOutcome::Transcript(transcript.to_string())
                }
            }
            Some(RecognitionEvent::Error { code }) => {
                CaptureOutcome::Failed(CaptureError::from_platform_code(&code))
            }
            // Ended without ever producing a result
            Some(RecognitionEvent::End) | None => {
                CaptureOutcome::Failed(CaptureError::NoSpeechDetected)
            }
        };

        if let CaptureOutcome::Failed(e) = &outcome {
            tracing::info!(code = e.code(), error = %e, "capture failed");
        }

        outcome
    }
}
