//! Voice session
//!
//! One user-facing session: toggles capture, tracks [`CaptureState`], and
//! runs capture → classify → speak → lookup as one cancellable cycle.
//! Starting a new cycle supersedes the previous one, so a slow lookup can
//! never overwrite the result of a newer command.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::agent::{AgentReply, MapsAgent};
use crate::capability::Capability;
use crate::cycle::{Cycle, CycleTracker};
use crate::voice::{CaptureError, CaptureOutcome, SpeechCapture, VoiceFeedback};

/// Status shown when the host has no speech recognizer
pub const UNSUPPORTED_MESSAGE: &str = "Voice recognition is not supported on this device.";

/// Status shown when the place backend fails
pub const LOOKUP_FAILED_MESSAGE: &str = "Map search is unavailable right now. Please try again.";

/// What the session is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    Idle,
    Listening,
    Processing,
}

/// How one session cycle ended
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// Command answered
    Reply(AgentReply),
    /// No answer; a message for the user
    Status(String),
    /// Stopped by the user
    Cancelled,
    /// Replaced by a newer cycle; the result was discarded
    Superseded,
}

/// A voice-driven session against the maps agent
pub struct VoiceSession {
    session_id: String,
    location: String,
    capture: Capability<SpeechCapture>,
    agent: Arc<MapsAgent>,
    feedback: VoiceFeedback,
    state: watch::Sender<CaptureState>,
    cycles: CycleTracker,
}

impl VoiceSession {
    #[must_use]
    pub fn new(
        session_id: impl Into<String>,
        agent: Arc<MapsAgent>,
        capture: Capability<SpeechCapture>,
        feedback: VoiceFeedback,
    ) -> Self {
        let (state, _) = watch::channel(CaptureState::Idle);
        Self {
            session_id: session_id.into(),
            location: agent.default_location().to_string(),
            capture,
            agent,
            feedback,
            state,
            cycles: CycleTracker::new(),
        }
    }

    /// Search around `location` instead of the agent default
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Current capture state
    #[must_use]
    pub fn state(&self) -> CaptureState {
        *self.state.borrow()
    }

    /// Watch capture state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CaptureState> {
        self.state.subscribe()
    }

    /// Whether speech capture is available
    #[must_use]
    pub const fn can_listen(&self) -> bool {
        self.capture.is_supported()
    }

    /// Messages recorded for this session
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.agent.history(&self.session_id)
    }

    /// Mic button: stop while listening, otherwise start a new cycle
    ///
    /// Returns `None` when the press stopped an active capture.
    pub async fn toggle(&self) -> Option<SessionOutcome> {
        if self.state() == CaptureState::Listening {
            self.stop();
            return None;
        }
        Some(self.listen().await)
    }

    /// Capture one command and answer it
    pub async fn listen(&self) -> SessionOutcome {
        let Some(capture) = self.capture.get() else {
            tracing::debug!(reason = ?self.capture.reason(), "capture unsupported");
            return SessionOutcome::Status(UNSUPPORTED_MESSAGE.to_string());
        };

        let cycle = self.cycles.begin();
        self.set_state(CaptureState::Listening);

        match capture.start(cycle.token()).await {
            CaptureOutcome::Transcript(transcript) => self.process(&cycle, &transcript).await,
            CaptureOutcome::Failed(e) => {
                self.settle(&cycle);
                SessionOutcome::Status(e.status_message().to_string())
            }
            CaptureOutcome::Cancelled => self.interrupted(&cycle),
        }
    }

    /// Answer a typed command, skipping capture
    pub async fn submit(&self, transcript: &str) -> SessionOutcome {
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return SessionOutcome::Status(
                CaptureError::NoSpeechDetected.status_message().to_string(),
            );
        }

        let cycle = self.cycles.begin();
        self.process(&cycle, transcript).await
    }

    /// Cancel the active capture or lookup
    ///
    /// Returns whether anything was running.
    pub fn stop(&self) -> bool {
        let stopped = self.cycles.cancel();
        if stopped {
            self.set_state(CaptureState::Idle);
        }
        stopped
    }

    async fn process(&self, cycle: &Cycle, transcript: &str) -> SessionOutcome {
        self.set_state(CaptureState::Processing);

        let result = self.agent.respond(&self.session_id, transcript);
        self.feedback.speak(&result.response);

        match self
            .agent
            .search(transcript, &result, &self.location, cycle.token())
            .await
        {
            Ok(Some(places)) => {
                if !self.settle(cycle) {
                    return SessionOutcome::Superseded;
                }
                SessionOutcome::Reply(AgentReply::new(
                    &self.session_id,
                    transcript,
                    result,
                    &self.location,
                    places,
                ))
            }
            Ok(None) => self.interrupted(cycle),
            Err(e) => {
                tracing::warn!(session_id = %self.session_id, error = %e, "place lookup failed");
                self.settle(cycle);
                SessionOutcome::Status(LOOKUP_FAILED_MESSAGE.to_string())
            }
        }
    }

    /// Finish `cycle`, returning to idle only if it is still current
    fn settle(&self, cycle: &Cycle) -> bool {
        let current = self.cycles.finish(cycle.id());
        if current {
            self.set_state(CaptureState::Idle);
        }
        current
    }

    /// Classify why a cycle's token fired
    fn interrupted(&self, cycle: &Cycle) -> SessionOutcome {
        match self.cycles.active() {
            Some(newer) if newer != cycle.id() => {
                tracing::debug!(cycle = cycle.id(), newer, "result discarded");
                SessionOutcome::Superseded
            }
            _ => SessionOutcome::Cancelled,
        }
    }

    fn set_state(&self, state: CaptureState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            tracing::debug!(session_id = %self.session_id, ?previous, ?state, "capture state");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::conversation::ConversationLog;
    use crate::places::{DEFAULT_LOCATION, MockPlaceLookup};
    use crate::voice::{RecognitionOptions, ScriptedRecognizer};

    fn session(recognizer: Option<Arc<ScriptedRecognizer>>) -> VoiceSession {
        let agent = Arc::new(MapsAgent::new(
            Arc::new(MockPlaceLookup::new(Duration::ZERO)),
            Arc::new(ConversationLog::new()),
            DEFAULT_LOCATION,
        ));
        let capture: Capability<SpeechCapture> = match recognizer {
            Some(r) => Capability::Supported(SpeechCapture::new(r, RecognitionOptions::default())),
            None => Capability::unsupported("test"),
        };
        VoiceSession::new("test-session", agent, capture, VoiceFeedback::disabled())
    }

    #[tokio::test]
    async fn test_unsupported_capture_reports_status() {
        let session = session(None);
        assert!(!session.can_listen());
        assert_eq!(
            session.listen().await,
            SessionOutcome::Status(UNSUPPORTED_MESSAGE.to_string())
        );
        assert_eq!(session.state(), CaptureState::Idle);
    }

    #[tokio::test]
    async fn test_submit_blank_is_no_speech() {
        let session = session(None);
        assert_eq!(
            session.submit("  ").await,
            SessionOutcome::Status("No speech detected. Please try speaking again.".to_string())
        );
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_stop_when_idle_is_noop() {
        let session = session(None);
        assert!(!session.stop());
        assert_eq!(session.state(), CaptureState::Idle);
    }

    #[tokio::test]
    async fn test_state_returns_to_idle_after_reply() {
        let recognizer = Arc::new(ScriptedRecognizer::new());
        recognizer.push_transcript("coffee please");
        let session = session(Some(recognizer));

        let outcome = session.listen().await;
        assert!(matches!(outcome, SessionOutcome::Reply(_)));
        assert_eq!(session.state(), CaptureState::Idle);
    }
}
