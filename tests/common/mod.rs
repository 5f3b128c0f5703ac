//! Shared test utilities

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use voicemaps::api::ApiServerBuilder;
use voicemaps::voice::{
    RecognitionOptions, RecordingSynthesizer, ScriptedRecognizer, SpeechCapture, VoiceFeedback,
    VoiceParams,
};
use voicemaps::{Capability, ConversationLog, MapsAgent, MockPlaceLookup, PlaceLookup, VoiceSession};

/// Lookup latency used by pipeline tests (runs under paused time)
pub const LOOKUP_DELAY: Duration = Duration::from_millis(1500);

/// Agent over the canned place data
#[must_use]
pub fn test_agent(delay: Duration) -> Arc<MapsAgent> {
    agent_with(Arc::new(MockPlaceLookup::new(delay)))
}

/// Agent over any place backend
#[must_use]
pub fn agent_with(places: Arc<dyn PlaceLookup>) -> Arc<MapsAgent> {
    Arc::new(MapsAgent::new(
        places,
        Arc::new(ConversationLog::new()),
        "San Francisco, CA",
    ))
}

/// A session with scripted capture and recorded speech
pub struct TestSession {
    pub session: Arc<VoiceSession>,
    pub recognizer: Arc<ScriptedRecognizer>,
    pub synthesizer: Arc<RecordingSynthesizer>,
}

#[must_use]
pub fn test_session(agent: Arc<MapsAgent>) -> TestSession {
    let recognizer = Arc::new(ScriptedRecognizer::new());
    let synthesizer = Arc::new(RecordingSynthesizer::new());

    let capture = Capability::Supported(SpeechCapture::new(
        recognizer.clone(),
        RecognitionOptions::default(),
    ));
    let feedback =
        VoiceFeedback::with_synthesizer(synthesizer.clone(), VoiceParams::default(), "en-US");

    TestSession {
        session: Arc::new(VoiceSession::new("test-session", agent, capture, feedback)),
        recognizer,
        synthesizer,
    }
}

/// API router over a fresh agent
#[must_use]
pub fn test_router(delay: Duration) -> axum::Router {
    ApiServerBuilder::new(test_agent(delay)).build().router()
}
