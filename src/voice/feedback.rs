//! Spoken feedback
//!
//! [`VoiceFeedback`] dispatches a reply to a [`SpeechSynthesizer`] and returns
//! at once. When the host has no synthesizer the call does nothing.

use std::sync::Arc;

use serde::Serialize;

use crate::Result;
use crate::capability::Capability;

/// Fixed voice parameters applied to every utterance
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoiceParams {
    /// Speaking rate multiplier (1.0 = normal)
    pub rate: f32,
    /// Pitch multiplier (1.0 = normal)
    pub pitch: f32,
    /// Volume, 0.0 to 1.0
    pub volume: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            rate: 0.9,
            pitch: 1.1,
            volume: 0.8,
        }
    }
}

impl VoiceParams {
    /// Clamp each parameter into the range speech engines accept
    ///
    /// Non-finite values are replaced by the default for that parameter.
    #[must_use]
    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        Self {
            rate: clamp_finite(self.rate, 0.1, 10.0, defaults.rate),
            pitch: clamp_finite(self.pitch, 0.0, 2.0, defaults.pitch),
            volume: clamp_finite(self.volume, 0.0, 1.0, defaults.volume),
        }
    }
}

fn clamp_finite(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// A single piece of text to speak
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub params: VoiceParams,
}

/// Platform speech-synthesis facility
pub trait SpeechSynthesizer: Send + Sync {
    /// Queue an utterance for playback without waiting for it to finish
    ///
    /// # Errors
    ///
    /// Returns error if the utterance could not be dispatched
    fn speak(&self, utterance: Utterance) -> Result<()>;
}

/// Speaks assistant replies
#[derive(Clone)]
pub struct VoiceFeedback {
    synthesizer: Capability<Arc<dyn SpeechSynthesizer>>,
    params: VoiceParams,
    lang: String,
}

impl VoiceFeedback {
    #[must_use]
    pub fn new(
        synthesizer: Capability<Arc<dyn SpeechSynthesizer>>,
        params: VoiceParams,
        lang: impl Into<String>,
    ) -> Self {
        Self {
            synthesizer,
            params: params.clamped(),
            lang: lang.into(),
        }
    }

    /// Feedback backed by a synthesizer known to be present
    #[must_use]
    pub fn with_synthesizer(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        params: VoiceParams,
        lang: impl Into<String>,
    ) -> Self {
        Self::new(Capability::Supported(synthesizer), params, lang)
    }

    /// Feedback that never speaks
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(
            Capability::unsupported("voice output disabled"),
            VoiceParams::default(),
            super::DEFAULT_LANG,
        )
    }

    /// Whether a synthesizer is present
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.synthesizer.is_supported()
    }

    /// Voice parameters in use
    #[must_use]
    pub const fn params(&self) -> VoiceParams {
        self.params
    }

    /// Speak `text`, fire-and-forget
    pub fn speak(&self, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        let Some(synthesizer) = self.synthesizer.get() else {
            tracing::trace!("speech synthesis unsupported, skipping");
            return;
        };

        let utterance = Utterance {
            text: text.to_string(),
            lang: self.lang.clone(),
            params: self.params,
        };

        match synthesizer.speak(utterance) {
            Ok(()) => tracing::debug!(chars = text.len(), "voice output dispatched"),
            Err(e) => tracing::warn!(error = %e, "voice output failed"),
        }
    }
}
