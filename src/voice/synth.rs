//! Speech synthesizer implementations

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Mutex, PoisonError};

use super::feedback::{SpeechSynthesizer, Utterance};
use crate::capability::Capability;
use crate::{Error, Result};

/// Words per minute at a rate multiplier of 1.0
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// Host text-to-speech programs, in order of preference
const CANDIDATES: &[(&str, SynthProgram)] = &[
    ("espeak-ng", SynthProgram::Espeak),
    ("espeak", SynthProgram::Espeak),
    ("say", SynthProgram::Say),
];

/// Command-line dialect of a TTS program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthProgram {
    /// `espeak` / `espeak-ng`: rate, pitch and amplitude flags
    Espeak,
    /// macOS `say`: rate only
    Say,
}

/// Speaks through a host text-to-speech program
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    path: PathBuf,
    program: SynthProgram,
}

impl CommandSynthesizer {
    #[must_use]
    pub const fn new(path: PathBuf, program: SynthProgram) -> Self {
        Self { path, program }
    }

    /// Locate the first available TTS program on `PATH`
    #[must_use]
    pub fn detect() -> Capability<Self> {
        for (name, program) in CANDIDATES {
            if let Ok(path) = which::which(name) {
                tracing::info!(program = name, path = %path.display(), "found speech synthesizer");
                return Capability::Supported(Self::new(path, *program));
            }
        }

        tracing::info!("no speech synthesizer found, voice output disabled");
        Capability::unsupported("no text-to-speech program on PATH")
    }

    /// Program arguments for an utterance
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn args(&self, utterance: &Utterance) -> Vec<String> {
        let params = utterance.params;
        let wpm = (BASE_WORDS_PER_MINUTE * params.rate).round() as u32;

        match self.program {
            SynthProgram::Espeak => {
                // espeak pitch is 0-99 with 50 as normal; amplitude 0-200 with 100 as normal
                let pitch = (50.0 * params.pitch).round().clamp(0.0, 99.0) as u32;
                let amplitude = (100.0 * params.volume).round().clamp(0.0, 200.0) as u32;
                vec![
                    "-v".to_string(),
                    utterance.lang.to_lowercase(),
                    "-s".to_string(),
                    wpm.to_string(),
                    "-p".to_string(),
                    pitch.to_string(),
                    "-a".to_string(),
                    amplitude.to_string(),
                    "--".to_string(),
                    utterance.text.clone(),
                ]
            }
            SynthProgram::Say => vec![
                "-r".to_string(),
                wpm.to_string(),
                "--".to_string(),
                utterance.text.clone(),
            ],
        }
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn speak(&self, utterance: Utterance) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::Synthesis(format!("no async runtime: {e}")))?;

        let mut child = tokio::process::Command::new(&self.path)
            .args(self.args(&utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Synthesis(format!("failed to start {}: {e}", self.path.display())))?;

        // Reap the child in the background so the caller is not held up
        runtime.spawn(async move {
            match child.wait().await {
                Ok(status) if !status.success() => {
                    tracing::warn!(%status, "speech synthesizer exited with error");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "failed to wait for speech synthesizer"),
            }
        });

        Ok(())
    }
}

/// Keeps dispatched utterances in memory instead of playing them
#[derive(Debug, Default)]
pub struct RecordingSynthesizer {
    spoken: Mutex<Vec<Utterance>>,
}

impl RecordingSynthesizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Utterances dispatched so far
    #[must_use]
    pub fn utterances(&self) -> Vec<Utterance> {
        self.spoken
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SpeechSynthesizer for RecordingSynthesizer {
    fn speak(&self, utterance: Utterance) -> Result<()> {
        tracing::debug!(text = %utterance.text, "recorded utterance");
        self.spoken
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(utterance);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::VoiceParams;

    fn utterance(text: &str) -> Utterance {
        Utterance {
            text: text.to_string(),
            lang: "en-US".to_string(),
            params: VoiceParams {
                rate: 2.0,
                pitch: 1.0,
                volume: 0.5,
            },
        }
    }

    #[test]
    fn test_espeak_args() {
        let synth = CommandSynthesizer::new(PathBuf::from("espeak-ng"), SynthProgram::Espeak);
        let args = synth.args(&utterance("hello"));
        assert_eq!(
            args,
            ["-v", "en-us", "-s", "350", "-p", "50", "-a", "50", "--", "hello"]
        );
    }

    #[test]
    fn test_say_args() {
        let synth = CommandSynthesizer::new(PathBuf::from("say"), SynthProgram::Say);
        let args = synth.args(&utterance("-leading dash"));
        assert_eq!(args, ["-r", "350", "--", "-leading dash"]);
    }

    #[test]
    fn test_speak_outside_runtime_fails() {
        let synth = CommandSynthesizer::new(PathBuf::from("say"), SynthProgram::Say);
        assert!(synth.speak(utterance("hi")).is_err());
    }
}
