//! Voice input and output adapters
//!
//! Capture turns platform recognition events into transcripts; feedback
//! speaks replies through a platform synthesizer. Both take their platform
//! facility as an injected trait object.

mod capture;
mod feedback;
mod recognizer;
mod synth;

pub use capture::{
    CaptureError, CaptureOutcome, DEFAULT_LANG, RecognitionEvent, RecognitionOptions, Recognizer,
    SpeechCapture,
};
pub use feedback::{SpeechSynthesizer, Utterance, VoiceFeedback, VoiceParams};
pub use recognizer::{ConsoleRecognizer, ScriptedRecognizer};
pub use synth::{CommandSynthesizer, RecordingSynthesizer, SynthProgram};
