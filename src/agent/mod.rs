//! Maps assistant agent
//!
//! Intent detection, conversation recording and place lookup behind one
//! entry point, used by the voice session, the HTTP API and the CLI.

mod runner;

pub use runner::{AgentOutcome, AgentReply, MapsAgent};
