//! `VoiceMaps` - Voice-controlled map search assistant
//!
//! This library provides the pieces of the assistant:
//! - Speech capture and classified capture errors
//! - Keyword intent classification
//! - Place lookup (a canned backend)
//! - Per-session conversation history
//! - Spoken feedback through a host synthesizer
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Interfaces                        │
//! │        Console (listen)  │  HTTP API  │  CLI         │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │           VoiceSession / CycleTracker                │
//! │   Capture  │  Feedback  │  Supersede                │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                  MapsAgent                           │
//! │   Intent  │  ConversationLog  │  PlaceLookup        │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod agent;
pub mod api;
pub mod capability;
pub mod config;
pub mod conversation;
pub mod cycle;
pub mod error;
pub mod intent;
pub mod places;
pub mod session;
pub mod voice;

pub use agent::{AgentOutcome, AgentReply, MapsAgent};
pub use capability::Capability;
pub use config::Config;
pub use conversation::ConversationLog;
pub use cycle::{Cycle, CycleRegistry, CycleTracker};
pub use error::{Error, Result};
pub use intent::{Intent, IntentResult, classify};
pub use places::{MockPlaceLookup, PlaceLookup, PlaceRecord};
pub use session::{CaptureState, SessionOutcome, VoiceSession};
