//! Command handling shared by every host

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::conversation::ConversationLog;
use crate::intent::{self, Intent, IntentResult};
use crate::places::{PlaceLookup, PlaceRecord};

/// Everything produced by one successful command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentReply {
    pub session_id: String,
    pub transcript: String,
    pub intent: Intent,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_query: Option<String>,
    pub location: String,
    pub places: Vec<PlaceRecord>,
}

impl AgentReply {
    pub(crate) fn new(
        session_id: &str,
        transcript: &str,
        result: IntentResult,
        location: &str,
        places: Vec<PlaceRecord>,
    ) -> Self {
        Self {
            session_id: session_id.to_string(),
            transcript: transcript.to_string(),
            intent: result.intent,
            response: result.response,
            map_query: result.map_query,
            location: location.to_string(),
            places,
        }
    }
}

/// How a command run ended
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutcome {
    /// The run completed and its result is current
    Reply(AgentReply),
    /// A newer run (or a stop) cancelled this one; its result was discarded
    Superseded,
}

/// Classifies commands, records them, and looks up matching places
pub struct MapsAgent {
    places: Arc<dyn PlaceLookup>,
    log: Arc<ConversationLog>,
    default_location: String,
}

impl MapsAgent {
    #[must_use]
    pub fn new(
        places: Arc<dyn PlaceLookup>,
        log: Arc<ConversationLog>,
        default_location: impl Into<String>,
    ) -> Self {
        Self {
            places,
            log,
            default_location: default_location.into(),
        }
    }

    /// Location used when a command does not name one
    #[must_use]
    pub fn default_location(&self) -> &str {
        &self.default_location
    }

    /// Shared conversation log
    #[must_use]
    pub const fn log(&self) -> &Arc<ConversationLog> {
        &self.log
    }

    /// Classify without recording anything
    #[must_use]
    pub fn classify(&self, transcript: &str) -> IntentResult {
        intent::classify(transcript)
    }

    /// Messages recorded for a session
    #[must_use]
    pub fn history(&self, session_id: &str) -> Vec<String> {
        self.log.read(session_id)
    }

    /// Classify a transcript and record the exchange
    ///
    /// The transcript and then the response are appended to the session log.
    pub fn respond(&self, session_id: &str, transcript: &str) -> IntentResult {
        let result = intent::classify(transcript);
        self.log.append(session_id, transcript);
        self.log.append(session_id, result.response.clone());

        tracing::info!(
            session_id,
            intent = %result.intent,
            map_query = ?result.map_query,
            "command classified"
        );
        result
    }

    /// Look up places for a raw query
    ///
    /// # Errors
    ///
    /// Returns error if the place backend fails
    pub async fn lookup(&self, query: &str, location: &str) -> Result<Vec<PlaceRecord>> {
        let places = self.places.search(query, location).await?;
        tracing::debug!(query, location, count = places.len(), "places found");
        Ok(places)
    }

    /// Look up places for a classified command
    ///
    /// Returns `Ok(None)` when `cancel` fires before the lookup completes.
    ///
    /// # Errors
    ///
    /// Returns error if the place backend fails
    pub async fn search(
        &self,
        transcript: &str,
        intent: &IntentResult,
        location: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Vec<PlaceRecord>>> {
        let query = intent.map_query.as_deref().unwrap_or(transcript);

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!(query, "lookup discarded");
                Ok(None)
            }
            places = self.lookup(query, location) => places.map(Some),
        }
    }

    /// Run a full command: classify, record, look up
    ///
    /// # Errors
    ///
    /// Returns error if the place backend fails
    pub async fn handle(
        &self,
        session_id: &str,
        transcript: &str,
        location: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<AgentOutcome> {
        let result = self.respond(session_id, transcript);
        let location = location.unwrap_or(self.default_location.as_str());

        let Some(places) = self.search(transcript, &result, location, cancel).await? else {
            tracing::info!(session_id, "command superseded before lookup finished");
            return Ok(AgentOutcome::Superseded);
        };

        Ok(AgentOutcome::Reply(AgentReply::new(
            session_id, transcript, result, location, places,
        )))
    }
}
