//! Keyword intent classification
//!
//! A transcript is lower-cased and tested against an ordered rule table.
//! The first rule with a contained keyword wins; there is no scoring.

use serde::{Deserialize, Serialize};

/// Purpose of a voice command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Looking for somewhere to eat
    FindRestaurants,
    /// Looking for fuel
    FindGasStations,
    /// Looking for coffee
    FindCoffee,
    /// Anything else; the transcript is searched as-is
    GeneralSearch,
}

impl Intent {
    /// Stable identifier, matching the serialized form
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FindRestaurants => "find_restaurants",
            Self::FindGasStations => "find_gas_stations",
            Self::FindCoffee => "find_coffee",
            Self::GeneralSearch => "general_search",
        }
    }

    /// Keyword bucket test shared by the classifier and the place lookup
    #[must_use]
    pub fn detect(text: &str) -> Self {
        matching_rule(text).map_or(Self::GeneralSearch, |rule| rule.intent)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: Intent,
    /// Human-readable reply, echoing the transcript
    pub response: String,
    /// Query handed to the place lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_query: Option<String>,
}

/// One row of the classification table
struct IntentRule {
    intent: Intent,
    keywords: &'static [&'static str],
    map_query: &'static str,
    respond: fn(&str) -> String,
}

impl IntentRule {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k))
    }
}

/// Evaluated in order; first match wins
const RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::FindRestaurants,
        keywords: &["restaurant", "food", "eat"],
        map_query: "restaurants near me",
        respond: |t| {
            format!("I found 3 amazing restaurants for you! Searching for places matching \"{t}\"...")
        },
    },
    IntentRule {
        intent: Intent::FindGasStations,
        keywords: &["gas", "fuel"],
        map_query: "gas stations near me",
        respond: |t| format!("Finding gas stations for you! Searching for \"{t}\"..."),
    },
    IntentRule {
        intent: Intent::FindCoffee,
        keywords: &["coffee", "cafe"],
        map_query: "coffee shops near me",
        respond: |t| format!("Looking for coffee shops! Searching for \"{t}\"..."),
    },
];

/// First rule whose keywords appear in `text`, ignoring case
fn matching_rule(text: &str) -> Option<&'static IntentRule> {
    let lower = text.to_lowercase();
    RULES.iter().find(|rule| rule.matches(&lower))
}

fn general_response(transcript: &str) -> String {
    format!("I heard \"{transcript}\". Let me search the maps for you...")
}

/// Classify a transcript into an intent with a templated response
#[must_use]
pub fn classify(transcript: &str) -> IntentResult {
    let result = matching_rule(transcript).map_or_else(
        || IntentResult {
            intent: Intent::GeneralSearch,
            response: general_response(transcript),
            map_query: Some(transcript.to_string()),
        },
        |rule| IntentResult {
            intent: rule.intent,
            response: (rule.respond)(transcript),
            map_query: Some(rule.map_query.to_string()),
        },
    );

    tracing::debug!(intent = %result.intent, transcript, "classified command");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_order_is_priority_order() {
        let order: Vec<Intent> = RULES.iter().map(|r| r.intent).collect();
        assert_eq!(
            order,
            [
                Intent::FindRestaurants,
                Intent::FindGasStations,
                Intent::FindCoffee
            ]
        );
    }

    #[test]
    fn test_detect_is_case_insensitive() {
        assert_eq!(Intent::detect("FUEL please"), Intent::FindGasStations);
        assert_eq!(Intent::detect("Best CAFE"), Intent::FindCoffee);
        assert_eq!(Intent::detect("Restaurants"), Intent::FindRestaurants);
    }

    #[test]
    fn test_substring_containment() {
        // "eat" inside another word still counts
        assert_eq!(Intent::detect("a great view"), Intent::FindRestaurants);
    }

    #[test]
    fn test_detect_agrees_with_classify() {
        for text in ["Where can I EAT", "fuel up", "cafe latte", "museums", "", "gas and coffee"] {
            assert_eq!(Intent::detect(text), classify(text).intent, "{text}");
        }
    }

    #[test]
    fn test_general_search_echoes_transcript() {
        let result = classify("Golden Gate Bridge");
        assert_eq!(result.intent, Intent::GeneralSearch);
        assert_eq!(result.map_query.as_deref(), Some("Golden Gate Bridge"));
        assert_eq!(
            result.response,
            "I heard \"Golden Gate Bridge\". Let me search the maps for you..."
        );
    }

    #[test]
    fn test_fixed_map_queries() {
        assert_eq!(
            classify("hungry for food").map_query.as_deref(),
            Some("restaurants near me")
        );
        assert_eq!(
            classify("low on gas").map_query.as_deref(),
            Some("gas stations near me")
        );
        assert_eq!(
            classify("coffee time").map_query.as_deref(),
            Some("coffee shops near me")
        );
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&Intent::FindGasStations).unwrap();
        assert_eq!(json, "\"find_gas_stations\"");
        assert_eq!(Intent::FindCoffee.to_string(), "find_coffee");
    }
}
