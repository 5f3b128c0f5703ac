//! Intent classification integration tests

use voicemaps::{Intent, MockPlaceLookup, classify};

#[test]
fn test_restaurant_keywords_any_case() {
    for transcript in ["Find a RESTAURANT", "I want food", "where can I eat", "Good FOOD nearby"] {
        let result = classify(transcript);
        assert_eq!(result.intent, Intent::FindRestaurants, "{transcript}");

        let query = result.map_query.unwrap();
        let places = MockPlaceLookup::places_for(&query);
        assert_eq!(places[0].name, "Neon Bistro");
    }
}

#[test]
fn test_gas_and_coffee_keywords() {
    assert_eq!(classify("low on FUEL").intent, Intent::FindGasStations);
    assert_eq!(classify("gas please").intent, Intent::FindGasStations);
    assert_eq!(classify("a quiet cafe").intent, Intent::FindCoffee);
    assert_eq!(classify("Coffee time").intent, Intent::FindCoffee);
}

#[test]
fn test_restaurant_beats_coffee() {
    let result = classify("a restaurant that also serves coffee");
    assert_eq!(result.intent, Intent::FindRestaurants);
}

#[test]
fn test_eat_matches_inside_words() {
    // Plain substring matching: "great" contains "eat"
    assert_eq!(classify("great parks").intent, Intent::FindRestaurants);
}

#[test]
fn test_general_search_uses_transcript() {
    let result = classify("museums downtown");
    assert_eq!(result.intent, Intent::GeneralSearch);
    assert_eq!(result.map_query.as_deref(), Some("museums downtown"));
    assert_eq!(
        result.response,
        "I heard \"museums downtown\". Let me search the maps for you..."
    );
}

#[test]
fn test_find_me_a_coffee_shop() {
    let result = classify("find me a coffee shop");
    assert_eq!(result.intent, Intent::FindCoffee);
    assert!(result.response.contains("find me a coffee shop"));

    let places = MockPlaceLookup::places_for(result.map_query.as_deref().unwrap());
    assert_eq!(places.len(), 3);
    assert!(places.iter().any(|p| p.name == "Blue Bottle Coffee"));
}

#[test]
fn test_i_need_gas_hours() {
    let result = classify("I need gas");
    assert_eq!(result.intent, Intent::FindGasStations);

    let places = MockPlaceLookup::places_for(result.map_query.as_deref().unwrap());
    for place in places {
        assert!(
            place.hours == "24/7" || place.hours.contains(" - "),
            "unexpected hours {}",
            place.hours
        );
    }
}

#[test]
fn test_serialized_intent_names() {
    let json = serde_json::to_value(classify("coffee")).unwrap();
    assert_eq!(json["intent"], "find_coffee");
    assert_eq!(json["map_query"], "coffee shops near me");
}
