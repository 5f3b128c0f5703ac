//! Place lookup
//!
//! [`MockPlaceLookup`] serves fixed San Francisco results chosen by the same
//! keyword buckets as the intent classifier, after an artificial delay that
//! stands in for a network round trip.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::intent::Intent;

/// Location used when a caller does not name one
pub const DEFAULT_LOCATION: &str = "San Francisco, CA";

/// Delay applied by the mock lookup before results are returned
pub const DEFAULT_LOOKUP_DELAY: Duration = Duration::from_millis(1500);

/// A point of interest returned by a place search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub name: String,
    pub address: String,
    pub rating: f64,
    pub hours: String,
    pub distance: String,
    pub lat: f64,
    pub lng: f64,
}

/// Place search backend
///
/// A backend that talks to a real service reports outages as
/// [`crate::Error::LookupUnavailable`].
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    /// Search for places matching `query` around `location`
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot answer
    async fn search(&self, query: &str, location: &str) -> Result<Vec<PlaceRecord>>;
}

/// Static place tables keyed by keyword bucket
#[derive(Debug, Clone)]
pub struct MockPlaceLookup {
    delay: Duration,
}

impl Default for MockPlaceLookup {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_DELAY)
    }
}

impl MockPlaceLookup {
    /// Create a lookup that waits `delay` before answering
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Configured artificial latency
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Results for a query without the delay
    #[must_use]
    pub fn places_for(query: &str) -> Vec<PlaceRecord> {
        table_for(Intent::detect(query))
            .iter()
            .map(StaticPlace::to_record)
            .collect()
    }
}

#[async_trait]
impl PlaceLookup for MockPlaceLookup {
    async fn search(&self, query: &str, location: &str) -> Result<Vec<PlaceRecord>> {
        tracing::debug!(query, location, "searching places");

        let places = Self::places_for(query);
        tokio::time::sleep(self.delay).await;

        tracing::info!(query, count = places.len(), "found places");
        Ok(places)
    }
}

struct StaticPlace {
    name: &'static str,
    address: &'static str,
    rating: f64,
    hours: &'static str,
    distance: &'static str,
    lat: f64,
    lng: f64,
}

impl StaticPlace {
    fn to_record(&self) -> PlaceRecord {
        PlaceRecord {
            name: self.name.to_string(),
            address: self.address.to_string(),
            rating: self.rating,
            hours: self.hours.to_string(),
            distance: self.distance.to_string(),
            lat: self.lat,
            lng: self.lng,
        }
    }
}

const fn table_for(intent: Intent) -> &'static [StaticPlace; 3] {
    match intent {
        Intent::FindRestaurants => &RESTAURANTS,
        Intent::FindGasStations => &GAS_STATIONS,
        Intent::FindCoffee => &COFFEE_SHOPS,
        Intent::GeneralSearch => &GENERAL,
    }
}

const RESTAURANTS: [StaticPlace; 3] = [
    StaticPlace {
        name: "Neon Bistro",
        address: "123 Mission St, San Francisco, CA",
        rating: 4.5,
        hours: "Open until 2 AM",
        distance: "0.3 miles",
        lat: 37.7749,
        lng: -122.4194,
    },
    StaticPlace {
        name: "Golden Gate Grill",
        address: "456 Union Square, San Francisco, CA",
        rating: 4.7,
        hours: "Open until 11 PM",
        distance: "0.5 miles",
        lat: 37.7849,
        lng: -122.4094,
    },
    StaticPlace {
        name: "Fisherman's Table",
        address: "789 Pier 39, San Francisco, CA",
        rating: 4.3,
        hours: "Open until midnight",
        distance: "0.8 miles",
        lat: 37.8085,
        lng: -122.4098,
    },
];

const GAS_STATIONS: [StaticPlace; 3] = [
    StaticPlace {
        name: "Shell Station",
        address: "321 Van Ness Ave, San Francisco, CA",
        rating: 4.1,
        hours: "24/7",
        distance: "0.2 miles",
        lat: 37.7849,
        lng: -122.4194,
    },
    StaticPlace {
        name: "Chevron",
        address: "654 Lombard St, San Francisco, CA",
        rating: 4.0,
        hours: "6 AM - 10 PM",
        distance: "0.4 miles",
        lat: 37.8021,
        lng: -122.4094,
    },
    StaticPlace {
        name: "76 Gas Station",
        address: "987 Geary Blvd, San Francisco, CA",
        rating: 3.9,
        hours: "24/7",
        distance: "0.6 miles",
        lat: 37.7849,
        lng: -122.4394,
    },
];

const COFFEE_SHOPS: [StaticPlace; 3] = [
    StaticPlace {
        name: "Blue Bottle Coffee",
        address: "66 Mint St, San Francisco, CA",
        rating: 4.6,
        hours: "6 AM - 6 PM",
        distance: "0.1 miles",
        lat: 37.7849,
        lng: -122.4094,
    },
    StaticPlace {
        name: "Philz Coffee",
        address: "201 Berry St, San Francisco, CA",
        rating: 4.4,
        hours: "5 AM - 8 PM",
        distance: "0.3 miles",
        lat: 37.7749,
        lng: -122.3994,
    },
    StaticPlace {
        name: "Ritual Coffee Roasters",
        address: "1026 Valencia St, San Francisco, CA",
        rating: 4.5,
        hours: "6 AM - 7 PM",
        distance: "0.7 miles",
        lat: 37.7549,
        lng: -122.4194,
    },
];

const GENERAL: [StaticPlace; 3] = [
    StaticPlace {
        name: "SF Local Spot",
        address: "555 Market St, San Francisco, CA",
        rating: 4.2,
        hours: "9 AM - 9 PM",
        distance: "0.4 miles",
        lat: 37.7749,
        lng: -122.4194,
    },
    StaticPlace {
        name: "Bay Area Favorite",
        address: "777 Castro St, San Francisco, CA",
        rating: 4.6,
        hours: "10 AM - 10 PM",
        distance: "0.6 miles",
        lat: 37.7649,
        lng: -122.4294,
    },
    StaticPlace {
        name: "Golden City Place",
        address: "888 Haight St, San Francisco, CA",
        rating: 4.3,
        hours: "8 AM - 11 PM",
        distance: "0.9 miles",
        lat: 37.7699,
        lng: -122.4494,
    },
];
