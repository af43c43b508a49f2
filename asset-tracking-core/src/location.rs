//! Location payloads delivered to subscribers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single geographic fix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    /// Horizontal accuracy radius in metres
    pub accuracy: f64,
    /// Bearing in degrees, clockwise from north
    pub bearing: f64,
    /// Speed in metres per second
    pub speed: f64,
    pub timestamp: DateTime<Utc>,
}

impl Location {
    /// Creates a location at the given coordinates, timestamped now
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: 0.0,
            accuracy: 0.0,
            bearing: 0.0,
            speed: 0.0,
            timestamp: Utc::now(),
        }
    }
}

/// Whether an enhanced update was observed or extrapolated by the publisher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationUpdateType {
    Predicted,
    Actual,
}

/// Map-matched location published by the publisher side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedLocationUpdate {
    pub location: Location,
    /// Fixes the publisher dropped since the previous update
    #[serde(default)]
    pub skipped_locations: Vec<Location>,
    #[serde(rename = "type")]
    pub update_type: LocationUpdateType,
}

impl EnhancedLocationUpdate {
    pub fn actual(location: Location) -> Self {
        Self {
            location,
            skipped_locations: Vec::new(),
            update_type: LocationUpdateType::Actual,
        }
    }
}
