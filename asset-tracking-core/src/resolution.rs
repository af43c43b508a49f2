//! Resolution preferences for location updates

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Trade-off between location accuracy and battery or bandwidth cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Accuracy {
    Minimum,
    Low,
    Balanced,
    High,
    Maximum,
}

/// Desired quality of the location updates a subscriber wants to receive
///
/// Subscribers send this to the publisher as a preference. The publisher is
/// free to reconcile several subscribers' preferences into the resolution it
/// actually uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub accuracy: Accuracy,
    /// Desired time between updates, in milliseconds
    pub desired_interval_ms: u64,
    /// Minimum distance between updates, in metres
    pub minimum_displacement: f64,
}

impl Resolution {
    pub fn new(accuracy: Accuracy, desired_interval: Duration, minimum_displacement: f64) -> Self {
        Self {
            accuracy,
            desired_interval_ms: u64::try_from(desired_interval.as_millis()).unwrap_or(u64::MAX),
            minimum_displacement,
        }
    }

    pub fn desired_interval(&self) -> Duration {
        Duration::from_millis(self.desired_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desired_interval_round_trips_through_millis() {
        let resolution = Resolution::new(Accuracy::Balanced, Duration::from_secs(5), 10.0);
        assert_eq!(resolution.desired_interval_ms, 5000);
        assert_eq!(resolution.desired_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_oversized_interval_saturates() {
        let resolution = Resolution::new(Accuracy::Low, Duration::MAX, 0.0);
        assert_eq!(resolution.desired_interval_ms, u64::MAX);
    }

    #[test]
    fn test_accuracy_ordering() {
        assert!(Accuracy::Minimum < Accuracy::Balanced);
        assert!(Accuracy::High < Accuracy::Maximum);
    }

    #[test]
    fn test_serialized_field_names() {
        let resolution = Resolution::new(Accuracy::High, Duration::from_millis(1500), 2.5);
        let json = serde_json::to_value(resolution).unwrap();
        assert_eq!(json["accuracy"], "HIGH");
        assert_eq!(json["desiredIntervalMs"], 1500);
        assert_eq!(json["minimumDisplacement"], 2.5);
    }
}
