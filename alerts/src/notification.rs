//! The notification view handed to sinks.
//!

use serde::Serialize;
use temblor_sources::{Nearby, QuakeEvent};

/// One event worth telling a recipient about, annotated with how far away it is.  Produced
/// transiently for a single delivery, never retained.
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notification {
    pub event: QuakeEvent,
    pub distance_km: f64,
}

impl Notification {
    /// The one-line alert text used by the messaging sinks.
    ///
    pub fn message(&self) -> String {
        format!(
            "Earthquake Alert! {}, Magnitude: {}, Distance: {:.2} km",
            self.event.place, self.event.magnitude, self.distance_km
        )
    }
}

impl From<Nearby> for Notification {
    fn from(value: Nearby) -> Self {
        Notification {
            event: value.event,
            distance_km: value.distance_km,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use temblor_common::Location;

    use super::*;

    #[test]
    fn test_notification_message() {
        let n = Notification {
            event: QuakeEvent {
                id: "us7000zzzz".to_string(),
                location: Location::new(54.8022, -160.3011),
                magnitude: 4.5,
                place: "63 km SSE of Sand Point, Alaska".to_string(),
                time: DateTime::from_timestamp_millis(1722469200000).unwrap(),
            },
            distance_km: 42.4242,
        };

        assert_eq!(
            "Earthquake Alert! 63 km SSE of Sand Point, Alaska, Magnitude: 4.5, Distance: 42.42 km",
            n.message()
        );
    }
}
