//! Sub-module to select the events relevant to one watched location.
//!
//! This is a pure function: it never re-fetches, never sorts and keeps the feed order.  If
//! "nearest first" is ever needed it has to be an explicit sort on the caller's side.
//!

use temblor_common::Location;

use crate::QuakeEvent;

/// One event that passed the proximity filter, annotated with the computed distance.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Nearby {
    pub event: QuakeEvent,
    pub distance_km: f64,
}

/// Keep the events within `radius_km` of `origin` and at least `min_magnitude` strong.
///
/// Both bounds are inclusive.  Output order follows input order.
///
pub fn nearby(
    origin: &Location,
    radius_km: f64,
    min_magnitude: f64,
    events: &[QuakeEvent],
) -> Vec<Nearby> {
    events
        .iter()
        .filter_map(|event| {
            let distance_km = origin.distance_km(&event.location);
            if distance_km <= radius_km && event.magnitude >= min_magnitude {
                Some(Nearby {
                    event: event.clone(),
                    distance_km,
                })
            } else {
                None
            }
        })
        .collect()
}
