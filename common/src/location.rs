//! Location related module
//!
//! A `Location` is a plain WGS84 lat/lon pair in degrees.  The only operation we need on it
//! is the great-circle distance between two points, used to decide whether a seismic event
//! is close enough to a watched place.
//!

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.;

/// Actual location
///
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Location {
    /// Latitude in degrees, [-90, 90]
    pub lat: f64,
    /// Longitude in degrees, [-180, 180]
    pub lon: f64,
}

impl Location {
    /// Basic `new()`
    ///
    pub fn new(lat: f64, lon: f64) -> Self {
        Location { lat, lon }
    }

    /// Great-circle distance to `other` in kilometers, haversine formula.
    ///
    /// Symmetric, zero for identical points.  Out-of-range or NaN coordinates are the
    /// caller's problem, NaN propagates.
    ///
    pub fn distance_km(&self, other: &Location) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
            + self.lat.to_radians().cos()
                * other.lat.to_radians().cos()
                * (d_lon / 2.0).sin()
                * (d_lon / 2.0).sin();

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }
}
