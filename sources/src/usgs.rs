//! USGS GeoJSON summary feed, wire format.
//!
//! See <https://earthquake.usgs.gov/earthquakes/feed/v1.0/geojson.php> for the format
//! description.  We only map the few fields we care about, the feed carries much more.
//!
//! Gotchas:
//! - `geometry.coordinates` is GeoJSON, i.e. longitude first, then latitude, then depth.
//! - `properties.mag` can be null for events still being reviewed.  Those can never pass a
//!   magnitude threshold so they are dropped during conversion.
//!

use chrono::DateTime;
use serde::Deserialize;
use tracing::{trace, warn};

use temblor_common::Location;

use crate::QuakeEvent;

/// Top-level `FeatureCollection`
///
#[derive(Clone, Debug, Deserialize)]
pub struct UsgsSummary {
    pub metadata: Option<UsgsMetadata>,
    pub features: Vec<UsgsFeature>,
}

/// Feed metadata, only used for logging
///
#[derive(Clone, Debug, Deserialize)]
pub struct UsgsMetadata {
    pub generated: Option<i64>,
    pub title: Option<String>,
    pub count: Option<usize>,
}

/// One `Feature` out of the collection
///
#[derive(Clone, Debug, Deserialize)]
pub struct UsgsFeature {
    pub id: String,
    pub properties: UsgsProperties,
    pub geometry: UsgsGeometry,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UsgsProperties {
    pub mag: Option<f64>,
    pub place: Option<String>,
    /// Milliseconds since the UNIX epoch
    pub time: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UsgsGeometry {
    /// \[lon, lat, depth\]
    pub coordinates: Vec<f64>,
}

impl UsgsSummary {
    /// Convert a full snapshot into our event model, dropping unusable features.
    ///
    #[tracing::instrument(skip(self))]
    pub fn into_events(self) -> Vec<QuakeEvent> {
        if let Some(meta) = &self.metadata {
            trace!(
                "snapshot {:?}, {} features",
                meta.title,
                self.features.len()
            );
        }
        self.features
            .into_iter()
            .filter_map(UsgsFeature::into_event)
            .collect()
    }
}

impl UsgsFeature {
    fn into_event(self) -> Option<QuakeEvent> {
        let magnitude = match self.properties.mag {
            Some(mag) => mag,
            None => {
                trace!("{}: no magnitude yet, skipped", self.id);
                return None;
            }
        };

        // GeoJSON order: lon first.
        //
        let (lon, lat) = match self.geometry.coordinates[..] {
            [lon, lat, ..] => (lon, lat),
            _ => {
                warn!("{}: malformed coordinates, skipped", self.id);
                return None;
            }
        };

        let time = DateTime::from_timestamp_millis(self.properties.time).unwrap_or_default();

        Some(QuakeEvent {
            id: self.id,
            location: Location::new(lat, lon),
            magnitude,
            place: self.properties.place.unwrap_or_default(),
            time,
        })
    }
}
