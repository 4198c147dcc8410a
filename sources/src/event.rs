//! Feed-neutral event model.
//!

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use temblor_common::Location;

/// A single located, magnitude-bearing event out of a feed snapshot.
///
/// `id` is the feed's own identifier, opaque to us.  We rely on it being stable across
/// polls for the same physical event, which is what the dedup logic keys on.
///
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct QuakeEvent {
    /// Feed identifier, e.g. "us7000abcd"
    pub id: String,
    /// Epicenter
    pub location: Location,
    /// Magnitude (usually Richter-ish, feed-dependent)
    pub magnitude: f64,
    /// Human-readable label, e.g. "63 km SSE of Sand Point, Alaska"
    pub place: String,
    /// Event time
    pub time: DateTime<Utc>,
}
