//! Module to deal with the different kind of seismic feeds we can connect to to fetch events.
//!
//! A feed always returns a full snapshot of the current events, there is no incremental or
//! delta fetch.  Deduplication against what a given recipient has already seen is the concern
//! of the alerting layer, not of the feed.
//!

// Re-export these modules for a shorter import path.
//
pub use error::*;
pub use event::*;
pub use feed::*;
pub use filter::*;
pub use usgs::*;

mod error;
mod event;
mod feed;
mod filter;
mod usgs;

pub fn version() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
