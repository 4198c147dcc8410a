//! Alerting layer: who is watching which place, what have they already been told, and how
//! do we reach them.
//!
//! Data flows one way:
//!
//! ```text
//! feed snapshot -> proximity filter -> per-recipient dedup -> delivery sink
//! ```
//!
//! The registry is the only shared mutable state.  Connection lifecycle (who registers and
//! unregisters, and when) belongs to the embedding program, typically on connect/disconnect
//! of some transport we do not care about here.
//!

pub use notification::*;
pub use poller::*;
pub use registry::*;
pub use sink::*;

mod notification;
mod poller;
mod registry;
mod sink;

pub fn version() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
