//! The polling/dedup/fan-out loop.
//!
//! One timer, one loop: fetch the feed snapshot once, then walk a registry snapshot and
//! give every recipient the events that are close enough, strong enough and not already
//! delivered to it.  The loop is either idle or running exactly one cycle; a timer tick
//! that fires while a cycle is still in progress is dropped, not queued, so a slow upstream
//! never piles up concurrent fetches.
//!
//! Failure handling, by taxonomy:
//! - feed failure: the cycle ends, nobody is notified, the next cycle starts fresh;
//! - sink failure: logged, the events are still marked delivered so a broken channel is
//!   not hammered with the same alerts on every cycle.  One attempt per (recipient, event)
//!   per registration lifetime, period.
//!

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, trace, warn};

use temblor_sources::{nearby, FeedError, Feedable};

use crate::{AlertSink, Notification, Registry};

/// Fixed parameters of the loop, externally configured.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PollParams {
    /// Time between two cycles
    pub every: Duration,
    /// Proximity radius in km
    pub radius_km: f64,
    /// Minimum magnitude, inclusive
    pub min_magnitude: f64,
}

impl Default for PollParams {
    fn default() -> Self {
        PollParams {
            every: Duration::from_secs(300),
            radius_km: 100.,
            min_magnitude: 4.,
        }
    }
}

/// What happened during one cycle, for logging.
///
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CycleStats {
    pub events: usize,
    pub recipients: usize,
    pub delivered: usize,
    pub failed: usize,
}

impl Display for CycleStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "events={} recipients={} delivered={} failed={}",
            self.events, self.recipients, self.delivered, self.failed
        )
    }
}

/// The loop itself, owning shared handles on its three collaborators.
///
#[derive(Debug)]
pub struct Poller {
    feed: Arc<dyn Feedable>,
    registry: Arc<Registry>,
    sink: Arc<dyn AlertSink>,
    params: PollParams,
}

impl Poller {
    pub fn new(
        feed: Arc<dyn Feedable>,
        registry: Arc<Registry>,
        sink: Arc<dyn AlertSink>,
        params: PollParams,
    ) -> Self {
        Poller {
            feed,
            registry,
            sink,
            params,
        }
    }

    /// Run cycles forever.  The first one fires right away, the embedding program decides
    /// when to stop us (usually by select!-ing against a shutdown signal).
    ///
    pub async fn run(&self) {
        info!(
            "polling {} every {}s, radius {} km, magnitude >= {}",
            self.feed.name(),
            self.params.every.as_secs(),
            self.params.radius_km,
            self.params.min_magnitude
        );

        let mut timer = interval(self.params.every);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            timer.tick().await;
            match self.cycle().await {
                Ok(stats) => info!("cycle done: {stats}"),
                Err(e) => warn!("cycle aborted: {e}"),
            }
        }
    }

    /// One complete cycle: fetch once, fan out to every registered recipient.
    ///
    #[tracing::instrument(skip(self))]
    pub async fn cycle(&self) -> Result<CycleStats, FeedError> {
        trace!("enter");

        // Fetched once, shared by all recipients of this cycle.
        //
        let events = self.feed.fetch().await?;

        let mut stats = CycleStats {
            events: events.len(),
            ..Default::default()
        };

        for reg in self.registry.snapshot() {
            stats.recipients += 1;

            let fresh: Vec<Notification> =
                nearby(&reg.location, self.params.radius_km, self.params.min_magnitude, &events)
                    .into_iter()
                    .filter(|hit| !reg.delivered.contains(&hit.event.id))
                    .map(Notification::from)
                    .collect();

            if fresh.is_empty() {
                continue;
            }

            let ids: Vec<String> = fresh.iter().map(|n| n.event.id.clone()).collect();

            match self.sink.deliver(&reg.id, &fresh).await {
                Ok(()) => stats.delivered += fresh.len(),
                Err(e) => {
                    stats.failed += fresh.len();
                    error!(
                        "delivery to {} through {} failed: {e}",
                        reg.id,
                        self.sink.name()
                    );
                }
            }

            // Marked whether delivery worked or not, see the module header.
            //
            self.registry.mark_delivered(&reg.id, ids);
        }

        Ok(stats)
    }
}
