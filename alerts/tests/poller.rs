//! End-to-end cycle scenarios with a scripted feed and a recording sink.
//!

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::DateTime;

use temblor_alerts::{AlertSink, Notification, PollParams, Poller, Registry, SinkError};
use temblor_common::Location;
use temblor_sources::{FeedError, Feedable, QuakeEvent};

/// Chennai, the place all scenario recipients watch.
const ORIGIN: Location = Location {
    lat: 13.0827,
    lon: 80.2707,
};

fn quake(id: &str, lat: f64, lon: f64, magnitude: f64) -> QuakeEvent {
    QuakeEvent {
        id: id.to_string(),
        location: Location::new(lat, lon),
        magnitude,
        place: format!("near {id}"),
        time: DateTime::from_timestamp_millis(1722469200000).unwrap(),
    }
}

/// A few km from the origin, passes a 100 km radius easily.
fn close_quake(id: &str, magnitude: f64) -> QuakeEvent {
    quake(id, 13.05, 80.25, magnitude)
}

/// Replays pre-scripted snapshots, one per cycle.  `None` plays a broken upstream.
///
#[derive(Debug, Default)]
struct ScriptedFeed {
    snapshots: Mutex<VecDeque<Option<Vec<QuakeEvent>>>>,
}

impl ScriptedFeed {
    fn new(snapshots: Vec<Option<Vec<QuakeEvent>>>) -> Self {
        ScriptedFeed {
            snapshots: Mutex::new(snapshots.into()),
        }
    }
}

#[async_trait]
impl Feedable for ScriptedFeed {
    fn name(&self) -> String {
        "scripted".to_string()
    }

    async fn fetch(&self) -> Result<Vec<QuakeEvent>, FeedError> {
        match self.snapshots.lock().unwrap().pop_front() {
            Some(Some(events)) => Ok(events),
            Some(None) => Err(FeedError::Status(502)),
            None => Ok(vec![]),
        }
    }
}

/// Records every deliver call, optionally failing them all.
///
#[derive(Debug, Default)]
struct RecordingSink {
    calls: Mutex<Vec<(String, Vec<String>)>>,
    failing: AtomicBool,
}

impl RecordingSink {
    fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    fn name(&self) -> String {
        "recording".to_string()
    }

    async fn deliver(&self, recipient: &str, batch: &[Notification]) -> Result<(), SinkError> {
        let ids = batch.iter().map(|n| n.event.id.clone()).collect();
        self.calls
            .lock()
            .unwrap()
            .push((recipient.to_string(), ids));

        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError::Status(500));
        }
        Ok(())
    }
}

fn poller(
    feed: ScriptedFeed,
    registry: Arc<Registry>,
    sink: Arc<RecordingSink>,
) -> Poller {
    let params = PollParams {
        radius_km: 100.,
        min_magnitude: 4.,
        ..Default::default()
    };
    Poller::new(Arc::new(feed), registry, sink, params)
}

#[tokio::test]
async fn test_no_redelivery_across_cycles() {
    let e1 = close_quake("E1", 4.5);
    let e2 = close_quake("E2", 5.1);

    // Cycle 1 sees E1, cycle 2 sees E1 again plus the new E2.
    //
    let feed = ScriptedFeed::new(vec![
        Some(vec![e1.clone()]),
        Some(vec![e1, e2]),
    ]);
    let registry = Arc::new(Registry::new());
    registry.register("r", ORIGIN);
    let sink = Arc::new(RecordingSink::default());
    let poller = poller(feed, registry, Arc::clone(&sink));

    poller.cycle().await.unwrap();
    poller.cycle().await.unwrap();

    assert_eq!(
        vec![
            ("r".to_string(), vec!["E1".to_string()]),
            ("r".to_string(), vec!["E2".to_string()]),
        ],
        sink.calls()
    );
}

#[tokio::test]
async fn test_reregistration_resets_dedup() {
    let e1 = close_quake("E1", 4.5);

    let feed = ScriptedFeed::new(vec![
        Some(vec![e1.clone()]),
        Some(vec![e1.clone()]),
        Some(vec![e1]),
    ]);
    let registry = Arc::new(Registry::new());
    registry.register("r", ORIGIN);
    let sink = Arc::new(RecordingSink::default());
    let poller = poller(feed, Arc::clone(&registry), Arc::clone(&sink));

    // Cycle 1 delivers, cycle 2 is deduped.
    //
    poller.cycle().await.unwrap();
    poller.cycle().await.unwrap();
    assert_eq!(1, sink.calls().len());

    // Disconnect/reconnect: fresh delivered-set, E1 is eligible again.
    //
    registry.unregister("r");
    registry.register("r", ORIGIN);
    poller.cycle().await.unwrap();
    assert_eq!(2, sink.calls().len());
}

#[tokio::test]
async fn test_fetch_failure_aborts_cycle_only() {
    let e1 = close_quake("E1", 4.5);

    let feed = ScriptedFeed::new(vec![None, Some(vec![e1])]);
    let registry = Arc::new(Registry::new());
    registry.register("r", ORIGIN);
    let sink = Arc::new(RecordingSink::default());
    let poller = poller(feed, registry, Arc::clone(&sink));

    // Broken upstream: no deliveries, error surfaced.
    //
    assert!(poller.cycle().await.is_err());
    assert!(sink.calls().is_empty());

    // Next cycle is unaffected.
    //
    poller.cycle().await.unwrap();
    assert_eq!(1, sink.calls().len());
}

#[tokio::test]
async fn test_sink_failure_still_marks_delivered() {
    let e1 = close_quake("E1", 4.5);

    let feed = ScriptedFeed::new(vec![Some(vec![e1.clone()]), Some(vec![e1])]);
    let registry = Arc::new(Registry::new());
    registry.register("r", ORIGIN);
    let sink = Arc::new(RecordingSink::default());
    let poller = poller(feed, registry, Arc::clone(&sink));

    // The sink is down for cycle 1; the attempt counts anyway.
    //
    sink.set_failing(true);
    let stats = poller.cycle().await.unwrap();
    assert_eq!(1, stats.failed);

    // Back up for cycle 2: E1 must not be retried.
    //
    sink.set_failing(false);
    let stats = poller.cycle().await.unwrap();
    assert_eq!(0, stats.delivered);
    assert_eq!(1, sink.calls().len());
}

#[tokio::test]
async fn test_fan_out_is_per_recipient() {
    // One quake near Chennai, one near Belfast.
    //
    let chennai_quake = close_quake("IN", 4.5);
    let belfast_quake = quake("IE", 54.7, -6.2, 5.0);

    let feed = ScriptedFeed::new(vec![Some(vec![chennai_quake, belfast_quake])]);
    let registry = Arc::new(Registry::new());
    registry.register("chennai", ORIGIN);
    registry.register("belfast", Location::new(54.6, -5.9));
    let sink = Arc::new(RecordingSink::default());
    let poller = poller(feed, registry, Arc::clone(&sink));

    let stats = poller.cycle().await.unwrap();
    assert_eq!(2, stats.recipients);
    assert_eq!(2, stats.delivered);

    // Each recipient got exactly its own event, whatever the iteration order.
    //
    let mut calls = sink.calls();
    calls.sort();
    assert_eq!(
        vec![
            ("belfast".to_string(), vec!["IE".to_string()]),
            ("chennai".to_string(), vec!["IN".to_string()]),
        ],
        calls
    );
}

#[tokio::test]
async fn test_below_threshold_events_are_ignored() {
    // In range but weak, strong but out of range.
    //
    let weak = close_quake("weak", 3.2);
    let far = quake("far", 20.0, 78.0, 7.9);

    let feed = ScriptedFeed::new(vec![Some(vec![weak, far])]);
    let registry = Arc::new(Registry::new());
    registry.register("r", ORIGIN);
    let sink = Arc::new(RecordingSink::default());
    let poller = poller(feed, registry, Arc::clone(&sink));

    let stats = poller.cycle().await.unwrap();
    assert_eq!(2, stats.events);
    assert_eq!(0, stats.delivered);
    assert!(sink.calls().is_empty());
}
