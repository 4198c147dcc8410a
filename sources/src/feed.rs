//! The `Feedable` trait and the USGS implementation of it.
//!

use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, trace};

use crate::{FeedError, QuakeEvent, UsgsSummary};

/// Default feed, all events of the past hour, worldwide.
///
const DEFAULT_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_hour.geojson";

/// This trait enables us to manage different feeds under a single interface.
///
/// A feed hands back the complete current snapshot on every call.  There is no state on
/// this side, no pagination and no delta.
///
#[async_trait]
pub trait Feedable: Debug + Send + Sync {
    /// Return feed's name
    fn name(&self) -> String;
    /// Fetch the current snapshot of events
    async fn fetch(&self) -> Result<Vec<QuakeEvent>, FeedError>;
}

/// This is the USGS client/feed struct.
///
#[derive(Clone, Debug)]
pub struct UsgsQuakes {
    /// Full feed URL taken from config
    url: String,
    /// reqwest client
    client: Client,
}

impl UsgsQuakes {
    /// Build a feed for a given summary URL
    ///
    #[tracing::instrument]
    pub fn new(url: &str) -> Self {
        trace!("usgs::new");

        UsgsQuakes {
            url: url.to_owned(),
            client: Client::new(),
        }
    }
}

impl Default for UsgsQuakes {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_URL)
    }
}

#[async_trait]
impl Feedable for UsgsQuakes {
    fn name(&self) -> String {
        "usgs".to_string()
    }

    /// Single call API, no auth needed.
    ///
    #[tracing::instrument(skip(self))]
    async fn fetch(&self) -> Result<Vec<QuakeEvent>, FeedError> {
        trace!("Fetching data from {}…", self.url);

        let resp = self.client.get(&self.url).send().await?;

        // Check status
        //
        match resp.status() {
            StatusCode::OK => {
                trace!("OK");
            }
            code => {
                debug!("{:?}", resp.headers());
                return Err(FeedError::Status(code.as_u16()));
            }
        }

        let body = resp.text().await?;
        let summary: UsgsSummary = serde_json::from_str(&body)?;

        Ok(summary.into_events())
    }
}
