//! Daemon configuration, HCL format.
//!
//! Looked up through the common `ConfigFile` engine; when there is no file at all we fall
//! back to the built-in `temblord.hcl`, which watches Chennai and logs alerts instead of
//! messaging anyone.
//!

use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter};

use eyre::{eyre, Result};
use serde::Deserialize;
use tracing::warn;

use temblor_common::{ConfigFile, Location};

/// Current config version
pub const CVERSION: usize = 1;

/// Compiled-in defaults
const DEFAULT_CONFIG: &str = include_str!("temblord.hcl");

/// Configuration for the daemon: loop parameters, credentials and the watched places.
///
#[derive(Clone, Debug, Deserialize)]
pub struct TemblordConfig {
    /// Version number for safety
    pub version: usize,
    /// Seconds between two poll cycles
    pub every: u64,
    /// Proximity radius in km
    pub radius_km: f64,
    /// Minimum magnitude, inclusive
    pub min_magnitude: f64,
    /// Feed URL override
    pub url: Option<String>,
    /// Telegram credentials
    pub telegram: Option<TelegramAuth>,
    /// Twilio credentials for WhatsApp
    pub whatsapp: Option<WhatsAppAuth>,
    /// Watched places, one registration each
    #[serde(default)]
    pub watcher: BTreeMap<String, Watcher>,
}

/// One watched place
///
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Watcher {
    pub lat: f64,
    pub lon: f64,
}

impl Watcher {
    pub fn location(&self) -> Location {
        Location::new(self.lat, self.lon)
    }
}

#[derive(Clone, Deserialize)]
pub struct TelegramAuth {
    pub bot_token: String,
    pub chat_id: String,
}

impl Debug for TelegramAuth {
    /// Do not leak the bot token
    ///
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramAuth")
            .field("bot_token", &"HIDDEN")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct WhatsAppAuth {
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
    pub to: String,
}

impl Debug for WhatsAppAuth {
    /// Do not leak the auth token
    ///
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppAuth")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"HIDDEN")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

impl TemblordConfig {
    /// Load from an explicit file, the default location, or the compiled-in defaults, in
    /// that order.
    ///
    #[tracing::instrument]
    pub fn load(fname: Option<&str>) -> Result<Self> {
        let cfg = if fname.is_some() || Self::default_file_exists() {
            ConfigFile::<TemblordConfig>::load(fname)?
        } else {
            warn!("no config file found, using built-in defaults");
            ConfigFile::<TemblordConfig>::from_str(DEFAULT_CONFIG)?
        };

        Self::validate(cfg.into_inner())
    }

    fn validate(cfg: TemblordConfig) -> Result<Self> {
        if cfg.version != CVERSION {
            return Err(eyre!(
                "Bad config version {}, expected {}",
                cfg.version,
                CVERSION
            ));
        }
        Ok(cfg)
    }

    fn default_file_exists() -> bool {
        ConfigFile::<TemblordConfig>::default_file().exists()
    }
}

impl Display for TemblordConfig {
    /// Credential-free summary for the `config` sub-command.
    ///
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "every {}s, radius {} km, magnitude >= {}",
            self.every, self.radius_km, self.min_magnitude
        )?;
        writeln!(
            f,
            "feed: {}",
            self.url.as_deref().unwrap_or("USGS all-hour (default)")
        )?;
        writeln!(
            f,
            "telegram: {}",
            if self.telegram.is_some() {
                "configured"
            } else {
                "none"
            }
        )?;
        writeln!(
            f,
            "whatsapp: {}",
            if self.whatsapp.is_some() {
                "configured"
            } else {
                "none"
            }
        )?;
        let names: Vec<&str> = self.watcher.keys().map(String::as_str).collect();
        write!(f, "watchers: {}", names.join(", "))
    }
}
