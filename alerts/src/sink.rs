//! Delivery sinks.
//!
//! The poll loop only knows about the `AlertSink` trait.  Whether an alert ends up on an
//! open connection, in a Telegram chat or on someone's phone is the sink's business, as is
//! any retry policy (the loop itself never retries, see `poller`).
//!

use std::fmt::{Debug, Formatter};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tokio::sync::mpsc::Sender;
use tracing::trace;

use crate::Notification;

/// Custom error type for sinks, allow us to differentiate between errors.
///
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Bad HTTP status: {0}")]
    Status(u16),
    #[error("Channel closed for {0}")]
    Closed(String),
}

/// This trait enables us to manage the different notification channels under a single
/// interface.
///
/// Failures are reported back but the caller logs them and moves on; a sink must not
/// assume it will be called again for the same events.
///
#[async_trait]
pub trait AlertSink: Debug + Send + Sync {
    /// Return sink's name
    fn name(&self) -> String;
    /// Deliver one batch of notifications to one recipient
    async fn deliver(&self, recipient: &str, batch: &[Notification]) -> Result<(), SinkError>;
}

/// One delivery as it travels through a `ChannelSink`.
///
#[derive(Clone, Debug)]
pub struct AlertBatch {
    pub recipient: String,
    pub notifications: Vec<Notification>,
}

/// Push into an open in-process channel, the connection-push case.  The receiving end is
/// whatever owns the recipient's connection.
///
#[derive(Clone, Debug)]
pub struct ChannelSink {
    out: Sender<AlertBatch>,
}

impl ChannelSink {
    pub fn new(out: Sender<AlertBatch>) -> Self {
        ChannelSink { out }
    }
}

#[async_trait]
impl AlertSink for ChannelSink {
    fn name(&self) -> String {
        "channel".to_string()
    }

    async fn deliver(&self, recipient: &str, batch: &[Notification]) -> Result<(), SinkError> {
        trace!("channel::deliver to {recipient}");

        let batch = AlertBatch {
            recipient: recipient.to_string(),
            notifications: batch.to_vec(),
        };
        self.out
            .send(batch)
            .await
            .map_err(|_| SinkError::Closed(recipient.to_string()))
    }
}

/// Send each notification as a Telegram Bot API message.
///
#[derive(Clone)]
pub struct TelegramSink {
    bot_token: String,
    chat_id: String,
    client: Client,
}

impl TelegramSink {
    pub fn new(bot_token: &str, chat_id: &str) -> Self {
        TelegramSink {
            bot_token: bot_token.to_owned(),
            chat_id: chat_id.to_owned(),
            client: Client::new(),
        }
    }
}

impl Debug for TelegramSink {
    /// Do not leak the bot token
    ///
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSink")
            .field("bot_token", &"HIDDEN")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[async_trait]
impl AlertSink for TelegramSink {
    fn name(&self) -> String {
        "telegram".to_string()
    }

    #[tracing::instrument(skip(batch))]
    async fn deliver(&self, recipient: &str, batch: &[Notification]) -> Result<(), SinkError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);

        for n in batch {
            let resp = self
                .client
                .post(&url)
                .json(&json!({
                    "chat_id": self.chat_id,
                    "text": n.message(),
                    "parse_mode": "HTML",
                }))
                .send()
                .await?;

            match resp.status() {
                code if code.is_success() => trace!("telegram message sent"),
                code => return Err(SinkError::Status(code.as_u16())),
            }
        }
        Ok(())
    }
}

/// Send each notification as a WhatsApp message through the Twilio Messages API.
///
#[derive(Clone)]
pub struct WhatsAppSink {
    account_sid: String,
    auth_token: String,
    /// Both numbers in `whatsapp:+…` form
    from: String,
    to: String,
    client: Client,
}

impl WhatsAppSink {
    pub fn new(account_sid: &str, auth_token: &str, from: &str, to: &str) -> Self {
        WhatsAppSink {
            account_sid: account_sid.to_owned(),
            auth_token: auth_token.to_owned(),
            from: from.to_owned(),
            to: to.to_owned(),
            client: Client::new(),
        }
    }
}

impl Debug for WhatsAppSink {
    /// Do not leak the auth token
    ///
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppSink")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"HIDDEN")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

#[async_trait]
impl AlertSink for WhatsAppSink {
    fn name(&self) -> String {
        "whatsapp".to_string()
    }

    #[tracing::instrument(skip(batch))]
    async fn deliver(&self, recipient: &str, batch: &[Notification]) -> Result<(), SinkError> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        );

        for n in batch {
            let body = n.message();
            let params = [
                ("To", self.to.as_str()),
                ("From", self.from.as_str()),
                ("Body", body.as_str()),
            ];
            let resp = self
                .client
                .post(&url)
                .basic_auth(&self.account_sid, Some(&self.auth_token))
                .form(&params)
                .send()
                .await?;

            match resp.status() {
                code if code.is_success() => trace!("whatsapp message sent"),
                code => return Err(SinkError::Status(code.as_u16())),
            }
        }
        Ok(())
    }
}
