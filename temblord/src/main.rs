//! This is the `temblord` daemon launcher
//!
//! It hosts the polling loop on top of the library crates: feed from `temblor-sources`,
//! registry/sinks/loop from `temblor-alerts`.  Connection lifecycle is as external as it
//! gets here: the watched places come from the config file and stay registered for the
//! whole run.
//!

use std::sync::Arc;
use std::time::Duration;

use clap::{crate_authors, crate_description, crate_version, Parser};
use eyre::{eyre, Result};
use tabled::builder::Builder;
use tabled::settings::Style;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, trace};

use temblor_alerts::{
    AlertBatch, AlertSink, ChannelSink, PollParams, Poller, Registry, TelegramSink, WhatsAppSink,
};
use temblor_common::{init_logging, ConfigFile, Location};
use temblor_sources::{nearby, Feedable, UsgsQuakes};

use crate::cli::{CheckOpts, Opts, ServerOpts, SubCommand};
use crate::config::TemblordConfig;

mod cli;
mod config;

/// Daemon name
const NAME: &str = env!("CARGO_BIN_NAME");

/// Daemon version
const VERSION: &str = crate_version!();

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();

    // Initialise logging early
    //
    init_logging(NAME, opts.tree, opts.logdir.clone())?;

    banner();

    let cfg = TemblordConfig::load(opts.config.as_deref())?;

    match opts.subcmd {
        SubCommand::Check(copts) => check(&cfg, &copts).await,
        SubCommand::Config => {
            show_config(&cfg);
            Ok(())
        }
        SubCommand::Server(sopts) => server(&cfg, &sopts).await,
        SubCommand::Version => {
            version();
            Ok(())
        }
    }
}

/// The configured feed, USGS default unless overridden.
///
fn feed_for(cfg: &TemblordConfig) -> Arc<dyn Feedable> {
    match &cfg.url {
        Some(url) => Arc::new(UsgsQuakes::new(url)),
        None => Arc::new(UsgsQuakes::default()),
    }
}

/// The configured notification channel.  Without credentials alerts are drained into the
/// log, which is the right thing for a first interactive run.
///
fn pick_sink(cfg: &TemblordConfig) -> Arc<dyn AlertSink> {
    if let Some(tg) = &cfg.telegram {
        return Arc::new(TelegramSink::new(&tg.bot_token, &tg.chat_id));
    }
    if let Some(wa) = &cfg.whatsapp {
        return Arc::new(WhatsAppSink::new(
            &wa.account_sid,
            &wa.auth_token,
            &wa.from,
            &wa.to,
        ));
    }

    let (tx, mut rx) = mpsc::channel::<AlertBatch>(16);
    tokio::spawn(async move {
        while let Some(batch) = rx.recv().await {
            for n in &batch.notifications {
                info!("[{}] {}", batch.recipient, n.message());
            }
        }
    });
    Arc::new(ChannelSink::new(tx))
}

/// Handle `check`: one fetch, one filter, one table.
///
#[tracing::instrument(skip(cfg))]
async fn check(cfg: &TemblordConfig, opts: &CheckOpts) -> Result<()> {
    trace!("check");

    let origin = Location::new(opts.lat, opts.lon);
    let radius_km = opts.radius.unwrap_or(cfg.radius_km);
    let min_magnitude = opts.min_mag.unwrap_or(cfg.min_magnitude);

    let feed = feed_for(cfg);
    let events = feed.fetch().await?;
    let hits = nearby(&origin, radius_km, min_magnitude, &events);

    let header = vec!["Id", "Place", "Magnitude", "Distance (km)", "Time"];
    let mut builder = Builder::default();
    builder.push_record(header);

    hits.iter().for_each(|hit| {
        builder.push_record(vec![
            hit.event.id.clone(),
            hit.event.place.clone(),
            format!("{:.1}", hit.event.magnitude),
            format!("{:.2}", hit.distance_km),
            hit.event.time.to_rfc3339(),
        ]);
    });

    let table = builder.build().with(Style::modern()).to_string();
    eprintln!(
        "{} event(s) within {radius_km} km of ({}, {}):\n{table}",
        hits.len(),
        opts.lat,
        opts.lon
    );
    Ok(())
}

/// Handle `server`: register all watchers, then poll until interrupted.
///
#[tracing::instrument(skip(cfg))]
async fn server(cfg: &TemblordConfig, opts: &ServerOpts) -> Result<()> {
    trace!("server");

    if cfg.watcher.is_empty() {
        return Err(eyre!("no watcher defined, nothing to do"));
    }

    let registry = Arc::new(Registry::new());
    cfg.watcher
        .iter()
        .for_each(|(name, w)| registry.register(name, w.location()));

    let sink = pick_sink(cfg);
    info!("{} watcher(s), delivering through {}", registry.len(), sink.name());

    let params = PollParams {
        every: Duration::from_secs(opts.every.unwrap_or(cfg.every)),
        radius_km: cfg.radius_km,
        min_magnitude: cfg.min_magnitude,
    };
    let poller = Poller::new(feed_for(cfg), registry, sink, params);

    tokio::select! {
        _ = poller.run() => {}
        _ = signal::ctrl_c() => info!("interrupted, shutting down"),
    }
    Ok(())
}

/// Handle `config`
///
fn show_config(cfg: &TemblordConfig) {
    eprintln!(
        "Default config file: {:?}",
        ConfigFile::<TemblordConfig>::default_file()
    );
    eprintln!("{}", cfg);
}

/// Handle `version`
///
fn version() {
    eprintln!("Modules:");
    eprintln!("\t{}", temblor_common::version());
    eprintln!("\t{}", temblor_sources::version());
    eprintln!("\t{}", temblor_alerts::version());
}

/// Display banner
///
fn banner() {
    eprintln!(
        r##"
{}/{} by {}
{}
"##,
        NAME,
        VERSION,
        crate_authors!(),
        crate_description!()
    )
}
