//! Module describing all possible commands and sub-commands to the `temblord` daemon
//!

use clap::{crate_authors, crate_description, crate_name, crate_version, Parser};

/// CLI options
#[derive(Parser)]
#[command(disable_version_flag = true)]
#[clap(name = crate_name!(), about = crate_description!())]
#[clap(version = crate_version!(), author = crate_authors!())]
pub struct Opts {
    /// configuration file.
    #[clap(short = 'c', long)]
    pub config: Option<String>,
    /// Hierarchical log output.
    #[clap(short = 'T', long)]
    pub tree: bool,
    /// Directory for the rolling log file, stderr only if not set.
    #[clap(short = 'L', long)]
    pub logdir: Option<String>,
    /// Sub-commands (see below).
    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

// ------

/// All sub-commands:
///
/// - `check`
/// - `config`
/// - `server`
/// - `version`
///
#[derive(Debug, Parser)]
pub enum SubCommand {
    /// One-shot proximity check around a point
    Check(CheckOpts),
    /// Display current config
    Config,
    /// Run the polling loop until interrupted
    Server(ServerOpts),
    /// List all package versions
    Version,
}

/// Options for `check`
///
#[derive(Debug, Parser)]
pub struct CheckOpts {
    /// Latitude of the point of interest, degrees
    #[clap(long, allow_negative_numbers = true)]
    pub lat: f64,
    /// Longitude of the point of interest, degrees
    #[clap(long, allow_negative_numbers = true)]
    pub lon: f64,
    /// Radius in km, config value by default
    #[clap(short = 'r', long)]
    pub radius: Option<f64>,
    /// Minimum magnitude, config value by default
    #[clap(short = 'm', long)]
    pub min_mag: Option<f64>,
}

/// Options for `server`
///
#[derive(Debug, Parser)]
pub struct ServerOpts {
    /// Poll interval in seconds, config value by default
    #[clap(short = 'e', long)]
    pub every: Option<u64>,
}
