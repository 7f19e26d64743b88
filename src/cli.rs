//! Command-line interface

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Shipping analytics dashboard client with response caching
#[derive(Parser, Debug)]
#[command(name = "shipdash")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "SHIPDASH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "SHIPDASH_LOG_LEVEL", global = true)]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "SHIPDASH_LOG_FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch one dashboard tab and print its JSON document
    Fetch {
        /// Tab to fetch (overview, orders, shipments, ndr, whatsapp,
        /// rto, courier, delays)
        tab: String,

        /// Start of the reporting date range (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// End of the reporting date range (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Delivery zone filter (repeatable)
        #[arg(long = "zone")]
        zones: Vec<String>,

        /// Courier partner filter (repeatable)
        #[arg(long = "courier")]
        couriers: Vec<String>,

        /// Payment mode filter (repeatable: prepaid, cod)
        #[arg(long = "payment")]
        payment: Vec<String>,

        /// Bypass the response cache for this call
        #[arg(long)]
        no_cache: bool,

        /// Cache TTL override for this entry (e.g. 30s, 5m)
        #[arg(long, value_parser = humantime::parse_duration)]
        ttl: Option<Duration>,

        /// Fetch the tab N times to observe cache hits in one session
        #[arg(long, default_value_t = 1)]
        repeat: u32,

        /// Pause between repeated fetches
        #[arg(long, value_parser = humantime::parse_duration, default_value = "1s")]
        interval: Duration,
    },

    /// Fetch the shared filter option lists
    Filters,
}
