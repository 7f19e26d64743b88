//! Shipdash CLI - fetch dashboard analytics documents through the
//! response cache.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use shipdash::{
    Result,
    api::{DashboardClient, DashboardQuery, Tab},
    cache::CacheStore,
    cli::{Cli, Command},
    config::Config,
    setup_tracing,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    // The one cache instance for this session, owned here and injected
    // into every consumer.
    let store = Arc::new(CacheStore::with_default_ttl(config.cache.default_ttl));
    let client = DashboardClient::new(&config, Arc::clone(&store))?;

    match cli.command {
        Command::Fetch {
            tab,
            from,
            to,
            zones,
            couriers,
            payment,
            no_cache,
            ttl,
            repeat,
            interval,
        } => {
            let tab: Tab = tab.parse()?;
            let query = DashboardQuery {
                date_from: from,
                date_to: to,
                zones,
                couriers,
                payment,
                ..DashboardQuery::default()
            };

            for round in 0..repeat.max(1) {
                let document = client.fetch_tab(tab, &query, ttl, !no_cache).await?;
                println!("{}", serde_json::to_string_pretty(&document)?);
                if round + 1 < repeat {
                    tokio::time::sleep(interval).await;
                }
            }

            let stats = client.cache_stats();
            info!(
                size = stats.size,
                hits = stats.hits,
                misses = stats.misses,
                evictions = stats.evictions,
                hit_rate = stats.hit_rate(),
                "cache statistics"
            );
        }
        Command::Filters => {
            let options = client.filter_options().await?;
            println!("{}", serde_json::to_string_pretty(&options)?);
        }
    }

    Ok(())
}
