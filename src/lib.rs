//! Shipdash - cached data-access core for the shipping analytics
//! dashboard
//!
//! The dashboard's screens (courier, orders, shipments, NDR, RTO,
//! WhatsApp communication, delays) all read JSON documents from the
//! analytics API. This crate provides the layer between those consumers
//! and the network:
//!
//! - [`cache::CacheStore`] - in-memory TTL response cache with lazy
//!   eviction; one instance per session, nothing persisted
//! - [`fetcher::CachingFetcher`] - wraps any async fetch in a
//!   check-cache-first / store-on-miss flow
//! - [`key`] - canonical cache-key derivation, parameter-order
//!   independent
//! - [`api::DashboardClient`] - thin tab-document client composing the
//!   fetcher with an HTTP transport

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod key;

pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
///
/// # Errors
///
/// Currently infallible; returns `Result` so callers are insulated from
/// future subscriber configuration errors.
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => {
            subscriber.with(fmt::layer().json()).init();
        }
        _ => {
            subscriber.with(fmt::layer()).init();
        }
    }

    Ok(())
}
