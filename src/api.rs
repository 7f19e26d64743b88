//! Dashboard API client facade
//!
//! Thin data-access layer over the analytics REST endpoints: one JSON
//! document per dashboard tab, filtered by the shared query set. Every
//! read goes through [`CachingFetcher`], so the transport stays a plain
//! GET and all caching decisions live in one place.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::cache::{CacheStatsSnapshot, CacheStore};
use crate::config::Config;
use crate::fetcher::CachingFetcher;
use crate::{Error, Result};

/// Dashboard tabs, each backed by one analytics document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    /// Cross-tab summary cards
    Overview,
    /// Order volume and revenue
    Orders,
    /// Shipment pipeline states
    Shipments,
    /// Non-delivery reports
    Ndr,
    /// WhatsApp communication funnel
    Whatsapp,
    /// Return-to-origin breakdown
    Rto,
    /// Courier performance split
    Courier,
    /// Delivery delay buckets
    Delays,
}

impl Tab {
    /// Every tab, in display order
    pub const ALL: [Self; 8] = [
        Self::Overview,
        Self::Orders,
        Self::Shipments,
        Self::Ndr,
        Self::Whatsapp,
        Self::Rto,
        Self::Courier,
        Self::Delays,
    ];

    /// Stable identifier used in resource paths and the CLI
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Orders => "orders",
            Self::Shipments => "shipments",
            Self::Ndr => "ndr",
            Self::Whatsapp => "whatsapp",
            Self::Rto => "rto",
            Self::Courier => "courier",
            Self::Delays => "delays",
        }
    }

    /// Resource path of this tab's analytics document
    #[must_use]
    pub fn resource_path(self) -> String {
        format!("analytics/{}", self.as_str())
    }

    /// Whether this tab is served by the reporting host.
    ///
    /// Delay analytics aggregate over the full shipment history and are
    /// offloaded to the reporting cluster.
    #[must_use]
    pub fn uses_report_host(self) -> bool {
        matches!(self, Self::Delays)
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|tab| tab.as_str() == s)
            .ok_or_else(|| Error::InvalidParams(format!("unknown tab: {s}")))
    }
}

/// Shared filter set applied to every tab
///
/// Empty collections and unset fields are skipped during serialization,
/// so "no filters" and an explicitly empty query produce the same cache
/// key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardQuery {
    /// Start of the reporting date range (inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    /// End of the reporting date range (inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
    /// Delivery zones to include
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<String>,
    /// Courier partners to include
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub couriers: Vec<String>,
    /// Payment modes to include (prepaid, cod)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payment: Vec<String>,
    /// Shipment mode (surface, air)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipment_mode: Option<String>,
}

impl DashboardQuery {
    /// True when no filter is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.date_from.is_none()
            && self.date_to.is_none()
            && self.zones.is_empty()
            && self.couriers.is_empty()
            && self.payment.is_empty()
            && self.shipment_mode.is_none()
    }

    /// Render the query as URL parameters. List filters collapse to
    /// comma-separated values, matching the analytics API contract.
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(from) = self.date_from {
            pairs.push(("date_from", from.to_string()));
        }
        if let Some(to) = self.date_to {
            pairs.push(("date_to", to.to_string()));
        }
        if !self.zones.is_empty() {
            pairs.push(("zones", self.zones.join(",")));
        }
        if !self.couriers.is_empty() {
            pairs.push(("couriers", self.couriers.join(",")));
        }
        if !self.payment.is_empty() {
            pairs.push(("payment", self.payment.join(",")));
        }
        if let Some(mode) = &self.shipment_mode {
            pairs.push(("shipment_mode", mode.clone()));
        }
        pairs
    }
}

/// One selectable filter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    /// Value sent back in queries
    pub value: String,
    /// Human-readable label
    pub display_value: String,
}

/// Filter option lists shared by the tab screens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterData {
    /// Delivery zones
    #[serde(default)]
    pub zone: Vec<FilterOption>,
    /// Courier partners
    #[serde(default)]
    pub courier: Vec<FilterOption>,
    /// Courier types
    #[serde(default)]
    pub courier_type: Vec<FilterOption>,
    /// Courier modes
    #[serde(default)]
    pub courier_mode: Vec<FilterOption>,
}

/// Cached client for the dashboard analytics API
pub struct DashboardClient {
    http: Client,
    fetcher: CachingFetcher,
    base_url: Url,
    report_url: Url,
}

impl DashboardClient {
    /// Build a client from configuration and an externally owned store.
    ///
    /// The store is injected by the composition root so one cache
    /// instance can back every consumer in the process.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid endpoint URLs or when the HTTP
    /// client cannot be constructed.
    pub fn new(config: &Config, store: Arc<CacheStore>) -> Result<Self> {
        let base_url = Url::parse(&config.api.base_url)
            .map_err(|e| Error::Config(format!("Invalid api.base_url: {e}")))?;
        let report_url = Url::parse(config.report_url())
            .map_err(|e| Error::Config(format!("Invalid api.report_url: {e}")))?;
        let http = Client::builder().timeout(config.api.timeout).build()?;

        Ok(Self {
            http,
            fetcher: CachingFetcher::with_enabled(store, config.cache.enabled),
            base_url,
            report_url,
        })
    }

    /// Fetch one tab's analytics document.
    ///
    /// `ttl` overrides the cache default for this entry; `use_cache`
    /// false bypasses the cache entirely for guaranteed freshness.
    ///
    /// # Errors
    ///
    /// Transport failures and non-success API statuses propagate
    /// unchanged; neither is ever cached.
    pub async fn fetch_tab(
        &self,
        tab: Tab,
        query: &DashboardQuery,
        ttl: Option<Duration>,
        use_cache: bool,
    ) -> Result<Value> {
        let resource = tab.resource_path();
        let params = (!query.is_empty()).then_some(query);
        self.fetcher
            .request(&resource, params, ttl, use_cache, || {
                self.get_json(tab, &resource, query)
            })
            .await
    }

    /// Fetch the shared filter option lists
    ///
    /// # Errors
    ///
    /// Same contract as [`DashboardClient::fetch_tab`].
    pub async fn filter_options(&self) -> Result<FilterData> {
        self.fetcher
            .request("analytics/filters", None::<&DashboardQuery>, None, true, || async {
                let url = self.endpoint(&self.base_url, "analytics/filters")?;
                let response = self.http.get(url).send().await?;
                Self::decode(response).await
            })
            .await
    }

    /// Drop every cached document - the manual dashboard-refresh action.
    /// Each subsequent fetch misses until the cache repopulates.
    pub fn refresh(&self) {
        self.fetcher.clear_all();
    }

    /// Diagnostic snapshot of the response cache
    #[must_use]
    pub fn cache_stats(&self) -> CacheStatsSnapshot {
        self.fetcher.stats()
    }

    async fn get_json(&self, tab: Tab, resource: &str, query: &DashboardQuery) -> Result<Value> {
        let host = if tab.uses_report_host() {
            &self.report_url
        } else {
            &self.base_url
        };
        let url = self.endpoint(host, resource)?;
        let response = self.http.get(url).query(&query.to_pairs()).send().await?;
        Self::decode(response).await
    }

    fn endpoint(&self, host: &Url, resource: &str) -> Result<Url> {
        host.join(resource)
            .map_err(|e| Error::Config(format!("Invalid resource path '{resource}': {e}")))
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(Error::Api {
                status: status.as_u16(),
                // Truncate so oversized error pages stay loggable
                message: message.chars().take(500).collect(),
            });
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::derive_key;
    use serde_json::json;

    #[test]
    fn tab_identifiers_round_trip() {
        for tab in Tab::ALL {
            assert_eq!(tab.as_str().parse::<Tab>().unwrap(), tab);
        }
        assert!("invoices".parse::<Tab>().is_err());
    }

    #[test]
    fn resource_paths_are_stable() {
        assert_eq!(Tab::Orders.resource_path(), "analytics/orders");
        assert_eq!(Tab::Whatsapp.resource_path(), "analytics/whatsapp");
    }

    #[test]
    fn only_delays_uses_the_report_host() {
        for tab in Tab::ALL {
            assert_eq!(tab.uses_report_host(), tab == Tab::Delays);
        }
    }

    #[test]
    fn empty_query_serializes_to_empty_object() {
        let query = DashboardQuery::default();
        assert!(query.is_empty());
        assert_eq!(serde_json::to_value(&query).unwrap(), json!({}));

        // So an unfiltered fetch and "no params" share one cache key.
        let with_query = derive_key("analytics/orders", Some(&query)).unwrap();
        let without = derive_key::<DashboardQuery>("analytics/orders", None).unwrap();
        assert_eq!(with_query, without);
    }

    #[test]
    fn query_pairs_collapse_lists_to_csv() {
        let query = DashboardQuery {
            date_from: Some(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()),
            date_to: Some(NaiveDate::from_ymd_opt(2026, 7, 31).unwrap()),
            zones: vec!["north".to_string(), "south".to_string()],
            couriers: vec!["bluedart".to_string()],
            payment: Vec::new(),
            shipment_mode: Some("surface".to_string()),
        };

        assert_eq!(
            query.to_pairs(),
            vec![
                ("date_from", "2026-07-01".to_string()),
                ("date_to", "2026-07-31".to_string()),
                ("zones", "north,south".to_string()),
                ("couriers", "bluedart".to_string()),
                ("shipment_mode", "surface".to_string()),
            ]
        );
    }

    #[test]
    fn filter_data_tolerates_missing_lists() {
        let data: FilterData = serde_json::from_value(json!({
            "zone": [{"value": "north", "display_value": "North"}]
        }))
        .unwrap();
        assert_eq!(data.zone.len(), 1);
        assert!(data.courier.is_empty());
    }

    #[test]
    fn client_builds_from_default_config() {
        let config = Config::default();
        let client = DashboardClient::new(&config, Arc::new(CacheStore::new()));
        assert!(client.is_ok());
    }

    #[test]
    fn report_host_falls_back_to_base_url() {
        let config = Config::default();
        let client = DashboardClient::new(&config, Arc::new(CacheStore::new())).unwrap();
        assert_eq!(client.report_url, client.base_url);
    }
}
